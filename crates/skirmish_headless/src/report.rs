//! Report rendering: grid table, CSV export and ASCII bar charts.

use std::fmt::Write as _;
use std::path::Path;

use skirmish_core::prelude::*;

use crate::batch::ScenarioResult;

/// Column headers shared by the table and the CSV export.
pub const TABLE_HEADERS: [&str; 9] = [
    "Scenario",
    "Victory Rate",
    "Rounds",
    "Damage (P/E)",
    "Tension Index",
    "Eng. Var.",
    "Flow State",
    "Dec. Impact",
    "NTR",
];

const CSV_HEADERS: [&str; 10] = [
    "Scenario",
    "Victory Rate",
    "Rounds",
    "Damage (P)",
    "Damage (E)",
    "Tension Index",
    "Eng. Var.",
    "Flow State",
    "Dec. Impact",
    "NTR",
];

/// Longest bar drawn by [`render_bars`].
pub const BAR_WIDTH: usize = 40;

fn table_cells(name: &str, agg: &AggregateResult) -> [String; 9] {
    [
        name.to_string(),
        format!("{:.2}%", agg.win_rate * 100.0),
        format!("{:.2}", agg.avg_rounds),
        format!(
            "{:.2} / {:.2}",
            agg.avg_damage_by_players, agg.avg_damage_by_enemies
        ),
        format!("{:.2}%", agg.avg_tension_index * 100.0),
        format!("{:.3}", agg.avg_engagement_variability),
        format!("{:.2}", agg.avg_flow_state),
        format!("{:.2}%", agg.avg_decision_impact),
        format!("{:.2}", agg.avg_narrative_tension_ratio),
    ]
}

fn border(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line
}

fn row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        let _ = write!(line, " {cell}{} |", " ".repeat(pad));
    }
    line
}

/// Render results as a grid table, one row per scenario.
#[must_use]
pub fn render_table(results: &[ScenarioResult]) -> String {
    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| (*h).to_string()).collect();
    let rows: Vec<[String; 9]> = results
        .iter()
        .map(|r| table_cells(&r.name, &r.aggregate))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", border(&widths, '-'));
    let _ = writeln!(out, "{}", row(&header, &widths));
    let _ = writeln!(out, "{}", border(&widths, '='));
    for cells in &rows {
        let _ = writeln!(out, "{}", row(cells, &widths));
        let _ = writeln!(out, "{}", border(&widths, '-'));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render results as CSV with raw (unformatted) numbers.
#[must_use]
pub fn to_csv(results: &[ScenarioResult]) -> String {
    let mut out = CSV_HEADERS.join(",");
    out.push('\n');
    for r in results {
        let a = &r.aggregate;
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            csv_field(&r.name),
            a.win_rate,
            a.avg_rounds,
            a.avg_damage_by_players,
            a.avg_damage_by_enemies,
            a.avg_tension_index,
            a.avg_engagement_variability,
            a.avg_flow_state,
            a.avg_decision_impact,
            a.avg_narrative_tension_ratio
        );
    }
    out
}

/// Write the CSV export, creating parent directories as needed.
pub fn write_csv(path: &Path, results: &[ScenarioResult]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_csv(results))
}

/// Metrics plotted by [`render_bars`], with their display names.
const BAR_METRICS: [(&str, fn(&AggregateResult) -> f64); 5] = [
    ("Tension Index", |a: &AggregateResult| a.avg_tension_index),
    ("Engagement Variability", |a: &AggregateResult| {
        a.avg_engagement_variability
    }),
    ("Flow State", |a: &AggregateResult| a.avg_flow_state),
    ("Decision Impact", |a: &AggregateResult| a.avg_decision_impact),
    ("Narrative Tension Ratio", |a: &AggregateResult| {
        a.avg_narrative_tension_ratio
    }),
];

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = ((value / max) * width as f64).round() as usize;
    "█".repeat(len.clamp(1, width))
}

/// Render one bar chart per engagement metric, bars scaled to the largest
/// value of that metric.
#[must_use]
pub fn render_bars(results: &[ScenarioResult], width: usize) -> String {
    let label_width = results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (title, metric) in BAR_METRICS {
        let max = results
            .iter()
            .map(|r| metric(&r.aggregate))
            .fold(0.0f64, f64::max);

        let _ = writeln!(out, "── {title} {}", "─".repeat(60usize.saturating_sub(title.len())));
        for r in results {
            let value = metric(&r.aggregate);
            let _ = writeln!(
                out,
                "  {:<label_width$} {:>8.3} {}",
                r.name,
                value,
                bar(value, max, width)
            );
        }
        out.push('\n');
    }
    out
}

/// Multi-line text summary of one scenario's aggregate.
#[must_use]
pub fn render_summary(name: &str, agg: &AggregateResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scenario: {name}");
    let _ = writeln!(out, "Runs: {} (seed {})", agg.runs, agg.seed);
    let _ = writeln!(
        out,
        "Victory Rate: {:.2}% (±{:.2}%)",
        agg.win_rate * 100.0,
        agg.win_rate_std_error() * 100.0
    );
    let _ = writeln!(out, "Average Rounds: {:.2}", agg.avg_rounds);
    let _ = writeln!(out, "Damage by Players: {:.2}", agg.avg_damage_by_players);
    let _ = writeln!(out, "Damage by Enemies: {:.2}", agg.avg_damage_by_enemies);
    let _ = writeln!(out, "Tension Index: {:.2}%", agg.avg_tension_index * 100.0);
    let _ = writeln!(out, "Engagement Variability: {:.3}", agg.avg_engagement_variability);
    let _ = writeln!(out, "Flow State: {:.2}", agg.avg_flow_state);
    let _ = writeln!(out, "Decision Impact: {:.2}%", agg.avg_decision_impact);
    let _ = writeln!(out, "Narrative Tension Ratio: {:.2}", agg.avg_narrative_tension_ratio);
    out
}
