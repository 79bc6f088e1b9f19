//! Resolution of a single combat round.
//!
//! Every living combatant acts once per round, fastest first. Turn order
//! ties are broken by side (players before enemies) and then by position in
//! the roster, which keeps replays of a seeded encounter identical.

use std::cmp::Reverse;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{Multipliers, Side};
use crate::combatant::{Combatant, CombatantId};

/// Record of one combatant's action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Who acted.
    pub actor: CombatantId,
    /// Who was hit.
    pub target: CombatantId,
    /// Damage dealt (at least [`MIN_DAMAGE`](crate::combat::MIN_DAMAGE)).
    pub damage: u32,
    /// The actor's HP ratio immediately after acting.
    pub actor_hp_ratio: f64,
    /// Whether the hit reduced the target to zero HP.
    pub target_killed: bool,
}

impl TurnEvent {
    /// Side of the acting combatant.
    #[must_use]
    pub fn side(&self) -> Side {
        self.actor.side
    }
}

/// Build the turn order for a round: alive combatants, fastest first.
///
/// Returns `(side, roster index, speed)` entries. The sort is stable over the
/// concatenation players-then-enemies, so equal speeds keep that order.
fn turn_order(players: &[Combatant], enemies: &[Combatant]) -> Vec<(Side, usize, i32)> {
    let mut order: Vec<(Side, usize, i32)> = players
        .iter()
        .enumerate()
        .chain(enemies.iter().enumerate())
        .filter(|(_, c)| c.is_alive())
        .map(|(index, c)| (c.side(), index, c.speed()))
        .collect();
    order.sort_by_key(|&(_, _, speed)| Reverse(speed));
    order
}

/// Resolve one round for both rosters.
///
/// Each combatant in turn order attacks a random living member of the
/// opposing roster. Combatants killed earlier in the round are skipped, and a
/// turn with no living opponent produces no event. Once the pass is over,
/// dead combatants are removed from both rosters.
pub fn resolve_round<R: Rng + ?Sized>(
    players: &mut Vec<Combatant>,
    enemies: &mut Vec<Combatant>,
    multipliers: Multipliers,
    rng: &mut R,
) -> Vec<TurnEvent> {
    let order = turn_order(players, enemies);
    let mut events = Vec::with_capacity(order.len());

    for (side, index, _) in order {
        let (own, opposing) = match side {
            Side::Player => (&*players, &mut *enemies),
            Side::Enemy => (&*enemies, &mut *players),
        };
        let actor = &own[index];
        if !actor.is_alive() {
            continue;
        }

        let mut pool: Vec<&mut Combatant> =
            opposing.iter_mut().filter(|c| c.is_alive()).collect();
        let Some((target, damage)) = actor.act_on(&mut pool, multipliers, rng) else {
            continue;
        };
        let target_killed = pool
            .iter()
            .any(|c| c.id() == target && !c.is_alive());

        events.push(TurnEvent {
            actor: actor.id(),
            target,
            damage,
            actor_hp_ratio: actor.hp_ratio(),
            target_killed,
        });
    }

    players.retain(Combatant::is_alive);
    enemies.retain(Combatant::is_alive);
    events
}
