use serde::{Deserialize, Serialize};

use crate::death_cause::DeathCause;
use crate::ids::{AnimalId, CorpseId};
use crate::position::Position;

/// What an animal is feeding on. Resolved once at decision time so the
/// execution phase never re-queries perception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FoodTarget {
    Vegetation,
    Corpse(CorpseId),
}

/// The single outcome of the decision rule (spec §4.8) for one animal in one
/// tick. Self-contained: every id, position, and kind the execution phase
/// needs was captured when the action was produced, never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Die(DeathCause),
    Flee { target_position: Position },
    Eat { target: FoodTarget },
    MoveToFood { target: Position },
    Attack { target_id: AnimalId },
    Reproduce,
    Drift { target: Position },
    Stay,
}
