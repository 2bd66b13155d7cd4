use serde::{Deserialize, Serialize};

use crate::ids::{AnimalId, CorpseId};
use crate::position::Position;
use crate::species::Species;

/// Immobile food record left behind by a dead animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpse {
    pub id: CorpseId,
    pub source_species: Species,
    pub source_id: AnimalId,
    pub position: Position,
    pub source_size: f64,
    pub food_value: f64,
    pub decay_timer: u32,
}

impl Corpse {
    /// A corpse is exhausted once it has nothing left to offer or its
    /// clock has run out — either condition removes it.
    pub fn is_exhausted(&self) -> bool {
        self.food_value <= 0.0 || self.decay_timer == 0
    }
}
