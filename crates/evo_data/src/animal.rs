use serde::{Deserialize, Serialize};

use crate::attributes::{BaseAttributes, BehavioralAttributes, DerivedStats, LifecycleAttributes};
use crate::ids::AnimalId;
use crate::position::Position;
use crate::species::{DietFlags, Species};

/// A living mobile agent. The entity store is the sole owner; every other
/// component addresses an animal by its [`AnimalId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub species: Species,
    pub diet: DietFlags,

    pub base: BaseAttributes,
    pub behavioral: BehavioralAttributes,
    pub lifecycle: LifecycleAttributes,
    pub derived: DerivedStats,

    pub position: Position,
    pub hunger: f64,
    pub age: u64,
    pub ticks_since_last_reproduction: u64,
    pub is_dead: bool,

    pub parent_id: Option<AnimalId>,
    pub generation: u32,
}

impl Animal {
    pub fn is_mature(&self) -> bool {
        self.age >= self.lifecycle.maturity_age as u64
    }
}
