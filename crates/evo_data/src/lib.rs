//! Plain-old-data types shared by the simulation kernel and any shell built
//! on top of it. No simulation logic and no randomness lives here — only
//! the records `evo_core` reads, writes, and serialises.

pub mod action;
pub mod animal;
pub mod attributes;
pub mod corpse;
pub mod death_cause;
pub mod event;
pub mod ids;
pub mod position;
pub mod species;

pub use action::{Action, FoodTarget};
pub use animal::Animal;
pub use attributes::{BaseAttributes, BehavioralAttributes, DerivedStats, LifecycleAttributes};
pub use corpse::Corpse;
pub use death_cause::DeathCause;
pub use event::{EventKind, SimEvent};
pub use ids::{AnimalId, CorpseId};
pub use position::Position;
pub use species::{DietFlags, Species};
