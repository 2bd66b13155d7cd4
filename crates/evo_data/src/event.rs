use serde::{Deserialize, Serialize};

use crate::death_cause::DeathCause;
use crate::ids::{AnimalId, CorpseId};

/// Synchronous simulation events, emitted by the façade after a tick
/// completes. Mirrors the event set in the external-interfaces contract —
/// subscribers observe state, they never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SimEvent {
    Tick {
        tick: u64,
        deer: usize,
        wolf: usize,
        vegetation: usize,
    },
    AnimalBorn {
        animal: AnimalId,
    },
    AnimalDied {
        animal: AnimalId,
        cause: DeathCause,
    },
    CorpseCreated {
        corpse: CorpseId,
    },
    CorpseRemoved {
        id: CorpseId,
    },
    Paused,
    Resumed,
    Reset,
}

/// The kind of a [`SimEvent`], used by subscribers that only want one slice
/// of the event stream (e.g. only `AnimalDied`) without matching on the
/// full enum themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Tick,
    AnimalBorn,
    AnimalDied,
    CorpseCreated,
    CorpseRemoved,
    Paused,
    Resumed,
    Reset,
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::Tick { .. } => EventKind::Tick,
            SimEvent::AnimalBorn { .. } => EventKind::AnimalBorn,
            SimEvent::AnimalDied { .. } => EventKind::AnimalDied,
            SimEvent::CorpseCreated { .. } => EventKind::CorpseCreated,
            SimEvent::CorpseRemoved { .. } => EventKind::CorpseRemoved,
            SimEvent::Paused => EventKind::Paused,
            SimEvent::Resumed => EventKind::Resumed,
            SimEvent::Reset => EventKind::Reset,
        }
    }
}
