//! Optional action-history sink (spec §4.10, §6 `set_action_history`).
//!
//! The façade doesn't require a sink — most callers only care about
//! [`evo_data::SimEvent`]s — but the crate ships a concrete, bounded
//! default so it's runnable out of the box, the way the teacher's
//! `HistoryLogger` concept gives `World` a working sink without any
//! shell wiring it up. Unlike the teacher's, this one never touches disk
//! or the network: it's an in-memory ring buffer only.

use std::collections::VecDeque;

use evo_data::{Action, AnimalId};

/// Receives `(animalId, tick, action, detail)` once per decided action,
/// every tick.
pub trait ActionHistorySink {
    fn record(&mut self, animal: &AnimalId, tick: u64, action: &Action, detail: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub animal: AnimalId,
    pub tick: u64,
    pub action: Action,
    pub detail: String,
}

/// Capped `VecDeque`-backed sink: oldest entries drop once `capacity` is
/// reached.
#[derive(Debug, Clone)]
pub struct RingBufferHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl RingBufferHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ActionHistorySink for RingBufferHistory {
    fn record(&mut self, animal: &AnimalId, tick: u64, action: &Action, detail: &str) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            animal: animal.clone(),
            tick,
            action: action.clone(),
            detail: detail.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_data::DeathCause;

    #[test]
    fn test_ring_buffer_drops_oldest_past_capacity() {
        let mut history = RingBufferHistory::new(2);
        let id = AnimalId::new("deer", 0);
        history.record(&id, 0, &Action::Stay, "stay");
        history.record(&id, 1, &Action::Stay, "stay");
        history.record(&id, 2, &Action::Die(DeathCause::OldAge), "died");
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries().next().unwrap().tick, 1);
    }
}
