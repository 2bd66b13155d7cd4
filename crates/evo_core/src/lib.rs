//! # Evolution Sandbox core
//!
//! The deterministic simulation kernel for Evolution Sandbox: a seeded,
//! tick-driven predator/prey ecosystem. This crate owns every piece of the
//! kernel — PRNG, vegetation grid, spatial index, entity store, genetics,
//! perception, the decision rule, and the two-phase tick executor — behind
//! a single façade, [`simulation::Simulation`], that is the only type a
//! shell (renderer, CLI, test harness) ever needs to hold.
//!
//! Given the same [`config::Config`] and seed, [`simulation::Simulation`]
//! replays bit-for-bit: no wall clock, no global RNG, no hidden mutable
//! state outside what `Simulation` owns.

/// Typed, bounds-checked configuration (world/vegetation/entities/...).
pub mod config;
/// Priority-ladder decision rule: one [`evo_data::Action`] per animal per tick.
pub mod decision;
/// The sole owner of all animals and corpses.
pub mod entity_store;
/// Typed errors at the core boundary.
pub mod error;
/// Synchronous pub/sub over [`evo_data::SimEvent`].
pub mod event_bus;
/// Asexual inheritance, clamped mutation, and derived-stat formulas.
pub mod genetics;
/// Optional action-history sink for the façade.
pub mod history;
/// Threat/food/mate finders consumed by the decision rule.
pub mod perception;
/// Deterministic PRNG: uniform, integer/float ranges, booleans, normal.
pub mod rng;
/// The simulation façade: lifecycle, events, snapshot queries.
pub mod simulation;
/// Bucketed proximity index over mobile entities.
pub mod spatial;
/// The two-phase tick executor.
pub mod tick;
/// 2-D vector utilities.
pub mod vecmath;
/// Dense boolean vegetation grid with spread.
pub mod vegetation;

pub use config::{Config, ConfigWarning};
pub use error::{ConfigError, SimError};
pub use event_bus::{EventBus, SubscriptionId};
pub use history::{ActionHistorySink, HistoryEntry, RingBufferHistory};
pub use rng::Rng;
pub use simulation::Simulation;
