//! The two-phase tick executor (spec §4.9) — the hardest subsystem.
//!
//! A tick has a hard barrier between deciding and acting: the decision
//! phase snapshots the living set, sorted by alert range descending (ties
//! by id ascending), and builds one [`Action`] per animal purely from
//! read-only state. The execution phase re-sorts the same way and applies
//! every action in order, skipping any animal already killed earlier in
//! the same tick. This keeps the *observed* world identical for every
//! agent during decision, and guarantees a prey killed by an earlier
//! predator cannot also be eaten by a later agent that independently chose
//! to eat it.

use std::collections::{HashMap, HashSet};

use evo_data::{Action, Animal, AnimalId, Corpse, CorpseId, DeathCause, FoodTarget, Position, SimEvent, Species};

use crate::config::Config;
use crate::decision;
use crate::entity_store::EntityStore;
use crate::genetics;
use crate::history::ActionHistorySink;
use crate::rng::Rng;
use crate::spatial::SpatialIndex;
use crate::vecmath::{clamp_to_world, distance};
use crate::vegetation::VegetationGrid;

/// Everything the tick executor needs, borrowed for the duration of one
/// `execute` call. Kept as a single bundle the way the teacher passes a
/// `SystemContext` into its decision/execution passes.
pub struct TickContext<'a> {
    pub store: &'a mut EntityStore,
    pub index: &'a mut SpatialIndex,
    pub vegetation: &'a mut VegetationGrid,
    pub config: &'a Config,
}

fn sorted_living_ids(store: &EntityStore) -> Vec<AnimalId> {
    let mut ids: Vec<(f64, AnimalId)> = store.living_animals().map(|a| (a.derived.alert_range, a.id.clone())).collect();
    ids.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then_with(|| a.1.cmp(&b.1)));
    ids.into_iter().map(|(_, id)| id).collect()
}

fn corpse_position(animal_pos: Position, vegetation: &VegetationGrid) -> Position {
    let (gx, gy) = vegetation.world_to_grid(animal_pos.x, animal_pos.y);
    vegetation.grid_to_world(gx, gy)
}

fn kill(id: &AnimalId, cause: DeathCause, ctx: &mut TickContext, deaths: &mut HashSet<AnimalId>, events: &mut Vec<SimEvent>) {
    let Some(animal) = ctx.store.get_animal(id).cloned() else { return };
    deaths.insert(id.clone());
    ctx.store.update_animal(id, |a| a.is_dead = true);
    ctx.index.remove(id);

    let food_value = animal.base.size * (animal.hunger / ctx.config.entities.max_hunger) * ctx.config.corpse.corpse_food_multiplier;
    let corpse_id = ctx.store.next_corpse_id();
    let corpse = Corpse {
        id: corpse_id.clone(),
        source_species: animal.species,
        source_id: animal.id.clone(),
        position: corpse_position(animal.position, ctx.vegetation),
        source_size: animal.base.size,
        food_value: food_value.max(0.0),
        decay_timer: ctx.config.corpse.corpse_decay_ticks,
    };
    ctx.store.insert_corpse(corpse);

    tracing::trace!(animal = %id, ?cause, "animal died");
    events.push(SimEvent::AnimalDied { animal: id.clone(), cause });
    events.push(SimEvent::CorpseCreated { corpse: corpse_id });
}

fn apply_decay(id: &AnimalId, ctx: &mut TickContext) {
    let max_hunger = ctx.config.entities.max_hunger;
    ctx.store.update_animal(id, |a| {
        a.hunger = (a.hunger - a.derived.hunger_decay_rate).clamp(0.0, max_hunger);
    });
}

/// Move up to `speed` units toward `target`, clamped to world bounds, and
/// debit `cost_per_unit * distance_moved` from hunger. Shared by
/// `MoveToFood`/`Drift` (only the cost-per-unit differs from `Flee`, which
/// inlines its own flee-tax version below).
fn move_toward(id: &AnimalId, target: Position, cost_per_unit: f64, ctx: &mut TickContext) {
    let Some(animal) = ctx.store.get_animal(id).cloned() else { return };
    let to_target = distance(animal.position, target);
    let step = to_target.min(animal.derived.speed);
    let raw_new_pos = if to_target <= f64::EPSILON {
        animal.position
    } else {
        let t = step / to_target;
        Position::new(
            animal.position.x + (target.x - animal.position.x) * t,
            animal.position.y + (target.y - animal.position.y) * t,
        )
    };
    let new_pos = clamp_to_world(raw_new_pos, ctx.config.world.world_width, ctx.config.world.world_height);
    let moved = distance(animal.position, new_pos);

    let max_hunger = ctx.config.entities.max_hunger;
    ctx.store.update_animal(id, |a| {
        a.position = new_pos;
        a.hunger = (a.hunger - cost_per_unit * moved).clamp(0.0, max_hunger);
    });
    ctx.index.update(id.clone(), new_pos, animal.base.size);
    apply_decay(id, ctx);
}

fn spawn_litter(parent: &Animal, ctx: &mut TickContext, rng: &mut Rng, events: &mut Vec<SimEvent>) {
    let cap = ctx.config.world.max_entities as usize;
    for _ in 0..parent.lifecycle.litter_size {
        if ctx.store.living_count() >= cap {
            break;
        }
        let (base, behavioral, lifecycle) = genetics::inherit_from(&parent.base, &parent.behavioral, &parent.lifecycle, ctx.config, rng);
        let derived = genetics::derive_stats(&base, ctx.config);

        let offset_max = ctx.config.entities.offspring_spawn_offset_max;
        let dx = rng.float_range(-offset_max, offset_max);
        let dy = rng.float_range(-offset_max, offset_max);
        let raw_pos = Position::new(parent.position.x + dx, parent.position.y + dy);
        let position = clamp_to_world(raw_pos, ctx.config.world.world_width, ctx.config.world.world_height);

        let offspring_id = ctx.store.next_animal_id(parent.species);
        let offspring = Animal {
            id: offspring_id.clone(),
            species: parent.species,
            diet: parent.diet,
            base,
            behavioral,
            lifecycle,
            derived,
            position,
            hunger: ctx.config.entities.initial_hunger_offspring,
            age: 0,
            ticks_since_last_reproduction: 0,
            is_dead: false,
            parent_id: Some(parent.id.clone()),
            generation: parent.generation + 1,
        };
        ctx.index.insert(offspring_id.clone(), offspring.position, offspring.base.size);
        ctx.store.insert_animal(offspring);
        tracing::trace!(parent = %parent.id, animal = %offspring_id, "animal born");
        events.push(SimEvent::AnimalBorn { animal: offspring_id });
    }
}

fn dispatch(id: &AnimalId, action: Action, ctx: &mut TickContext, rng: &mut Rng, deaths: &mut HashSet<AnimalId>, events: &mut Vec<SimEvent>) {
    if deaths.contains(id) {
        return;
    }
    let Some(animal) = ctx.store.get_animal(id).cloned() else { return };

    match action {
        Action::Die(cause) => kill(id, cause, ctx, deaths, events),

        Action::Flee { target_position } => {
            let new_pos = clamp_to_world(target_position, ctx.config.world.world_width, ctx.config.world.world_height);
            let moved = distance(animal.position, new_pos);
            let cost = (ctx.config.movement.move_cost + ctx.config.movement.flee_cost_bonus) * moved;
            let max_hunger = ctx.config.entities.max_hunger;
            ctx.store.update_animal(id, |a| {
                a.position = new_pos;
                a.hunger = (a.hunger - cost).clamp(0.0, max_hunger);
            });
            ctx.index.update(id.clone(), new_pos, animal.base.size);
            apply_decay(id, ctx);
        }

        Action::Eat { target: FoodTarget::Vegetation } => {
            let (gx, gy) = ctx.vegetation.world_to_grid(animal.position.x, animal.position.y);
            if ctx.vegetation.has(gx, gy) {
                ctx.vegetation.remove(gx, gy);
                let max_hunger = ctx.config.entities.max_hunger;
                let value = ctx.config.vegetation.vegetation_food_value;
                ctx.store.update_animal(id, |a| {
                    a.hunger = (a.hunger + value).min(max_hunger);
                });
            }
            apply_decay(id, ctx);
        }

        Action::Eat { target: FoodTarget::Corpse(corpse_id) } => {
            if let Some(corpse) = ctx.store.get_corpse(&corpse_id).cloned() {
                if corpse.food_value > 0.0 {
                    let taken = corpse.food_value.min(20.0);
                    let max_hunger = ctx.config.entities.max_hunger;
                    ctx.store.update_animal(id, |a| {
                        a.hunger = (a.hunger + taken).min(max_hunger);
                    });
                    let remaining = corpse.food_value - taken;
                    if remaining <= 0.0 {
                        ctx.store.remove_corpse(&corpse_id);
                        events.push(SimEvent::CorpseRemoved { id: corpse_id });
                    } else {
                        ctx.store.get_corpse_mut(&corpse_id).unwrap().food_value = remaining;
                    }
                }
            }
            apply_decay(id, ctx);
        }

        Action::MoveToFood { target } => move_toward(id, target, ctx.config.movement.move_cost, ctx),
        Action::Drift { target } => move_toward(id, target, ctx.config.movement.move_cost, ctx),

        Action::Attack { target_id } => {
            if let Some(target) = ctx.store.get_animal(&target_id).cloned() {
                if !target.is_dead && animal.derived.attack_power > target.derived.defense {
                    kill(&target_id, DeathCause::Killed, ctx, deaths, events);
                    let max_hunger = ctx.config.entities.max_hunger;
                    let gain = animal.base.size * 10.0;
                    ctx.store.update_animal(id, |a| {
                        a.hunger = (a.hunger + gain).min(max_hunger);
                    });
                    apply_decay(id, ctx);
                }
                // Otherwise: target survives, attacker gets nothing this tick.
            }
        }

        Action::Reproduce => {
            spawn_litter(&animal, ctx, rng, events);
            let max_hunger = ctx.config.entities.max_hunger;
            let cost = ctx.config.reproduction.reproduction_cost * max_hunger;
            ctx.store.update_animal(id, |a| {
                a.hunger = (a.hunger - cost).clamp(0.0, max_hunger);
                a.ticks_since_last_reproduction = 0;
            });
            apply_decay(id, ctx);
        }

        Action::Stay => apply_decay(id, ctx),
    }
}

/// Run one tick. Returns every [`SimEvent`] produced, with a leading
/// `Tick` summary event followed by whatever births/deaths/corpse activity
/// occurred, in the order they happened.
pub fn execute(ctx: &mut TickContext, rng: &mut Rng, tick: u64, mut history: Option<&mut dyn ActionHistorySink>) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let mut deaths: HashSet<AnimalId> = HashSet::new();

    // Decision phase: strictly read-only.
    let decision_order = sorted_living_ids(ctx.store);
    let mut decisions: HashMap<AnimalId, Action> = HashMap::with_capacity(decision_order.len());
    for id in &decision_order {
        if let Some(animal) = ctx.store.get_animal(id) {
            let action = decision::decide(animal, ctx.store, ctx.index, ctx.vegetation, ctx.config, rng);
            if let Some(sink) = history.as_deref_mut() {
                sink.record(id, tick, &action, &format!("{action:?}"));
            }
            decisions.insert(id.clone(), action);
        }
    }

    // Execution phase: same ordering rule, hard barrier already crossed.
    let execution_order = sorted_living_ids(ctx.store);
    for id in &execution_order {
        if let Some(action) = decisions.remove(id) {
            dispatch(id, action, ctx, rng, &mut deaths, &mut events);
        }
    }

    // Post-dispatch aging for survivors.
    for id in &execution_order {
        if !deaths.contains(id) {
            ctx.store.update_animal(id, |a| {
                a.age += 1;
                a.ticks_since_last_reproduction += 1;
            });
        }
    }

    // Age and remove exhausted corpses.
    let corpse_ids: Vec<CorpseId> = ctx.store.all_corpses().map(|c| c.id.clone()).collect();
    for corpse_id in corpse_ids {
        if let Some(corpse) = ctx.store.get_corpse_mut(&corpse_id) {
            if corpse.decay_timer > 0 {
                corpse.decay_timer -= 1;
            }
            if corpse.is_exhausted() {
                ctx.store.remove_corpse(&corpse_id);
                events.push(SimEvent::CorpseRemoved { id: corpse_id });
            }
        }
    }

    ctx.vegetation.spread(ctx.config.vegetation.vegetation_spread_rate, rng);

    check_invariants(ctx);

    let deer = ctx.store.animals_by_species(Species::Deer).count();
    let wolf = ctx.store.animals_by_species(Species::Wolf).count();
    events.insert(
        0,
        SimEvent::Tick {
            tick,
            deer,
            wolf,
            vegetation: ctx.vegetation.count(),
        },
    );

    events
}

/// Spec §3 invariant 4: the spatial index must mirror the living set
/// exactly. A mismatch here is an executor bug, not a user-visible
/// condition (spec §7), so it's a `debug_assert!`, never a `Result::Err`
/// returned across the façade boundary.
fn check_invariants(ctx: &TickContext) {
    let living = ctx.store.living_count();
    let indexed = ctx.index.len();
    debug_assert!(
        living == indexed,
        "{}",
        crate::error::SimError::InvariantViolation(format!("spatial index size {indexed} diverged from living count {living}"))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::baseline_for;

    fn make_animal(species: Species, id_n: u64, hunger: f64, config: &Config, pos: Position) -> Animal {
        let (base, behavioral, lifecycle) = baseline_for(species);
        let derived = genetics::derive_stats(&base, config);
        Animal {
            id: AnimalId::new(species.id_prefix(), id_n),
            species,
            diet: species.diet(),
            base,
            behavioral,
            lifecycle,
            derived,
            position: pos,
            hunger,
            age: 0,
            ticks_since_last_reproduction: 1000,
            is_dead: false,
            parent_id: None,
            generation: 0,
        }
    }

    #[test]
    fn test_starving_animal_dies_and_leaves_a_corpse() {
        let config = Config::default();
        let mut store = EntityStore::new();
        let mut index = SpatialIndex::new(config.performance.spatial_index_bucket_size);
        let mut vegetation = VegetationGrid::new(config.world.world_width, config.world.world_height, config.vegetation.tile_size);
        let mut rng = Rng::new(1);

        let animal = make_animal(Species::Deer, 0, 0.0, &config, Position::new(10.0, 10.0));
        index.insert(animal.id.clone(), animal.position, animal.base.size);
        store.insert_animal(animal.clone());

        let mut ctx = TickContext { store: &mut store, index: &mut index, vegetation: &mut vegetation, config: &config };
        let events = execute(&mut ctx, &mut rng, 0, None);

        assert!(store.get_animal(&animal.id).unwrap().is_dead);
        assert_eq!(store.corpse_count(), 1);
        assert!(events.iter().any(|e| matches!(e, SimEvent::AnimalDied { cause: DeathCause::Starvation, .. })));
        assert!(events.iter().any(|e| matches!(e, SimEvent::CorpseCreated { .. })));
    }

    #[test]
    fn test_old_age_triggers_death_within_two_steps() {
        let config = Config::default();
        let mut store = EntityStore::new();
        let mut index = SpatialIndex::new(config.performance.spatial_index_bucket_size);
        let mut vegetation = VegetationGrid::new(config.world.world_width, config.world.world_height, config.vegetation.tile_size);
        let mut rng = Rng::new(2);

        let mut animal = make_animal(Species::Deer, 0, 80.0, &config, Position::new(10.0, 10.0));
        animal.age = animal.lifecycle.max_age as u64 - 1;
        index.insert(animal.id.clone(), animal.position, animal.base.size);
        store.insert_animal(animal.clone());

        let mut ctx = TickContext { store: &mut store, index: &mut index, vegetation: &mut vegetation, config: &config };
        let mut died = false;
        for tick in 0..2 {
            let events = execute(&mut ctx, &mut rng, tick, None);
            if events.iter().any(|e| matches!(e, SimEvent::AnimalDied { cause: DeathCause::OldAge, .. })) {
                died = true;
            }
        }
        assert!(died);
    }

    #[test]
    fn test_reproduction_spawns_litter_and_debits_hunger() {
        let mut config = Config::default();
        config.reproduction.reproduction_cooldown = 0;
        let mut store = EntityStore::new();
        let mut index = SpatialIndex::new(config.performance.spatial_index_bucket_size);
        let mut vegetation = VegetationGrid::new(config.world.world_width, config.world.world_height, config.vegetation.tile_size);
        let mut rng = Rng::new(3);

        let mut animal = make_animal(Species::Deer, 0, 95.0, &config, Position::new(50.0, 50.0));
        animal.age = animal.lifecycle.maturity_age as u64 + 10;
        index.insert(animal.id.clone(), animal.position, animal.base.size);
        store.insert_animal(animal.clone());

        let mut ctx = TickContext { store: &mut store, index: &mut index, vegetation: &mut vegetation, config: &config };
        let mut reproduced = false;
        for tick in 0..20 {
            let events = execute(&mut ctx, &mut rng, tick, None);
            if events.iter().any(|e| matches!(e, SimEvent::AnimalBorn { .. })) {
                reproduced = true;
                break;
            }
        }
        assert!(reproduced);
        assert!(store.animal_count() > 1);
    }
}
