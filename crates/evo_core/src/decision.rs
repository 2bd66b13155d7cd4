//! The priority-ladder decision rule (spec §4.8). Produces exactly one
//! [`Action`] per animal per tick. Every probabilistic branch below draws a
//! fixed, documented number of PRNG values in a fixed order, so two runs
//! with the same seed make the same decisions in the same order.

use evo_data::{Action, Animal, DeathCause, FoodTarget};

use crate::config::Config;
use crate::entity_store::EntityStore;
use crate::perception::{self, FoodChoice};
use crate::rng::Rng;
use crate::spatial::SpatialIndex;
use crate::vecmath::{add, distance, scale};
use crate::vegetation::VegetationGrid;

fn contact_range(self_size: f64, other_size: f64) -> f64 {
    self_size + other_size + 2.0
}

fn attack_roll_passes(aggression: f64, hunger_ratio: f64, rng: &mut Rng) -> bool {
    rng.uniform() < aggression * (1.0 - hunger_ratio)
}

fn random_unit(rng: &mut Rng) -> (f64, f64) {
    let angle = rng.uniform() * std::f64::consts::TAU;
    (angle.cos(), angle.sin())
}

/// Decide one animal's action for this tick, given a read-only view of the
/// world as it stood at the start of the decision phase.
pub fn decide(
    animal: &Animal,
    store: &EntityStore,
    index: &SpatialIndex,
    vegetation: &VegetationGrid,
    config: &Config,
    rng: &mut Rng,
) -> Action {
    let max_hunger = config.entities.max_hunger;
    let hunger_ratio = animal.hunger / max_hunger;

    // 1. Death.
    if animal.hunger <= 0.0 {
        return Action::Die(DeathCause::Starvation);
    }
    if animal.age >= animal.lifecycle.max_age as u64 {
        return Action::Die(DeathCause::OldAge);
    }

    // 2. Flee.
    let threats = perception::perceive_threats(animal, store, index);
    if !threats.is_empty() {
        let should_flee = if hunger_ratio > animal.behavioral.food_priority_threshold {
            true
        } else {
            rng.uniform() < hunger_ratio / animal.behavioral.food_priority_threshold
        };
        if should_flee {
            let flee_dir = perception::flee_vector(animal, &threats, store);
            if flee_dir != (0.0, 0.0) {
                return Action::Flee {
                    target_position: perception::flee_target(animal, flee_dir),
                };
            }
            // Zero weighted direction: nothing to flee toward: fall back to idle.
            return idle_action(animal, hunger_ratio, rng);
        }
    }

    // 3. Feeding.
    if hunger_ratio < 0.9 {
        if let Some(choice) = perception::select_food(animal, store, index, vegetation, rng) {
            match choice {
                FoodChoice::Prey(prey_id) => {
                    if let Some(prey) = store.get_animal(&prey_id) {
                        let d = distance(animal.position, prey.position);
                        let contact = contact_range(animal.base.size, prey.base.size);
                        if d <= contact {
                            if attack_roll_passes(animal.behavioral.aggression, hunger_ratio, rng) {
                                return Action::Attack { target_id: prey_id };
                            }
                            // Roll failed: fall through to later priorities.
                        } else {
                            return Action::MoveToFood { target: prey.position };
                        }
                    }
                }
                FoodChoice::Vegetation(pos) => {
                    let (agx, agy) = vegetation.world_to_grid(animal.position.x, animal.position.y);
                    let (tgx, tgy) = vegetation.world_to_grid(pos.x, pos.y);
                    if (agx, agy) == (tgx, tgy) {
                        return Action::Eat {
                            target: FoodTarget::Vegetation,
                        };
                    }
                    return Action::MoveToFood { target: pos };
                }
                FoodChoice::Corpse(corpse_id) => {
                    if let Some(corpse) = store.get_corpse(&corpse_id) {
                        let d = distance(animal.position, corpse.position);
                        if d <= animal.base.size + 2.0 {
                            return Action::Eat {
                                target: FoodTarget::Corpse(corpse_id),
                            };
                        }
                        return Action::MoveToFood { target: corpse.position };
                    }
                }
            }
        }
    }

    // 4. Opportunistic attack.
    if animal.diet.can_eat_animals && hunger_ratio >= 0.9 {
        if let Some(prey_id) = perception::nearest_prey(animal, store, index) {
            if let Some(prey) = store.get_animal(&prey_id) {
                let d = distance(animal.position, prey.position);
                let contact = contact_range(animal.base.size, prey.base.size);
                if d <= contact && attack_roll_passes(animal.behavioral.aggression, hunger_ratio, rng) {
                    return Action::Attack { target_id: prey_id };
                }
            }
        }
    }

    // 5. Reproduce.
    let reproduction_threshold =
        (config.reproduction.reproduction_cost * animal.lifecycle.litter_size as f64 + config.reproduction.reproduction_safety_buffer) * max_hunger;
    if animal.is_mature()
        && animal.hunger > reproduction_threshold
        && animal.ticks_since_last_reproduction >= config.reproduction.reproduction_cooldown as u64
        && rng.uniform() < animal.behavioral.reproductive_urge
    {
        return Action::Reproduce;
    }

    // 6. Idle.
    idle_action(animal, hunger_ratio, rng)
}

fn idle_action(animal: &Animal, hunger_ratio: f64, rng: &mut Rng) -> Action {
    if hunger_ratio < 0.9 {
        let unit = random_unit(rng);
        let target = add(animal.position, scale(unit, animal.derived.speed / 2.0));
        Action::Drift { target }
    } else {
        Action::Stay
    }
}
