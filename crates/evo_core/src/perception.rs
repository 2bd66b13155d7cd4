//! Threat, food, and mate finders (spec §4.7). Every finder is read-only:
//! it borrows the entity store, spatial index, and vegetation grid and
//! never mutates them, so it is safe to call from the decision phase while
//! other animals are still being decided.

use evo_data::{Animal, AnimalId, CorpseId, Position};

use crate::entity_store::EntityStore;
use crate::rng::Rng;
use crate::spatial::SpatialIndex;
use crate::vecmath::{add, distance, normalize, scale, subtract};
use crate::vegetation::VegetationGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct Threat {
    pub id: AnimalId,
    pub distance: f64,
}

/// `perceivedThreat = (other.attackPower * other.aggression) / self.defense`,
/// treating `defense == 0` as infinite (never threatening). Sorted by
/// distance ascending, ties by id ascending.
pub fn perceive_threats(animal: &Animal, store: &EntityStore, index: &SpatialIndex) -> Vec<Threat> {
    let candidates = index.query_radius(animal.position, animal.derived.alert_range);
    let mut threats: Vec<Threat> = candidates
        .into_iter()
        .filter(|id| *id != animal.id)
        .filter_map(|id| store.get_animal(&id))
        .filter(|other| !other.is_dead)
        .filter_map(|other| {
            let perceived_threat = if animal.derived.defense == 0.0 {
                f64::INFINITY
            } else {
                (other.derived.attack_power * other.behavioral.aggression) / animal.derived.defense
            };
            if perceived_threat > 1.0 - animal.behavioral.flight_instinct {
                Some(Threat {
                    id: other.id.clone(),
                    distance: distance(animal.position, other.position),
                })
            } else {
                None
            }
        })
        .collect();

    threats.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap().then_with(|| a.id.cmp(&b.id)));
    threats
}

/// Weighted repulsion away from every threat, normalised. Zero total
/// weight (no threats, or all at the observer's own position) yields the
/// zero vector; callers fall back to idle.
pub fn flee_vector(animal: &Animal, threats: &[Threat], store: &EntityStore) -> (f64, f64) {
    let mut total = (0.0, 0.0);
    for threat in threats {
        let Some(other) = store.get_animal(&threat.id) else { continue };
        let (dx, dy) = subtract(animal.position, other.position);
        let weight = 1.0 / threat.distance.max(1.0);
        total.0 += dx * weight;
        total.1 += dy * weight;
    }
    normalize(total)
}

pub fn nearest_vegetation(animal: &Animal, vegetation: &VegetationGrid) -> Option<Position> {
    let (gx, gy) = vegetation.world_to_grid(animal.position.x, animal.position.y);
    let max_ring = (animal.derived.alert_range / vegetation_tile_size(vegetation)).ceil() as i64;

    if vegetation.has(gx, gy) {
        return Some(vegetation.grid_to_world(gx, gy));
    }

    for ring in 1..=max_ring.max(1) {
        let mut best: Option<(f64, Position)> = None;
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let (nx, ny) = (gx + dx, gy + dy);
                if vegetation.has(nx, ny) {
                    let pos = vegetation.grid_to_world(nx, ny);
                    let d = distance(animal.position, pos);
                    if best.as_ref().map(|(bd, _)| d < *bd).unwrap_or(true) {
                        best = Some((d, pos));
                    }
                }
            }
        }
        if let Some((d, pos)) = best {
            if d <= animal.derived.alert_range {
                return Some(pos);
            }
        }
    }
    None
}

fn vegetation_tile_size(vegetation: &VegetationGrid) -> f64 {
    let sample = vegetation.grid_to_world(1, 0).x - vegetation.grid_to_world(0, 0).x;
    if sample <= 0.0 {
        1.0
    } else {
        sample
    }
}

/// Nearest corpse with non-zero `foodValue` within alert range. Ties by
/// distance then id.
pub fn nearest_corpse(animal: &Animal, store: &EntityStore) -> Option<CorpseId> {
    store
        .all_corpses()
        .filter(|c| c.food_value > 0.0)
        .map(|c| (distance(animal.position, c.position), c))
        .filter(|(d, _)| *d <= animal.derived.alert_range)
        .min_by(|(da, a), (db, b)| da.partial_cmp(db).unwrap().then_with(|| a.id.cmp(&b.id)))
        .map(|(_, c)| c.id.clone())
}

/// Nearest animal within alert range that is a different species and does
/// not itself hunt (`canEatAnimals == false`) — i.e. valid prey, excluding
/// other predators. Ties by distance then id.
pub fn nearest_prey(animal: &Animal, store: &EntityStore, index: &SpatialIndex) -> Option<AnimalId> {
    index
        .query_radius(animal.position, animal.derived.alert_range)
        .into_iter()
        .filter(|id| *id != animal.id)
        .filter_map(|id| store.get_animal(&id))
        .filter(|other| !other.is_dead && other.species != animal.species && !other.diet.can_eat_animals)
        .map(|other| (distance(animal.position, other.position), other))
        .min_by(|(da, a), (db, b)| da.partial_cmp(db).unwrap().then_with(|| a.id.cmp(&b.id)))
        .map(|(_, other)| other.id.clone())
}

/// Same-species, reproduction-ready, non-self, living neighbours within
/// alert range, sorted by fitness (`strength+agility+endurance`)
/// descending then distance ascending. Unused by the (asexual) decision
/// rule, kept as a first-class perception operation for completeness and
/// for any future sexual-reproduction variant.
pub fn find_mate(
    animal: &Animal,
    store: &EntityStore,
    index: &SpatialIndex,
    reproduction_cooldown: u32,
    reproduction_ready_threshold: f64,
) -> Option<AnimalId> {
    let mut candidates: Vec<&Animal> = index
        .query_radius(animal.position, animal.derived.alert_range)
        .into_iter()
        .filter(|id| *id != animal.id)
        .filter_map(|id| store.get_animal(&id))
        .filter(|other| {
            !other.is_dead
                && other.species == animal.species
                && other.is_mature()
                && other.ticks_since_last_reproduction >= reproduction_cooldown as u64
                && other.hunger > reproduction_ready_threshold
        })
        .collect();

    candidates.sort_by(|a, b| {
        let fitness_a = a.base.strength + a.base.agility + a.base.endurance;
        let fitness_b = b.base.strength + b.base.agility + b.base.endurance;
        fitness_b
            .partial_cmp(&fitness_a)
            .unwrap()
            .then_with(|| distance(animal.position, a.position).partial_cmp(&distance(animal.position, b.position)).unwrap())
            .then_with(|| a.id.cmp(&b.id))
    });

    candidates.first().map(|a| a.id.clone())
}

#[derive(Debug, Clone, PartialEq)]
pub enum FoodChoice {
    Vegetation(Position),
    Corpse(CorpseId),
    Prey(AnimalId),
}

/// Top-level food choice, dispatched on diet. Pure herbivores only ever
/// consider vegetation; carnivores weigh prey against carrion with exactly
/// one PRNG draw when both options exist, and none when only one does.
pub fn select_food(
    animal: &Animal,
    store: &EntityStore,
    index: &SpatialIndex,
    vegetation: &VegetationGrid,
    rng: &mut Rng,
) -> Option<FoodChoice> {
    if animal.diet.can_eat_vegetation && !animal.diet.can_eat_animals {
        return nearest_vegetation(animal, vegetation).map(FoodChoice::Vegetation);
    }

    if animal.diet.can_eat_animals {
        let prey = nearest_prey(animal, store, index);
        let corpse = if animal.diet.can_eat_corpses {
            nearest_corpse(animal, store)
        } else {
            None
        };

        return match (prey, corpse) {
            (Some(p), Some(c)) => {
                let u = rng.uniform();
                if u < animal.behavioral.carrion_preference {
                    Some(FoodChoice::Corpse(c))
                } else {
                    Some(FoodChoice::Prey(p))
                }
            }
            (Some(p), None) => Some(FoodChoice::Prey(p)),
            (None, Some(c)) => Some(FoodChoice::Corpse(c)),
            (None, None) => None,
        };
    }

    None
}

/// Candidate flee target, `pos + fleeDir * speed`, per spec §4.8 step 2.
pub fn flee_target(animal: &Animal, flee_dir: (f64, f64)) -> Position {
    add(animal.position, scale(flee_dir, animal.derived.speed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_data::{BaseAttributes, BehavioralAttributes, DerivedStats, LifecycleAttributes, Species};

    fn make_animal(id: &str, species: Species, pos: Position) -> Animal {
        Animal {
            id: AnimalId::new(id, 0),
            species,
            diet: species.diet(),
            base: BaseAttributes { strength: 10.0, agility: 10.0, endurance: 10.0, perception: 10.0, size: 1.0 },
            behavioral: BehavioralAttributes { aggression: 0.5, flight_instinct: 0.2, carrion_preference: 0.3, food_priority_threshold: 0.5, reproductive_urge: 0.5 },
            lifecycle: LifecycleAttributes { max_age: 500, maturity_age: 50, litter_size: 2 },
            derived: DerivedStats { speed: 2.0, alert_range: 20.0, attack_power: 10.0, defense: 2.0, hunger_decay_rate: 0.1 },
            position: pos,
            hunger: 50.0,
            age: 100,
            ticks_since_last_reproduction: 100,
            is_dead: false,
            parent_id: None,
            generation: 0,
        }
    }

    #[test]
    fn test_no_threats_when_index_empty() {
        let store = EntityStore::new();
        let index = SpatialIndex::new(10.0);
        let animal = make_animal("deer", Species::Deer, Position::new(0.0, 0.0));
        assert!(perceive_threats(&animal, &store, &index).is_empty());
    }

    #[test]
    fn test_threat_detected_when_perceived_threat_exceeds_flight_instinct() {
        let mut store = EntityStore::new();
        let mut index = SpatialIndex::new(50.0);

        let wolf = make_animal("wolf", Species::Wolf, Position::new(1.0, 0.0));
        index.insert(wolf.id.clone(), wolf.position, wolf.base.size);
        store.insert_animal(wolf.clone());

        let deer = make_animal("deer", Species::Deer, Position::new(0.0, 0.0));
        let threats = perceive_threats(&deer, &store, &index);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].id, wolf.id);
    }

    #[test]
    fn test_flee_vector_zero_with_no_threats() {
        let store = EntityStore::new();
        let animal = make_animal("deer", Species::Deer, Position::new(0.0, 0.0));
        assert_eq!(flee_vector(&animal, &[], &store), (0.0, 0.0));
    }
}
