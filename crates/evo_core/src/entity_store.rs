//! Entity store (spec §4.5): the sole owner of all animals and corpses.
//! Every other component addresses them by id.

use std::collections::BTreeMap;

use evo_data::{Animal, AnimalId, Corpse, CorpseId, Species};

/// Two keyed tables plus per-species monotonic id generators. `BTreeMap`
/// keeps iteration in id order for free, which callers rely on for stable
/// snapshot queries.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    animals: BTreeMap<AnimalId, Animal>,
    corpses: BTreeMap<CorpseId, Corpse>,
    next_deer_n: u64,
    next_wolf_n: u64,
    next_corpse_n: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `species`. Ids are never reused even after
    /// the entity they named is removed — the counter only goes up.
    pub fn next_animal_id(&mut self, species: Species) -> AnimalId {
        let n = match species {
            Species::Deer => {
                let n = self.next_deer_n;
                self.next_deer_n += 1;
                n
            }
            Species::Wolf => {
                let n = self.next_wolf_n;
                self.next_wolf_n += 1;
                n
            }
        };
        AnimalId::new(species.id_prefix(), n)
    }

    pub fn next_corpse_id(&mut self) -> CorpseId {
        let n = self.next_corpse_n;
        self.next_corpse_n += 1;
        CorpseId::new(n)
    }

    pub fn insert_animal(&mut self, animal: Animal) {
        self.animals.insert(animal.id.clone(), animal);
    }

    pub fn insert_corpse(&mut self, corpse: Corpse) {
        self.corpses.insert(corpse.id.clone(), corpse);
    }

    pub fn get_animal(&self, id: &AnimalId) -> Option<&Animal> {
        self.animals.get(id)
    }

    pub fn get_animal_mut(&mut self, id: &AnimalId) -> Option<&mut Animal> {
        self.animals.get_mut(id)
    }

    pub fn get_corpse(&self, id: &CorpseId) -> Option<&Corpse> {
        self.corpses.get(id)
    }

    pub fn get_corpse_mut(&mut self, id: &CorpseId) -> Option<&mut Corpse> {
        self.corpses.get_mut(id)
    }

    /// Replace state fields on an existing animal. Never creates — a
    /// missing id is a silent no-op, per the store's CRUD contract.
    pub fn update_animal(&mut self, id: &AnimalId, f: impl FnOnce(&mut Animal)) {
        if let Some(animal) = self.animals.get_mut(id) {
            f(animal);
        }
    }

    pub fn remove_corpse(&mut self, id: &CorpseId) -> Option<Corpse> {
        self.corpses.remove(id)
    }

    pub fn all_animals(&self) -> impl Iterator<Item = &Animal> {
        self.animals.values()
    }

    pub fn all_corpses(&self) -> impl Iterator<Item = &Corpse> {
        self.corpses.values()
    }

    pub fn living_animals(&self) -> impl Iterator<Item = &Animal> {
        self.animals.values().filter(|a| !a.is_dead)
    }

    pub fn animals_by_species(&self, species: Species) -> impl Iterator<Item = &Animal> {
        self.animals.values().filter(move |a| !a.is_dead && a.species == species)
    }

    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    pub fn living_count(&self) -> usize {
        self.animals.values().filter(|a| !a.is_dead).count()
    }

    pub fn corpse_count(&self) -> usize {
        self.corpses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_data::{BaseAttributes, BehavioralAttributes, DerivedStats, DietFlags, LifecycleAttributes, Position};

    fn dummy_animal(id: AnimalId, species: Species) -> Animal {
        Animal {
            id,
            species,
            diet: species.diet(),
            base: BaseAttributes { strength: 1.0, agility: 1.0, endurance: 1.0, perception: 1.0, size: 1.0 },
            behavioral: BehavioralAttributes { aggression: 0.1, flight_instinct: 0.1, carrion_preference: 0.1, food_priority_threshold: 0.5, reproductive_urge: 0.5 },
            lifecycle: LifecycleAttributes { max_age: 100, maturity_age: 10, litter_size: 1 },
            derived: DerivedStats { speed: 1.0, alert_range: 1.0, attack_power: 1.0, defense: 1.0, hunger_decay_rate: 0.1 },
            position: Position::new(0.0, 0.0),
            hunger: 50.0,
            age: 0,
            ticks_since_last_reproduction: 0,
            is_dead: false,
            parent_id: None,
            generation: 0,
        }
    }

    #[test]
    fn test_ids_monotonic_per_species() {
        let mut store = EntityStore::new();
        let a = store.next_animal_id(Species::Deer);
        let b = store.next_animal_id(Species::Deer);
        let c = store.next_animal_id(Species::Wolf);
        assert_eq!(a.as_str(), "deer_0");
        assert_eq!(b.as_str(), "deer_1");
        assert_eq!(c.as_str(), "wolf_0");
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let mut store = EntityStore::new();
        let id = store.next_animal_id(Species::Deer);
        store.insert_animal(dummy_animal(id.clone(), Species::Deer));
        store.update_animal(&id, |a| a.is_dead = true);
        let next = store.next_animal_id(Species::Deer);
        assert_ne!(id, next);
    }

    #[test]
    fn test_living_animals_excludes_dead() {
        let mut store = EntityStore::new();
        let id = store.next_animal_id(Species::Deer);
        store.insert_animal(dummy_animal(id.clone(), Species::Deer));
        assert_eq!(store.living_count(), 1);
        store.update_animal(&id, |a| a.is_dead = true);
        assert_eq!(store.living_count(), 0);
        assert_eq!(store.animal_count(), 1);
    }

    #[test]
    fn test_update_animal_on_missing_id_is_noop() {
        let mut store = EntityStore::new();
        let ghost = AnimalId::new("deer", 999);
        store.update_animal(&ghost, |a| a.hunger = 0.0);
        assert!(store.get_animal(&ghost).is_none());
    }
}
