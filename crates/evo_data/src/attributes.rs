use serde::{Deserialize, Serialize};

/// Evolvable physical attributes. Bounds are enforced by `evo_core`'s
/// genetics module, not here — this struct only carries the values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseAttributes {
    pub strength: f64,
    pub agility: f64,
    pub endurance: f64,
    pub perception: f64,
    pub size: f64,
}

/// Evolvable behavioural attributes, all probabilities or thresholds in
/// `[0,1]`/`[0.1,0.9]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAttributes {
    pub aggression: f64,
    pub flight_instinct: f64,
    pub carrion_preference: f64,
    pub food_priority_threshold: f64,
    pub reproductive_urge: f64,
}

/// Evolvable lifecycle attributes. `max_age`/`maturity_age`/`litter_size`
/// are integer-valued even though they ride alongside floats during
/// mutation (rounded back to integers after clamping).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleAttributes {
    pub max_age: u32,
    pub maturity_age: u32,
    pub litter_size: u32,
}

/// Pure function of base attributes + config. Never stored as independent
/// truth; recomputed whenever base attributes change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub speed: f64,
    pub alert_range: f64,
    pub attack_power: f64,
    pub defense: f64,
    pub hunger_decay_rate: f64,
}
