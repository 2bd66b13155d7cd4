//! Attribute bounds, species baselines, derived-stat formulas, and the
//! asexual inheritance + mutation pipeline (spec §4.6).

use evo_data::{BaseAttributes, BehavioralAttributes, DerivedStats, LifecycleAttributes, Species};

use crate::config::Config;
use crate::rng::Rng;

pub const STRENGTH_BOUNDS: (f64, f64) = (1.0, 20.0);
pub const AGILITY_BOUNDS: (f64, f64) = (1.0, 20.0);
pub const ENDURANCE_BOUNDS: (f64, f64) = (1.0, 20.0);
pub const PERCEPTION_BOUNDS: (f64, f64) = (1.0, 20.0);
pub const SIZE_BOUNDS: (f64, f64) = (0.3, 3.0);

pub const AGGRESSION_BOUNDS: (f64, f64) = (0.0, 1.0);
pub const FLIGHT_INSTINCT_BOUNDS: (f64, f64) = (0.0, 1.0);
pub const CARRION_PREFERENCE_BOUNDS: (f64, f64) = (0.0, 1.0);
pub const FOOD_PRIORITY_THRESHOLD_BOUNDS: (f64, f64) = (0.1, 0.9);
pub const REPRODUCTIVE_URGE_BOUNDS: (f64, f64) = (0.1, 0.9);

pub const MAX_AGE_BOUNDS: (u32, u32) = (50, 2000);
pub const MATURITY_AGE_BOUNDS: (u32, u32) = (10, 500);
pub const LITTER_SIZE_BOUNDS: (u32, u32) = (1, 4);

/// Species-level starting point for new, non-offspring animals. Per-species
/// differences are data, not code (spec §9) — one baseline table, one
/// mutation pipeline, one decision rule serve both species.
pub fn baseline_for(species: Species) -> (BaseAttributes, BehavioralAttributes, LifecycleAttributes) {
    match species {
        Species::Deer => (
            BaseAttributes {
                strength: 4.0,
                agility: 12.0,
                endurance: 10.0,
                perception: 10.0,
                size: 1.0,
            },
            BehavioralAttributes {
                aggression: 0.05,
                flight_instinct: 0.8,
                carrion_preference: 0.0,
                food_priority_threshold: 0.6,
                reproductive_urge: 0.5,
            },
            LifecycleAttributes {
                max_age: 600,
                maturity_age: 30,
                litter_size: 2,
            },
        ),
        Species::Wolf => (
            BaseAttributes {
                strength: 12.0,
                agility: 10.0,
                endurance: 9.0,
                perception: 9.0,
                size: 1.3,
            },
            BehavioralAttributes {
                aggression: 0.7,
                flight_instinct: 0.2,
                carrion_preference: 0.3,
                food_priority_threshold: 0.5,
                reproductive_urge: 0.4,
            },
            LifecycleAttributes {
                max_age: 500,
                maturity_age: 35,
                litter_size: 3,
            },
        ),
    }
}

/// Pure function of base attributes + config. Never stored as independent
/// truth — callers recompute after any change to base attributes.
pub fn derive_stats(base: &BaseAttributes, config: &Config) -> DerivedStats {
    let speed = base.agility * base.size.powf(-0.5) * config.derived_stats.speed_multiplier;
    let alert_range = base.perception * config.derived_stats.perception_multiplier;
    let attack_power = base.strength * base.size.sqrt();
    let defense = base.size * (1.0 + 0.3 * base.agility);
    let hunger_decay_rate = config.derived_stats.base_decay * (base.size + 0.3 * speed) / base.endurance;

    DerivedStats {
        speed,
        alert_range,
        attack_power,
        defense,
        hunger_decay_rate,
    }
}

/// Draw `m ~ N(0,rate)` and return `clamp(v*(1+m), bounds)`. Zero rate means
/// `m` is always `0`, so this is the identity when `rate == 0`.
fn mutate_value(v: f64, rate: f64, bounds: (f64, f64), rng: &mut Rng) -> f64 {
    let m = rng.normal(0.0, rate);
    (v * (1.0 + m)).clamp(bounds.0, bounds.1)
}

fn mutate_value_u32(v: u32, rate: f64, bounds: (u32, u32), rng: &mut Rng) -> u32 {
    let m = rng.normal(0.0, rate);
    let mutated = (v as f64 * (1.0 + m)).round();
    mutated.clamp(bounds.0 as f64, bounds.1 as f64) as u32
}

/// Copy-then-mutate offspring attributes from a single parent (asexual).
/// Draw order is fixed — base, then behavioural, then lifecycle, each in
/// struct-declaration order — so the PRNG consumption is reproducible.
pub fn inherit_from(
    parent_base: &BaseAttributes,
    parent_behavioral: &BehavioralAttributes,
    parent_lifecycle: &LifecycleAttributes,
    config: &Config,
    rng: &mut Rng,
) -> (BaseAttributes, BehavioralAttributes, LifecycleAttributes) {
    let rate_base = config.evolution.base_mutation_rate;
    let base = BaseAttributes {
        strength: mutate_value(parent_base.strength, rate_base, STRENGTH_BOUNDS, rng),
        agility: mutate_value(parent_base.agility, rate_base, AGILITY_BOUNDS, rng),
        endurance: mutate_value(parent_base.endurance, rate_base, ENDURANCE_BOUNDS, rng),
        perception: mutate_value(parent_base.perception, rate_base, PERCEPTION_BOUNDS, rng),
        size: mutate_value(parent_base.size, rate_base, SIZE_BOUNDS, rng),
    };

    let rate_behavioral = config.evolution.behavioral_mutation_rate;
    let behavioral = BehavioralAttributes {
        aggression: mutate_value(parent_behavioral.aggression, rate_behavioral, AGGRESSION_BOUNDS, rng),
        flight_instinct: mutate_value(parent_behavioral.flight_instinct, rate_behavioral, FLIGHT_INSTINCT_BOUNDS, rng),
        carrion_preference: mutate_value(parent_behavioral.carrion_preference, rate_behavioral, CARRION_PREFERENCE_BOUNDS, rng),
        food_priority_threshold: mutate_value(parent_behavioral.food_priority_threshold, rate_behavioral, FOOD_PRIORITY_THRESHOLD_BOUNDS, rng),
        reproductive_urge: mutate_value(parent_behavioral.reproductive_urge, rate_behavioral, REPRODUCTIVE_URGE_BOUNDS, rng),
    };

    let rate_lifecycle = config.evolution.lifecycle_mutation_rate;
    let max_age = mutate_value_u32(parent_lifecycle.max_age, rate_lifecycle, MAX_AGE_BOUNDS, rng);
    let maturity_age_raw = mutate_value_u32(parent_lifecycle.maturity_age, rate_lifecycle, MATURITY_AGE_BOUNDS, rng);
    let litter_size = mutate_value_u32(parent_lifecycle.litter_size, rate_lifecycle, LITTER_SIZE_BOUNDS, rng);

    // Enforce maturityAge < maxAge by clamping to maxAge - 1.
    let maturity_age = maturity_age_raw.min(max_age.saturating_sub(1));

    let lifecycle = LifecycleAttributes {
        max_age,
        maturity_age,
        litter_size,
    };

    (base, behavioral, lifecycle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_mutation_rate_is_identity() {
        let config = Config::default();
        let mut config = config;
        config.evolution.base_mutation_rate = 0.0;
        config.evolution.behavioral_mutation_rate = 0.0;
        config.evolution.lifecycle_mutation_rate = 0.0;

        let (base, behavioral, lifecycle) = baseline_for(Species::Deer);
        let mut rng = Rng::new(1);
        let (b2, beh2, lc2) = inherit_from(&base, &behavioral, &lifecycle, &config, &mut rng);

        assert_eq!(base, b2);
        assert_eq!(behavioral, beh2);
        assert_eq!(lifecycle, lc2);
    }

    #[test]
    fn test_mutation_respects_bounds() {
        let mut config = Config::default();
        config.evolution.base_mutation_rate = 5.0;
        config.evolution.behavioral_mutation_rate = 5.0;
        config.evolution.lifecycle_mutation_rate = 5.0;

        let (base, behavioral, lifecycle) = baseline_for(Species::Wolf);
        let mut rng = Rng::new(9);
        for _ in 0..200 {
            let (b, beh, lc) = inherit_from(&base, &behavioral, &lifecycle, &config, &mut rng);
            assert!((STRENGTH_BOUNDS.0..=STRENGTH_BOUNDS.1).contains(&b.strength));
            assert!((SIZE_BOUNDS.0..=SIZE_BOUNDS.1).contains(&b.size));
            assert!((AGGRESSION_BOUNDS.0..=AGGRESSION_BOUNDS.1).contains(&beh.aggression));
            assert!(lc.maturity_age < lc.max_age);
        }
    }

    #[test]
    fn test_derived_stats_are_pure_function_of_base() {
        let config = Config::default();
        let base = BaseAttributes {
            strength: 10.0,
            agility: 8.0,
            endurance: 5.0,
            perception: 6.0,
            size: 1.0,
        };
        let d1 = derive_stats(&base, &config);
        let d2 = derive_stats(&base, &config);
        assert_eq!(d1, d2);
        assert_eq!(d1.attack_power, 10.0 * 1.0_f64.sqrt());
    }
}
