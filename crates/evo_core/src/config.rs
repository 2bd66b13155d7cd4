//! Typed, bounds-checked configuration (spec §4.2).
//!
//! Mirrors the teacher's `AppConfig`: a nested record of small, focused
//! sub-configs, each with a literal [`Default`], loaded from a partial JSON
//! document (`#[serde(default)]` throughout) and always run through
//! [`Config::validate`] before use. Unlike the teacher's `validate`, which
//! returns an `anyhow::Result<()>` and rejects bad input outright, this one
//! never rejects — per spec §7 configuration is always accepted after
//! clamping, so `validate` returns the clamped config plus a list of
//! human-readable warnings. `anyhow` stays out of this crate entirely: the
//! only hard error here is malformed JSON, which `ConfigError` already
//! covers, and `anyhow::Result` is reserved for the CLI binary's `main`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub initial_deer_count: u32,
    pub initial_wolf_count: u32,
    pub max_entities: u32,
    pub initial_spawn_min_distance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 200.0,
            world_height: 200.0,
            initial_deer_count: 30,
            initial_wolf_count: 8,
            max_entities: 2000,
            initial_spawn_min_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationConfig {
    pub tile_size: f64,
    pub initial_vegetation_density: f64,
    pub vegetation_spread_rate: f64,
    pub vegetation_food_value: f64,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            tile_size: 2.0,
            initial_vegetation_density: 0.3,
            vegetation_spread_rate: 0.02,
            vegetation_food_value: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitiesConfig {
    pub max_hunger: f64,
    pub initial_hunger_spawn: f64,
    pub initial_hunger_offspring: f64,
    pub offspring_spawn_offset_max: f64,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            max_hunger: 100.0,
            initial_hunger_spawn: 60.0,
            initial_hunger_offspring: 40.0,
            offspring_spawn_offset_max: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedStatsConfig {
    pub speed_multiplier: f64,
    pub perception_multiplier: f64,
    pub base_decay: f64,
}

impl Default for DerivedStatsConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.5,
            perception_multiplier: 2.0,
            base_decay: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_cost: f64,
    pub flee_cost_bonus: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_cost: 0.08,
            flee_cost_bonus: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    pub reproduction_cost: f64,
    pub reproduction_safety_buffer: f64,
    pub reproduction_cooldown: u32,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            reproduction_cost: 0.4,
            reproduction_safety_buffer: 0.1,
            reproduction_cooldown: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub base_mutation_rate: f64,
    pub behavioral_mutation_rate: f64,
    pub lifecycle_mutation_rate: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            base_mutation_rate: 0.1,
            behavioral_mutation_rate: 0.1,
            lifecycle_mutation_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpseConfig {
    pub corpse_food_multiplier: f64,
    pub corpse_decay_ticks: u32,
}

impl Default for CorpseConfig {
    fn default() -> Self {
        Self {
            corpse_food_multiplier: 2.0,
            corpse_decay_ticks: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub spatial_index_bucket_size: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            spatial_index_bucket_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_hz: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 10.0 }
    }
}

/// The full, nested parameter bundle. Every leaf field has a declared
/// `[min,max]` enforced by [`Config::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub vegetation: VegetationConfig,
    pub entities: EntitiesConfig,
    pub derived_stats: DerivedStatsConfig,
    pub movement: MovementConfig,
    pub reproduction: ReproductionConfig,
    pub evolution: EvolutionConfig,
    pub corpse: CorpseConfig,
    pub performance: PerformanceConfig,
    pub ui: UiConfig,
}

/// A single clamp or cross-field rescale applied during validation.
/// Configuration is always accepted — this is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

fn clamp_field(value: f64, lo: f64, hi: f64, field: &str, warnings: &mut Vec<ConfigWarning>) -> f64 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warnings.push(ConfigWarning {
            field: field.to_string(),
            message: format!("{value} out of bounds [{lo},{hi}], clamped to {clamped}"),
        });
    }
    clamped
}

fn clamp_field_u32(value: u32, lo: u32, hi: u32, field: &str, warnings: &mut Vec<ConfigWarning>) -> u32 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warnings.push(ConfigWarning {
            field: field.to_string(),
            message: format!("{value} out of bounds [{lo},{hi}], clamped to {clamped}"),
        });
    }
    clamped
}

impl Config {
    /// Load a partial JSON document — unknown keys ignored, missing keys
    /// defaulted — then always validate. The only hard error is malformed
    /// JSON at this boundary.
    pub fn from_json(content: &str) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let raw: Self = serde_json::from_str(content)?;
        Ok(raw.validate())
    }

    /// Clamp every field to its declared bounds, apply cross-field rules,
    /// and return the clamped config plus every adjustment made.
    pub fn validate(mut self) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        self.world.world_width = clamp_field(self.world.world_width, 10.0, 10_000.0, "world.world_width", &mut warnings);
        self.world.world_height = clamp_field(self.world.world_height, 10.0, 10_000.0, "world.world_height", &mut warnings);
        self.world.initial_deer_count = clamp_field_u32(self.world.initial_deer_count, 0, 10_000, "world.initial_deer_count", &mut warnings);
        self.world.initial_wolf_count = clamp_field_u32(self.world.initial_wolf_count, 0, 10_000, "world.initial_wolf_count", &mut warnings);
        self.world.max_entities = clamp_field_u32(self.world.max_entities, 1, 100_000, "world.max_entities", &mut warnings);
        self.world.initial_spawn_min_distance = clamp_field(self.world.initial_spawn_min_distance, 0.0, 100.0, "world.initial_spawn_min_distance", &mut warnings);

        self.vegetation.tile_size = clamp_field(self.vegetation.tile_size, 0.1, 100.0, "vegetation.tile_size", &mut warnings);
        self.vegetation.initial_vegetation_density = clamp_field(self.vegetation.initial_vegetation_density, 0.0, 1.0, "vegetation.initial_vegetation_density", &mut warnings);
        self.vegetation.vegetation_spread_rate = clamp_field(self.vegetation.vegetation_spread_rate, 0.0, 1.0, "vegetation.vegetation_spread_rate", &mut warnings);
        self.vegetation.vegetation_food_value = clamp_field(self.vegetation.vegetation_food_value, 0.0, 1_000.0, "vegetation.vegetation_food_value", &mut warnings);

        self.entities.max_hunger = clamp_field(self.entities.max_hunger, 1.0, 10_000.0, "entities.max_hunger", &mut warnings);
        self.entities.initial_hunger_spawn = clamp_field(self.entities.initial_hunger_spawn, 0.0, self.entities.max_hunger, "entities.initial_hunger_spawn", &mut warnings);
        self.entities.initial_hunger_offspring = clamp_field(self.entities.initial_hunger_offspring, 0.0, self.entities.max_hunger, "entities.initial_hunger_offspring", &mut warnings);
        self.entities.offspring_spawn_offset_max = clamp_field(self.entities.offspring_spawn_offset_max, 0.0, 100.0, "entities.offspring_spawn_offset_max", &mut warnings);

        self.derived_stats.speed_multiplier = clamp_field(self.derived_stats.speed_multiplier, 0.01, 100.0, "derived_stats.speed_multiplier", &mut warnings);
        self.derived_stats.perception_multiplier = clamp_field(self.derived_stats.perception_multiplier, 0.01, 100.0, "derived_stats.perception_multiplier", &mut warnings);
        self.derived_stats.base_decay = clamp_field(self.derived_stats.base_decay, 0.0, 100.0, "derived_stats.base_decay", &mut warnings);

        self.movement.move_cost = clamp_field(self.movement.move_cost, 0.0, 100.0, "movement.move_cost", &mut warnings);
        self.movement.flee_cost_bonus = clamp_field(self.movement.flee_cost_bonus, 0.0, 100.0, "movement.flee_cost_bonus", &mut warnings);

        self.reproduction.reproduction_cost = clamp_field(self.reproduction.reproduction_cost, 0.0, 1.0, "reproduction.reproduction_cost", &mut warnings);
        self.reproduction.reproduction_safety_buffer = clamp_field(self.reproduction.reproduction_safety_buffer, 0.0, 1.0, "reproduction.reproduction_safety_buffer", &mut warnings);
        self.reproduction.reproduction_cooldown = clamp_field_u32(self.reproduction.reproduction_cooldown, 0, 100_000, "reproduction.reproduction_cooldown", &mut warnings);

        self.evolution.base_mutation_rate = clamp_field(self.evolution.base_mutation_rate, 0.0, 10.0, "evolution.base_mutation_rate", &mut warnings);
        self.evolution.behavioral_mutation_rate = clamp_field(self.evolution.behavioral_mutation_rate, 0.0, 10.0, "evolution.behavioral_mutation_rate", &mut warnings);
        self.evolution.lifecycle_mutation_rate = clamp_field(self.evolution.lifecycle_mutation_rate, 0.0, 10.0, "evolution.lifecycle_mutation_rate", &mut warnings);

        self.corpse.corpse_food_multiplier = clamp_field(self.corpse.corpse_food_multiplier, 0.0, 100.0, "corpse.corpse_food_multiplier", &mut warnings);
        self.corpse.corpse_decay_ticks = clamp_field_u32(self.corpse.corpse_decay_ticks, 1, 100_000, "corpse.corpse_decay_ticks", &mut warnings);

        self.performance.spatial_index_bucket_size = clamp_field(self.performance.spatial_index_bucket_size, 0.1, 10_000.0, "performance.spatial_index_bucket_size", &mut warnings);

        self.ui.tick_rate_hz = clamp_field(self.ui.tick_rate_hz, 0.1, 1_000.0, "ui.tick_rate_hz", &mut warnings);

        // REPRODUCTION_COST + REPRODUCTION_SAFETY_BUFFER <= 0.95, rescaled
        // proportionally if it isn't.
        let repro_total = self.reproduction.reproduction_cost + self.reproduction.reproduction_safety_buffer;
        if repro_total > 0.95 {
            let scale = 0.95 / repro_total;
            self.reproduction.reproduction_cost *= scale;
            self.reproduction.reproduction_safety_buffer *= scale;
            warnings.push(ConfigWarning {
                field: "reproduction.reproduction_cost+reproduction_safety_buffer".to_string(),
                message: format!("sum {repro_total} exceeded 0.95, rescaled proportionally"),
            });
        }

        // SPATIAL_INDEX_BUCKET_SIZE should cover the largest possible
        // alertRange (perception maxes at 20). We don't force the field —
        // queries stay correct by widening their footprint — but we warn.
        let max_possible_alert_range = 20.0 * self.derived_stats.perception_multiplier;
        if self.performance.spatial_index_bucket_size < max_possible_alert_range {
            warnings.push(ConfigWarning {
                field: "performance.spatial_index_bucket_size".to_string(),
                message: format!(
                    "bucket size {} is smaller than the largest possible alert range {max_possible_alert_range}; queries will widen their footprint accordingly",
                    self.performance.spatial_index_bucket_size
                ),
            });
        }

        // INITIAL_DEER_COUNT + INITIAL_WOLF_COUNT <= MAX_ENTITIES, scaled
        // down proportionally (by count, so both species shrink together).
        let initial_total = self.world.initial_deer_count + self.world.initial_wolf_count;
        if initial_total > self.world.max_entities {
            let scale = self.world.max_entities as f64 / initial_total as f64;
            self.world.initial_deer_count = (self.world.initial_deer_count as f64 * scale).floor() as u32;
            self.world.initial_wolf_count = (self.world.initial_wolf_count as f64 * scale).floor() as u32;
            warnings.push(ConfigWarning {
                field: "world.initial_deer_count+world.initial_wolf_count".to_string(),
                message: format!("initial population {initial_total} exceeded max_entities {}, scaled down", self.world.max_entities),
            });
        }

        (self, warnings)
    }

    /// Short hash of the validated config, so callers can cheaply assert
    /// "these two runs used the same parameters" without a full diff.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world));
        hasher.update(format!("{:?}", self.vegetation));
        hasher.update(format!("{:?}", self.entities));
        hasher.update(format!("{:?}", self.derived_stats));
        hasher.update(format!("{:?}", self.movement));
        hasher.update(format!("{:?}", self.reproduction));
        hasher.update(format!("{:?}", self.evolution));
        hasher.update(format!("{:?}", self.corpse));
        hasher.update(format!("{:?}", self.performance));
        hasher.update(format!("{:?}", self.ui));
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates_unchanged() {
        let (validated, warnings) = Config::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(validated, Config::default());
    }

    #[test]
    fn test_invalid_world_width_clamped() {
        let mut config = Config::default();
        config.world.world_width = -5.0;
        let (validated, warnings) = config.validate();
        assert_eq!(validated.world.world_width, 10.0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_reproduction_cost_buffer_rescaled() {
        let mut config = Config::default();
        config.reproduction.reproduction_cost = 0.8;
        config.reproduction.reproduction_safety_buffer = 0.5;
        let (validated, warnings) = config.validate();
        assert!(validated.reproduction.reproduction_cost + validated.reproduction.reproduction_safety_buffer <= 0.95 + 1e-9);
        assert!(warnings.iter().any(|w| w.field.contains("reproduction_cost")));
    }

    #[test]
    fn test_initial_population_clamped_to_max_entities() {
        let mut config = Config::default();
        config.world.max_entities = 10;
        config.world.initial_deer_count = 20;
        config.world.initial_wolf_count = 10;
        let (validated, _) = config.validate();
        assert!(validated.world.initial_deer_count + validated.world.initial_wolf_count <= 10);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config = Config::default();
        assert_eq!(config.fingerprint(), config.fingerprint());
        let mut other = config;
        other.world.world_width += 1.0;
        assert_ne!(config.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_from_json_partial_document_fills_defaults() {
        let (config, _) = Config::from_json(r#"{"world":{"initial_deer_count":5}}"#).unwrap();
        assert_eq!(config.world.initial_deer_count, 5);
        assert_eq!(config.world.initial_wolf_count, Config::default().world.initial_wolf_count);
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        assert!(Config::from_json("not json").is_err());
    }
}
