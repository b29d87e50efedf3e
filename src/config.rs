//! Battle configuration, loadable from RON.
//!
//! ```ron
//! (
//!     format: Doubles,
//!     seed: Some(7),
//!     max_turns: 100,
//!     damage_overrides: (random_factor: Some(1.0)),
//! )
//! ```

use crate::battle::field::SideId;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BattleFormat {
    #[default]
    Singles,
    Doubles,
    Triples,
    /// One player slot against a pack of wild combatants.
    Horde { slots: usize },
}

impl BattleFormat {
    pub fn slots_for(&self, side: SideId) -> usize {
        match (self, side) {
            (BattleFormat::Singles, _) => 1,
            (BattleFormat::Doubles, _) => 2,
            (BattleFormat::Triples, _) => 3,
            (BattleFormat::Horde { .. }, SideId::Player) => 1,
            (BattleFormat::Horde { slots }, SideId::Enemy) => *slots,
        }
    }
}

/// Deterministic overrides for the random parts of the damage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DamageOverrides {
    pub force_critical: Option<bool>,
    pub random_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub format: BattleFormat,
    /// Seed for the battle RNG. `None` seeds from the operating system.
    pub seed: Option<u64>,
    pub max_queue_iterations: usize,
    pub max_turns: u32,
    pub critical_hit_chance: f64,
    pub critical_multiplier: f64,
    pub damage_overrides: DamageOverrides,
    pub validate_each_turn: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            format: BattleFormat::Singles,
            seed: None,
            max_queue_iterations: 1000,
            max_turns: 200,
            critical_hit_chance: 1.0 / 24.0,
            critical_multiplier: 1.5,
            damage_overrides: DamageOverrides::default(),
            validate_each_turn: true,
        }
    }
}

impl BattleConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_format(mut self, format: BattleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_queue_iterations must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.critical_hit_chance) {
            return Err(ConfigError::Invalid(format!(
                "critical_hit_chance {} is not a probability",
                self.critical_hit_chance
            )));
        }
        if let Some(factor) = self.damage_overrides.random_factor {
            if !(0.85..=1.0).contains(&factor) {
                return Err(ConfigError::Invalid(format!(
                    "random_factor {} is outside [0.85, 1.0]",
                    factor
                )));
            }
        }
        if let BattleFormat::Horde { slots } = self.format {
            if slots == 0 {
                return Err(ConfigError::Invalid("a horde needs at least one slot".to_string()));
            }
        }
        Ok(())
    }
}
