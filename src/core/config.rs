//! Configuration for the simulation driver.
//!
//! Loads from `station.toml`. The station core itself takes no configuration;
//! everything here describes the pump roster, the price list, and the buyer
//! load the driver throws at the station.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::core::types::FuelCategory;

/// One pump to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PumpConfig {
    pub category: FuelCategory,
    /// Initial stock in liters
    pub liters: f64,
    /// Simulated actuation time per liter, in milliseconds
    #[serde(default)]
    pub flow_delay_ms: u64,
}

/// Buyer load generated by the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Number of concurrent buyer threads
    #[serde(default = "default_buyers")]
    pub buyers: usize,
    /// Purchase attempts per buyer
    #[serde(default = "default_purchases")]
    pub purchases_per_buyer: usize,
    /// Largest single purchase, in liters
    #[serde(default = "default_max_liters")]
    pub max_liters: f64,
    /// Highest price ceiling a buyer will quote
    #[serde(default = "default_max_ceiling")]
    pub max_ceiling: f64,
}

impl SimulationConfig {
    /// Smallest purchase a buyer will attempt, in liters.
    pub const LITERS_FLOOR: f64 = 1.0;
    /// Lowest price ceiling a buyer will quote.
    pub const CEILING_FLOOR: f64 = 0.5;

    /// Reject bounds that would leave the driver an empty sampling range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.buyers == 0 || self.purchases_per_buyer == 0 {
            anyhow::bail!("buyers and purchases_per_buyer must be at least 1");
        }
        if !self.max_liters.is_finite() || self.max_liters <= Self::LITERS_FLOOR {
            anyhow::bail!(
                "max_liters must be finite and greater than {}, got {}",
                Self::LITERS_FLOOR,
                self.max_liters
            );
        }
        if !self.max_ceiling.is_finite() || self.max_ceiling <= Self::CEILING_FLOOR {
            anyhow::bail!(
                "max_ceiling must be finite and greater than {}, got {}",
                Self::CEILING_FLOOR,
                self.max_ceiling
            );
        }
        Ok(())
    }
}

fn default_buyers() -> usize {
    8
}
fn default_purchases() -> usize {
    25
}
fn default_max_liters() -> f64 {
    40.0
}
fn default_max_ceiling() -> f64 {
    3.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            buyers: default_buyers(),
            purchases_per_buyer: default_purchases(),
            max_liters: default_max_liters(),
            max_ceiling: default_max_ceiling(),
        }
    }
}

/// Top-level config file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub pumps: Vec<PumpConfig>,
    /// Price per liter by category, e.g. `diesel = 1.85`
    pub prices: HashMap<FuelCategory, f64>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl StationConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StationConfig = toml::from_str(&content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Load from the default location (project root station.toml), falling
    /// back to a small built-in roster when no file is present. A file that
    /// exists but fails to parse or validate is an error, not a fallback.
    pub fn load_default() -> anyhow::Result<Self> {
        let candidates = [
            "station.toml",
            concat!(env!("CARGO_MANIFEST_DIR"), "/station.toml"),
        ];

        for path in &candidates {
            let path = Path::new(path);
            if path.exists() {
                let cfg = Self::load(path)?;
                tracing::info!("loaded config from {}", path.display());
                return Ok(cfg);
            }
        }

        tracing::warn!("no station.toml found, using built-in defaults");
        Ok(Self::builtin())
    }

    fn builtin() -> Self {
        Self {
            pumps: vec![
                PumpConfig {
                    category: FuelCategory::Regular,
                    liters: 800.0,
                    flow_delay_ms: 2,
                },
                PumpConfig {
                    category: FuelCategory::Regular,
                    liters: 500.0,
                    flow_delay_ms: 2,
                },
                PumpConfig {
                    category: FuelCategory::Premium,
                    liters: 600.0,
                    flow_delay_ms: 2,
                },
                PumpConfig {
                    category: FuelCategory::Diesel,
                    liters: 1000.0,
                    flow_delay_ms: 2,
                },
            ],
            prices: HashMap::from([
                (FuelCategory::Regular, 1.65),
                (FuelCategory::Premium, 1.92),
                (FuelCategory::Diesel, 1.78),
            ]),
            simulation: SimulationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_sampling_ranges() {
        assert!(SimulationConfig::default().validate().is_ok());

        // max_liters at or below the sampling floor leaves no range to draw
        // purchase sizes from.
        let mut sim = SimulationConfig::default();
        sim.max_liters = SimulationConfig::LITERS_FLOOR;
        assert!(sim.validate().is_err());

        let mut sim = SimulationConfig::default();
        sim.max_ceiling = 0.4;
        assert!(sim.validate().is_err());

        let mut sim = SimulationConfig::default();
        sim.max_liters = f64::NAN;
        assert!(sim.validate().is_err());

        let mut sim = SimulationConfig::default();
        sim.buyers = 0;
        assert!(sim.validate().is_err());
    }

    #[test]
    fn test_load_rejects_out_of_range_simulation_bounds() {
        let toml_str = r#"
            [[pumps]]
            category = "diesel"
            liters = 100.0

            [prices]
            diesel = 1.8

            [simulation]
            max_ceiling = 0.4
        "#;
        let config: StationConfig = toml::from_str(toml_str).unwrap();
        assert!(config.simulation.validate().is_err());
    }

    #[test]
    fn test_builtin_defaults_are_valid() {
        assert!(StationConfig::builtin().simulation.validate().is_ok());
    }
}
