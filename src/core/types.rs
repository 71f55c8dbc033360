//! Core types - fuel categories, pumps, and outcome counters

use parking_lot::Mutex;
use serde::Deserialize;
use std::time::Duration;

/// Fuel grade a pump dispenses and a price is quoted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelCategory {
    Regular,
    Premium,
    Diesel,
}

impl FuelCategory {
    pub const ALL: [FuelCategory; 3] = [
        FuelCategory::Regular,
        FuelCategory::Premium,
        FuelCategory::Diesel,
    ];
}

impl std::fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuelCategory::Regular => write!(f, "REGULAR"),
            FuelCategory::Premium => write!(f, "PREMIUM"),
            FuelCategory::Diesel => write!(f, "DIESEL"),
        }
    }
}

/// One physical dispenser: a fixed fuel category and a finite stock.
///
/// The stock is guarded by the pump's own mutex so a slow dispense only
/// serializes accesses to this pump, never the station. The registry holds
/// the canonical `Arc`s; a reserved pump is simply absent from its category
/// bucket until released.
pub struct GasPump {
    category: FuelCategory,
    remaining: Mutex<f64>,
    /// Simulated actuation time per liter. Zero for instant pumps.
    flow_delay: Duration,
}

impl GasPump {
    pub fn new(category: FuelCategory, liters: f64) -> Self {
        Self {
            category,
            remaining: Mutex::new(liters),
            flow_delay: Duration::ZERO,
        }
    }

    /// A pump that takes `delay` per liter to dispense, so tests and the
    /// simulation driver can make actuation measurably slow.
    pub fn with_flow_delay(category: FuelCategory, liters: f64, delay: Duration) -> Self {
        Self {
            category,
            remaining: Mutex::new(liters),
            flow_delay: delay,
        }
    }

    pub fn category(&self) -> FuelCategory {
        self.category
    }

    /// Liters currently available.
    pub fn remaining(&self) -> f64 {
        *self.remaining.lock()
    }

    /// Actuate the pump: draw down `liters` from the tank.
    ///
    /// Callers must only invoke this with `remaining >= liters`; the
    /// station's selection step enforces that before handing the pump out.
    /// Holds no station lock, so one slow pump never blocks the others.
    pub fn dispense(&self, liters: f64) {
        if !self.flow_delay.is_zero() {
            std::thread::sleep(self.flow_delay.mul_f64(liters));
        }
        let mut remaining = self.remaining.lock();
        debug_assert!(
            *remaining >= liters,
            "dispense of {liters}L exceeds remaining stock {remaining}L"
        );
        *remaining -= liters;
        tracing::debug!(
            category = %self.category,
            dispensed = liters,
            remaining = *remaining,
            "pump actuated"
        );
    }
}

impl std::fmt::Debug for GasPump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GasPump")
            .field("category", &self.category)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// Station-wide outcome counters.
///
/// Lives inside the pump-domain lock: each resolved purchase bumps exactly
/// one cancellation counter or the sales/revenue pair, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StationStats {
    pub cancellations_no_gas: u64,
    pub cancellations_too_expensive: u64,
    pub sales: u64,
    pub revenue: f64,
}

impl StationStats {
    /// Total number of fully resolved purchase requests.
    pub fn resolved(&self) -> u64 {
        self.sales + self.cancellations_no_gas + self.cancellations_too_expensive
    }
}
