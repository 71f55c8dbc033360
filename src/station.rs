//! Station controller - validation, pricing, and purchase orchestration.
//!
//! Two independent lock domains: the price table (here) and the pump
//! registry with its counters (`registry`). They are never held nested; a
//! purchase releases the price lock before the pump lock is taken, and the
//! dispense itself runs with no lock held at all so one slow pump never
//! serializes unrelated purchases.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::types::{FuelCategory, GasPump, StationStats};
use crate::registry::PumpRegistry;

/// The public face of the station: register pumps, quote prices, buy gas,
/// and read the outcome counters.
pub struct GasStation {
    registry: PumpRegistry,
    prices: RwLock<HashMap<FuelCategory, f64>>,
}

impl GasStation {
    pub fn new() -> Self {
        Self {
            registry: PumpRegistry::new(),
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Register a pump with the station.
    pub fn add_gas_pump(&self, pump: Arc<GasPump>) -> Result<()> {
        self.registry.register(pump)
    }

    /// Snapshot of all registered pumps, decoupled from later registration.
    pub fn gas_pumps(&self) -> Vec<Arc<GasPump>> {
        self.registry.list_all()
    }

    /// Replace the per-liter price for a category.
    pub fn set_price(&self, category: FuelCategory, price: f64) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "price must be finite and positive, got {price}"
            )));
        }
        self.prices.write().insert(category, price);
        tracing::debug!(%category, price, "price set");
        Ok(())
    }

    /// Current per-liter price for a category, `0.0` if never set.
    pub fn price(&self, category: FuelCategory) -> f64 {
        self.prices.read().get(&category).copied().unwrap_or(0.0)
    }

    /// Purchase `liters` of `category` at up to `max_price_per_liter` per
    /// liter, all-or-nothing against a single pump. Returns the total
    /// amount charged.
    ///
    /// The price is read once up front and the purchase is charged at that
    /// snapshot even if `set_price` races with the dispense.
    pub fn buy_gas(
        &self,
        category: FuelCategory,
        liters: f64,
        max_price_per_liter: f64,
    ) -> Result<f64> {
        if !liters.is_finite() || liters <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "amount must be finite and positive, got {liters}"
            )));
        }
        if !max_price_per_liter.is_finite() || max_price_per_liter <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "price ceiling must be finite and positive, got {max_price_per_liter}"
            )));
        }

        // Brief price-lock hold; released before the pump domain is touched.
        let price = self.price(category);

        // Ceiling check and reservation under one pump-lock hold.
        let pump = self
            .registry
            .admit_and_reserve(category, liters, price, max_price_per_liter)?;

        // The slow part runs with no station lock held.
        pump.dispense(liters);

        let amount = price * liters;
        self.registry.complete_sale(pump, amount);
        tracing::info!(%category, liters, price, amount, "sale completed");
        Ok(amount)
    }

    pub fn number_of_cancellations_no_gas(&self) -> u64 {
        self.registry.stats().cancellations_no_gas
    }

    pub fn number_of_cancellations_too_expensive(&self) -> u64 {
        self.registry.stats().cancellations_too_expensive
    }

    pub fn number_of_sales(&self) -> u64 {
        self.registry.stats().sales
    }

    pub fn revenue(&self) -> f64 {
        self.registry.stats().revenue
    }

    /// All four counters as one coherent snapshot.
    pub fn stats(&self) -> StationStats {
        self.registry.stats()
    }
}

impl Default for GasStation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn station_with(category: FuelCategory, liters: f64, price: f64) -> GasStation {
        let station = GasStation::new();
        station
            .add_gas_pump(Arc::new(GasPump::new(category, liters)))
            .unwrap();
        station.set_price(category, price).unwrap();
        station
    }

    #[test]
    fn test_successful_purchase() {
        let station = station_with(FuelCategory::Diesel, 40.0, 2.0);

        let charged = station.buy_gas(FuelCategory::Diesel, 10.0, 3.0).unwrap();
        assert_eq!(charged, 20.0);

        let pumps = station.gas_pumps();
        assert_eq!(pumps.len(), 1);
        assert_eq!(pumps[0].remaining(), 30.0);

        let stats = station.stats();
        assert_eq!(stats.sales, 1);
        assert_eq!(stats.revenue, 20.0);
        assert_eq!(stats.cancellations_no_gas, 0);
        assert_eq!(stats.cancellations_too_expensive, 0);
    }

    #[test]
    fn test_too_expensive_leaves_pump_untouched() {
        let station = station_with(FuelCategory::Diesel, 40.0, 2.0);

        let err = station.buy_gas(FuelCategory::Diesel, 10.0, 1.0).unwrap_err();
        assert_eq!(err, Error::GasTooExpensive);
        assert_eq!(station.number_of_cancellations_too_expensive(), 1);
        assert_eq!(station.gas_pumps()[0].remaining(), 40.0);
        assert_eq!(station.revenue(), 0.0);
    }

    #[test]
    fn test_not_enough_gas() {
        let station = station_with(FuelCategory::Regular, 5.0, 1.5);

        let err = station.buy_gas(FuelCategory::Regular, 10.0, 5.0).unwrap_err();
        assert_eq!(err, Error::NotEnoughGas);
        assert_eq!(station.number_of_cancellations_no_gas(), 1);
        assert_eq!(station.gas_pumps()[0].remaining(), 5.0);
    }

    #[test]
    fn test_invalid_arguments_move_no_counters() {
        let station = station_with(FuelCategory::Diesel, 40.0, 2.0);

        for result in [
            station.buy_gas(FuelCategory::Diesel, -1.0, 5.0),
            station.buy_gas(FuelCategory::Diesel, 0.0, 5.0),
            station.buy_gas(FuelCategory::Diesel, f64::NAN, 5.0),
            station.buy_gas(FuelCategory::Diesel, 10.0, 0.0),
            station.buy_gas(FuelCategory::Diesel, 10.0, -2.0),
            station.set_price(FuelCategory::Diesel, 0.0).map(|_| 0.0),
            station.set_price(FuelCategory::Diesel, -1.0).map(|_| 0.0),
        ] {
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }

        assert_eq!(station.stats(), StationStats::default());
        assert_eq!(station.gas_pumps()[0].remaining(), 40.0);
    }

    #[test]
    fn test_unset_price_reads_as_zero() {
        let station = GasStation::new();
        assert_eq!(station.price(FuelCategory::Premium), 0.0);

        // Setting one category leaves the others unset.
        station.set_price(FuelCategory::Diesel, 1.8).unwrap();
        assert_eq!(station.price(FuelCategory::Premium), 0.0);
        assert_eq!(station.price(FuelCategory::Diesel), 1.8);
    }

    #[test]
    fn test_purchase_at_unset_price_is_free() {
        // An unset price reads as 0.0, which no positive ceiling rejects:
        // the purchase goes through, dispenses fuel, and charges nothing.
        let station = GasStation::new();
        station
            .add_gas_pump(Arc::new(GasPump::new(FuelCategory::Premium, 40.0)))
            .unwrap();

        let charged = station.buy_gas(FuelCategory::Premium, 10.0, 1.0).unwrap();
        assert_eq!(charged, 0.0);
        assert_eq!(station.gas_pumps()[0].remaining(), 30.0);

        let stats = station.stats();
        assert_eq!(stats.sales, 1);
        assert_eq!(stats.revenue, 0.0);
        assert_eq!(stats.cancellations_too_expensive, 0);
    }

    #[test]
    fn test_charge_uses_price_snapshot() {
        let station = station_with(FuelCategory::Premium, 100.0, 2.5);
        let charged = station.buy_gas(FuelCategory::Premium, 4.0, 3.0).unwrap();
        assert_eq!(charged, 10.0);

        // A later price change does not rewrite recorded revenue.
        station.set_price(FuelCategory::Premium, 9.9).unwrap();
        assert_eq!(station.revenue(), 10.0);
    }

    #[test]
    fn test_concurrent_contention_single_winner() {
        // Two pumps, 5L and 15L. Two concurrent 10L buys: only the 15L pump
        // is eligible, so exactly one buyer wins and one fails fast.
        let station = Arc::new(GasStation::new());
        station
            .add_gas_pump(Arc::new(GasPump::with_flow_delay(
                FuelCategory::Regular,
                5.0,
                Duration::from_millis(5),
            )))
            .unwrap();
        station
            .add_gas_pump(Arc::new(GasPump::with_flow_delay(
                FuelCategory::Regular,
                15.0,
                Duration::from_millis(5),
            )))
            .unwrap();
        station.set_price(FuelCategory::Regular, 2.0).unwrap();

        let outcomes: Vec<Result<f64>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let station = Arc::clone(&station);
                    s.spawn(move || station.buy_gas(FuelCategory::Regular, 10.0, 5.0))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes.iter().any(|r| *r == Err(Error::NotEnoughGas)));

        let stats = station.stats();
        assert_eq!(stats.sales, 1);
        assert_eq!(stats.cancellations_no_gas, 1);
        assert_eq!(stats.revenue, 20.0);
    }

    #[test]
    fn test_no_double_sale_of_the_same_liters() {
        // One 40L pump, slow dispense, eight concurrent 10L buys. Reservation
        // is fail-fast, so anywhere from 1 to 4 buys can win, but the liters
        // sold and the revenue must exactly match the stock drawn down.
        let station = Arc::new(GasStation::new());
        let pump = Arc::new(GasPump::with_flow_delay(
            FuelCategory::Diesel,
            40.0,
            Duration::from_millis(3),
        ));
        station.add_gas_pump(Arc::clone(&pump)).unwrap();
        station.set_price(FuelCategory::Diesel, 2.0).unwrap();

        std::thread::scope(|s| {
            for _ in 0..8 {
                let station = Arc::clone(&station);
                s.spawn(move || {
                    let _ = station.buy_gas(FuelCategory::Diesel, 10.0, 5.0);
                });
            }
        });

        let stats = station.stats();
        assert!(stats.sales >= 1 && stats.sales <= 4);
        assert_eq!(stats.resolved(), 8);
        assert_eq!(pump.remaining(), 40.0 - 10.0 * stats.sales as f64);
        assert_eq!(stats.revenue, 20.0 * stats.sales as f64);
    }

    #[test]
    fn test_counter_sum_matches_resolved_requests() {
        let station = Arc::new(GasStation::new());
        station
            .add_gas_pump(Arc::new(GasPump::new(FuelCategory::Regular, 200.0)))
            .unwrap();
        station
            .add_gas_pump(Arc::new(GasPump::new(FuelCategory::Diesel, 60.0)))
            .unwrap();
        station.set_price(FuelCategory::Regular, 1.5).unwrap();
        station.set_price(FuelCategory::Diesel, 2.0).unwrap();

        let buyers = 6;
        let purchases = 20;
        std::thread::scope(|s| {
            for i in 0..buyers {
                let station = Arc::clone(&station);
                s.spawn(move || {
                    for j in 0..purchases {
                        // Mix of winners, too-expensive, and too-large buys.
                        let (category, liters, ceiling) = match (i + j) % 3 {
                            0 => (FuelCategory::Regular, 2.0, 2.0),
                            1 => (FuelCategory::Diesel, 5.0, 1.0),
                            _ => (FuelCategory::Diesel, 500.0, 3.0),
                        };
                        let _ = station.buy_gas(category, liters, ceiling);
                    }
                });
            }
        });

        assert_eq!(station.stats().resolved(), (buyers * purchases) as u64);
    }
}
