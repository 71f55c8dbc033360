//! Pump registry - the pump-domain lock: pumps, category buckets, counters.
//!
//! One mutex guards the master pump list, the per-category buckets, and the
//! four outcome counters. The API only exposes atomic operations; callers
//! never iterate the buckets while they mutate. Reservation is bucket
//! removal: a pump handed out by `select_and_reserve` is invisible to every
//! other selection until `release` (or `complete_sale`) puts it back.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::types::{FuelCategory, GasPump, StationStats};

#[derive(Default)]
struct RegistryInner {
    /// Every pump ever registered, reserved or not. Snapshot source.
    pumps: Vec<Arc<GasPump>>,
    /// Selectable pumps by category. Reserved pumps are absent.
    buckets: HashMap<FuelCategory, Vec<Arc<GasPump>>>,
    stats: StationStats,
}

impl RegistryInner {
    /// First-fit scan in bucket insertion order. Removes and returns the
    /// first pump that can cover `liters`; counts the cancellation and
    /// fails otherwise. An empty bucket and a missing bucket are the same
    /// failure, indistinguishable to the caller.
    fn take_first_fit(&mut self, category: FuelCategory, liters: f64) -> Result<Arc<GasPump>> {
        if let Some(bucket) = self.buckets.get_mut(&category) {
            if let Some(idx) = bucket.iter().position(|p| p.remaining() >= liters) {
                let pump = bucket.remove(idx);
                tracing::debug!(%category, liters, "pump reserved");
                return Ok(pump);
            }
        }
        self.stats.cancellations_no_gas += 1;
        Err(Error::NotEnoughGas)
    }

    fn put_back(&mut self, pump: Arc<GasPump>) {
        self.buckets.entry(pump.category()).or_default().push(pump);
    }
}

/// Owns the canonical pump collection and its category-indexed view, and
/// co-locates the outcome counters in the same lock domain so reservation
/// and accounting stay mutually consistent.
pub struct PumpRegistry {
    inner: Mutex<RegistryInner>,
}

impl PumpRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Add a pump to the master list and its category bucket. There is no
    /// removal operation; pumps live for the station's lifetime.
    pub fn register(&self, pump: Arc<GasPump>) -> Result<()> {
        let stock = pump.remaining();
        if !stock.is_finite() || stock < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "pump stock must be finite and non-negative, got {stock}"
            )));
        }

        let mut inner = self.inner.lock();
        inner.pumps.push(Arc::clone(&pump));
        let category = pump.category();
        inner.buckets.entry(category).or_default().push(pump);
        tracing::debug!(%category, stock, "pump registered");
        Ok(())
    }

    /// Snapshot of all registered pumps, reserved ones included. The
    /// returned list is decoupled from later registrations.
    pub fn list_all(&self) -> Vec<Arc<GasPump>> {
        self.inner.lock().pumps.clone()
    }

    /// Atomically find and reserve one pump of `category` holding at least
    /// `liters`. On failure, `cancellations_no_gas` has already been bumped
    /// under the same lock hold.
    pub fn select_and_reserve(&self, category: FuelCategory, liters: f64) -> Result<Arc<GasPump>> {
        self.inner.lock().take_first_fit(category, liters)
    }

    /// The purchase admission step: price-ceiling check and reservation
    /// judged against one consistent snapshot, under a single lock hold.
    /// A too-expensive request never touches a pump.
    pub fn admit_and_reserve(
        &self,
        category: FuelCategory,
        liters: f64,
        price: f64,
        ceiling: f64,
    ) -> Result<Arc<GasPump>> {
        let mut inner = self.inner.lock();
        if price > ceiling {
            inner.stats.cancellations_too_expensive += 1;
            return Err(Error::GasTooExpensive);
        }
        inner.take_first_fit(category, liters)
    }

    /// Return a reserved pump to its category bucket. Callers release each
    /// reservation exactly once.
    pub fn release(&self, pump: Arc<GasPump>) {
        self.inner.lock().put_back(pump);
    }

    /// Finish a successful purchase: release the pump and record the sale
    /// as one atomic unit.
    pub fn complete_sale(&self, pump: Arc<GasPump>, amount: f64) {
        let mut inner = self.inner.lock();
        inner.put_back(pump);
        inner.stats.sales += 1;
        inner.stats.revenue += amount;
    }

    /// Coherent snapshot of the four outcome counters.
    pub fn stats(&self) -> StationStats {
        self.inner.lock().stats
    }
}

impl Default for PumpRegistry {
    fn default() -> Self {
        Self::new()
    }
}
