use rand::RngExt;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

use forecourt::core::config::SimulationConfig;
use forecourt::core::StationConfig;
use forecourt::{Error, FuelCategory, GasPump, GasStation};

fn main() -> anyhow::Result<()> {
    // 1. Initialize logger
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,forecourt=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    tracing::info!("⛽ Forecourt station simulation starting...");

    // 2. Load the pump roster and price list
    let config = StationConfig::load_default()?;

    let station = Arc::new(GasStation::new());
    for pump in &config.pumps {
        station.add_gas_pump(Arc::new(GasPump::with_flow_delay(
            pump.category,
            pump.liters,
            Duration::from_millis(pump.flow_delay_ms),
        )))?;
    }
    for (&category, &price) in &config.prices {
        station.set_price(category, price)?;
    }
    tracing::info!(
        pumps = config.pumps.len(),
        categories = config.prices.len(),
        "station stocked"
    );

    // 3. Unleash the buyers
    let sim = config.simulation.clone();
    tracing::info!(
        buyers = sim.buyers,
        purchases = sim.purchases_per_buyer,
        "spawning buyer threads"
    );

    std::thread::scope(|s| {
        for buyer in 0..sim.buyers {
            let station = Arc::clone(&station);
            let sim = sim.clone();
            s.spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..sim.purchases_per_buyer {
                    let category = FuelCategory::ALL[rng.random_range(0..FuelCategory::ALL.len())];
                    let liters = rng.random_range(SimulationConfig::LITERS_FLOOR..sim.max_liters);
                    let ceiling =
                        rng.random_range(SimulationConfig::CEILING_FLOOR..sim.max_ceiling);

                    match station.buy_gas(category, liters, ceiling) {
                        Ok(amount) => {
                            tracing::debug!(buyer, %category, liters, amount, "purchase ok")
                        }
                        Err(Error::NotEnoughGas) => {
                            tracing::debug!(buyer, %category, liters, "no gas")
                        }
                        Err(Error::GasTooExpensive) => {
                            tracing::debug!(buyer, %category, ceiling, "too expensive")
                        }
                        Err(e) => tracing::warn!(buyer, %category, "unexpected error: {e}"),
                    }
                }
            });
        }
    });

    // 4. Final report
    let stats = station.stats();
    tracing::info!(
        sales = stats.sales,
        revenue = format!("{:.2}", stats.revenue),
        no_gas = stats.cancellations_no_gas,
        too_expensive = stats.cancellations_too_expensive,
        "simulation finished"
    );
    for pump in station.gas_pumps() {
        tracing::info!(
            category = %pump.category(),
            remaining = format!("{:.1}", pump.remaining()),
            "pump stock"
        );
    }

    Ok(())
}
