mod bridge;
mod classify;
mod config;
mod models;
mod sensor;
mod utils;

use std::sync::Arc;

use log::{error, info, warn};
use time::OffsetDateTime;

use bridge::{AirAccessory, LogSink};
use config::BridgeConfig;
use sensor::{HttpFetcher, PollLoop, StateStore};
use utils::{format_datetime, format_staleness};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match BridgeConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    info!(
        "Starting indoor air bridge '{}' at {}",
        config.name,
        format_datetime(&OffsetDateTime::now_utc())
    );
    info!("Sensor endpoint: {}", config.url);

    // Wire up the core: one store, one fetcher, one poll loop. The host
    // seam is injected explicitly; when running standalone the pushed
    // characteristic values simply go to the log.
    let store = Arc::new(StateStore::new());
    let fetcher = HttpFetcher::new(config.url.clone(), config.fetch_timeout());
    let accessory = AirAccessory::new(config.name.clone(), Arc::clone(&store));
    info!("Accessory '{}' finished initializing", accessory.name());

    let poll = PollLoop::new(
        fetcher,
        Arc::clone(&store),
        Arc::new(LogSink),
        config.polling_interval,
    );
    let handle = poll.spawn();

    // Run until Ctrl+C, then stop the loop gracefully
    tokio::signal::ctrl_c().await?;
    info!("Program terminated by user. Exiting gracefully.");
    handle.stop().await;

    // Final summary of what the accessory was reporting
    info!("Last reported state for '{}':", accessory.name());
    info!(
        "  CO2: {} ppm ({:?})",
        accessory.co2_level(),
        accessory.co2_detected()
    );
    info!("  Air quality: {:?}", accessory.air_quality());
    info!("  VOC density: {} ppb", accessory.voc_density());
    info!("  Temperature: {:.1} C", accessory.temperature());
    info!("  Humidity: {}%", accessory.humidity());
    info!("  {}", format_staleness(store.last_updated()));
    if let Some(err) = store.last_error() {
        warn!(
            "  Last fetch error ({:?}) at {}: {}",
            err.kind,
            format_datetime(&err.at),
            err.message
        );
    }

    Ok(())
}
