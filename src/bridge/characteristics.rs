/// Outbound push side of the host-framework seam.
///
/// After every successful poll the loop derives one update per exposed
/// characteristic and hands them to the installed sink, so the host can
/// notify connected clients without waiting for a query.
use log::info;

use crate::classify::{air_quality, co2_status, round_display, AirQuality, Co2Status};
use crate::models::SensorReading;

/// A freshly classified value for one characteristic.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacteristicUpdate {
    Co2Detected(Co2Status),
    Co2Level(u32),
    AirQuality(AirQuality),
    VocDensity(u32),
    Temperature(f32),
    Humidity(u32),
}

/// Receives pushed characteristic updates. Implemented by the host
/// integration and injected into the poll loop, never held in global state.
pub trait CharacteristicSink: Send + Sync {
    fn update(&self, update: CharacteristicUpdate);
}

/// Derive all six characteristic values from a reading, with display
/// rounding applied at this boundary only.
pub fn characteristic_updates(reading: &SensorReading) -> Vec<CharacteristicUpdate> {
    vec![
        CharacteristicUpdate::Co2Detected(co2_status(reading)),
        CharacteristicUpdate::Co2Level(round_display(reading.eco2)),
        CharacteristicUpdate::AirQuality(air_quality(reading)),
        CharacteristicUpdate::VocDensity(round_display(reading.tvoc)),
        CharacteristicUpdate::Temperature(reading.temperature),
        CharacteristicUpdate::Humidity(round_display(reading.humidity)),
    ]
}

/// Stand-in host used when running the bridge as a plain service: every
/// pushed value goes to the log.
pub struct LogSink;

impl CharacteristicSink for LogSink {
    fn update(&self, update: CharacteristicUpdate) {
        match update {
            CharacteristicUpdate::Co2Detected(status) => {
                info!("Pushed CarbonDioxideDetected: {:?} ({})", status, status.value())
            }
            CharacteristicUpdate::Co2Level(ppm) => info!("Pushed CarbonDioxideLevel: {} ppm", ppm),
            CharacteristicUpdate::AirQuality(bucket) => {
                info!("Pushed AirQuality: {:?} ({})", bucket, bucket.value())
            }
            CharacteristicUpdate::VocDensity(ppb) => info!("Pushed VOCDensity: {} ppb", ppb),
            CharacteristicUpdate::Temperature(celsius) => {
                info!("Pushed CurrentTemperature: {:.1} C", celsius)
            }
            CharacteristicUpdate::Humidity(percent) => {
                info!("Pushed CurrentRelativeHumidity: {}%", percent)
            }
        }
    }
}
