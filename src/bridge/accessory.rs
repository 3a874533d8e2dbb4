/// Inbound query side of the host-framework seam.
///
/// The host registers one zero-argument getter per characteristic. Each
/// getter reads the shared store and classifies on demand, so queries
/// return immediately even while a fetch is in flight.
use std::sync::Arc;

use log::debug;

use crate::classify::{air_quality, co2_status, round_display, AirQuality, Co2Status};
use crate::sensor::state::StateStore;

pub struct AirAccessory {
    name: String,
    store: Arc<StateStore>,
}

impl AirAccessory {
    pub fn new(name: impl Into<String>, store: Arc<StateStore>) -> Self {
        AirAccessory {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn co2_detected(&self) -> Co2Status {
        let status = co2_status(&self.store.snapshot());
        debug!("GET CarbonDioxideDetected: {:?}", status);
        status
    }

    pub fn co2_level(&self) -> u32 {
        let ppm = round_display(self.store.snapshot().eco2);
        debug!("GET CarbonDioxideLevel: {} ppm", ppm);
        ppm
    }

    pub fn air_quality(&self) -> AirQuality {
        let bucket = air_quality(&self.store.snapshot());
        debug!("GET AirQuality: {:?}", bucket);
        bucket
    }

    pub fn voc_density(&self) -> u32 {
        let ppb = round_display(self.store.snapshot().tvoc);
        debug!("GET VOCDensity: {} ppb", ppb);
        ppb
    }

    pub fn temperature(&self) -> f32 {
        let celsius = self.store.snapshot().temperature;
        debug!("GET CurrentTemperature: {:.1} C", celsius);
        celsius
    }

    pub fn humidity(&self) -> u32 {
        let percent = round_display(self.store.snapshot().humidity);
        debug!("GET CurrentRelativeHumidity: {}%", percent);
        percent
    }
}
