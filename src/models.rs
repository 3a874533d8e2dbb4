use serde::Deserialize;

/// One parsed snapshot of the sensor endpoint's JSON document.
///
/// Field names follow the wire format. `aqi` is absent on older firmware,
/// in which case it defaults to 0 (unknown).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorReading {
    pub eco2: f32,
    pub tvoc: f32,
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    pub gas_kohms: f32,
    #[serde(default)]
    pub aqi: i32,
}

impl Default for SensorReading {
    /// The neutral all-zero reading reported before the first successful fetch.
    fn default() -> Self {
        SensorReading {
            eco2: 0.0,
            tvoc: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            pressure: 0.0,
            gas_kohms: 0.0,
            aqi: 0,
        }
    }
}

impl SensorReading {
    /// Clamp humidity into the physically valid 0-100% range.
    /// All other fields keep full precision as reported.
    pub fn sanitized(mut self) -> Self {
        self.humidity = self.humidity.clamp(0.0, 100.0);
        self
    }
}
