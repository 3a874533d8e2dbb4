/// Classification of raw readings into the characteristic values the
/// home-automation host exposes. Pure functions, nothing stored.
use crate::models::SensorReading;

/// CO2 concentration above this many ppm is reported as abnormal.
pub const CO2_ABNORMAL_THRESHOLD_PPM: f32 = 1000.0;

/// Value of the "carbon dioxide detected" characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Status {
    Normal,
    Abnormal,
}

impl Co2Status {
    /// Numeric value used by the host protocol (0 = normal, 1 = abnormal).
    pub fn value(self) -> u8 {
        match self {
            Co2Status::Normal => 0,
            Co2Status::Abnormal => 1,
        }
    }
}

/// Air-quality bucket derived from the sensor's own index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQuality {
    Unknown,
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

impl AirQuality {
    /// Numeric value used by the host protocol (0 = unknown .. 5 = poor).
    pub fn value(self) -> u8 {
        match self {
            AirQuality::Unknown => 0,
            AirQuality::Excellent => 1,
            AirQuality::Good => 2,
            AirQuality::Fair => 3,
            AirQuality::Inferior => 4,
            AirQuality::Poor => 5,
        }
    }
}

/// Classify the CO2 level. Readings at exactly the threshold are normal.
pub fn co2_status(reading: &SensorReading) -> Co2Status {
    if reading.eco2 <= CO2_ABNORMAL_THRESHOLD_PPM {
        Co2Status::Normal
    } else {
        Co2Status::Abnormal
    }
}

/// Map the sensor's air-quality index onto the host's buckets.
///
/// The index is an ordered cascade: 1-4 map to distinct buckets, anything
/// at 5 or above is poor, and any other value (including the 0 reported
/// before the first fetch) is unknown.
pub fn air_quality(reading: &SensorReading) -> AirQuality {
    match reading.aqi {
        1 => AirQuality::Excellent,
        2 => AirQuality::Good,
        3 => AirQuality::Fair,
        4 => AirQuality::Inferior,
        aqi if aqi >= 5 => AirQuality::Poor,
        _ => AirQuality::Unknown,
    }
}

/// Round a value for display at the presentation boundary.
/// The stored reading keeps full precision.
pub fn round_display(value: f32) -> u32 {
    value.max(0.0).round() as u32
}
