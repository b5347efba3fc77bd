// Thermal zone reader

use super::SensorError;
use std::fs;
use std::path::{Path, PathBuf};

/// Default SoC thermal zone
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Parse a sysfs temperature in millidegrees Celsius
pub fn parse_millidegrees(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Convert Celsius to Fahrenheit
pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Reads a sysfs thermal zone
#[derive(Debug, Clone)]
pub struct TemperatureSensor {
    path: PathBuf,
}

impl TemperatureSensor {
    /// Open a thermal zone, checking that it is readable
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SensorError> {
        let sensor = Self {
            path: path.as_ref().to_path_buf(),
        };
        sensor.read()?;
        Ok(sensor)
    }

    /// Current temperature in degrees Celsius
    pub fn read(&self) -> Result<f64, SensorError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SensorError::Read {
            path: self.path.clone(),
            source,
        })?;
        let milli = parse_millidegrees(&text).ok_or_else(|| SensorError::Parse {
            path: self.path.clone(),
            content: text.trim().to_string(),
        })?;
        Ok(milli as f64 / 1000.0)
    }

    /// Path of the thermal zone file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
