// Configuration management
//
// Both utilities read optional TOML files. Every field has a default, so a
// file only needs the settings it changes. Command line flags are applied on
// top of whatever the file provides.

use crate::leds::{DEFAULT_COUNT, DEFAULT_DEVICE};
use crate::sensors::{DEFAULT_THERMAL_ZONE, PROC_STAT};
use crate::transport::DEFAULT_ADDRESS;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default I2C bus for the OLED
pub const DEFAULT_OLED_DEVICE: &str = "/dev/i2c-1";

/// Errors that can occur while loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    Io(io::Error),

    /// The file is not valid TOML for this configuration
    Parse(toml::de::Error),

    /// The configuration could not be serialized
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {}", e),
            ConfigError::Serialize(e) => write!(f, "could not serialize configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Load and parse a TOML file
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Serialize to a TOML file
pub fn save_to_file<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(value)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a file, falling back to defaults if it is missing or invalid
pub fn load_or_default<T: DeserializeOwned + Default, P: AsRef<Path>>(path: P) -> T {
    let path = path.as_ref();
    load_from_file(path).unwrap_or_else(|e| {
        warn!(
            "Could not load config {} ({}), using defaults",
            path.display(),
            e
        );
        T::default()
    })
}

/// Parse an I2C address given as decimal, `0x` hex or `0`-prefixed octal
pub fn parse_address(text: &str) -> Result<u8, String> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        u32::from_str_radix(&text[1..], 8)
    } else {
        text.parse::<u32>()
    };

    match parsed {
        Ok(address) if address <= 0x7F => Ok(address as u8),
        Ok(address) => Err(format!("{:#x} is not a 7-bit I2C address", address)),
        Err(e) => Err(format!("'{}' is not an address: {}", text, e)),
    }
}

/// OLED panel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OledConfig {
    /// I2C character device
    pub device: PathBuf,

    /// 7-bit I2C address
    pub address: u8,

    /// Optional mask file replacing the built-in chrome
    pub mask: Option<PathBuf>,
}

impl Default for OledConfig {
    fn default() -> Self {
        OledConfig {
            device: PathBuf::from(DEFAULT_OLED_DEVICE),
            address: DEFAULT_ADDRESS,
            mask: None,
        }
    }
}

/// Sensor sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Thermal zone file reporting millidegrees Celsius
    pub temperature_device: PathBuf,

    /// Kernel CPU counters
    pub proc_stat: PathBuf,

    /// Any path on the filesystem whose usage is shown
    pub disk_path: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            temperature_device: PathBuf::from(DEFAULT_THERMAL_ZONE),
            proc_stat: PathBuf::from(PROC_STAT),
            disk_path: PathBuf::from("/"),
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Time between frames in milliseconds
    pub interval_ms: u64,

    /// Show temperatures in Fahrenheit
    pub fahrenheit: bool,

    /// Where to save a PNG of the first frame, if anywhere
    pub snapshot_directory: Option<PathBuf>,

    /// Display settings
    pub oled: OledConfig,

    /// Sensor settings
    pub sensors: SensorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            interval_ms: 1000,
            fahrenheit: false,
            snapshot_directory: None,
            oled: OledConfig::default(),
            sensors: SensorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a file, or defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_or_default(path)
    }

    /// Frame interval, never shorter than 10 ms
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(10))
    }
}

/// LED string configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    /// spidev node
    pub device: PathBuf,

    /// Number of LEDs on the string
    pub count: usize,

    /// Colors used when none are given on the command line
    pub colors: Vec<String>,
}

impl Default for LedConfig {
    fn default() -> Self {
        LedConfig {
            device: PathBuf::from(DEFAULT_DEVICE),
            count: DEFAULT_COUNT,
            colors: Vec::new(),
        }
    }
}

impl LedConfig {
    /// Load configuration from a file, or defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_or_default(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.oled.device, PathBuf::from("/dev/i2c-1"));
        assert_eq!(config.oled.address, 0x3C);
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(
            config.sensors.temperature_device,
            PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
        );

        let leds = LedConfig::default();
        assert_eq!(leds.device, PathBuf::from("/dev/spidev0.0"));
        assert_eq!(leds.count, 4);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            fahrenheit = true

            [oled]
            address = 0x3D
            "#,
        )
        .expect("valid toml");

        assert!(config.fahrenheit);
        assert_eq!(config.oled.address, 0x3D);
        assert_eq!(config.oled.device, PathBuf::from(DEFAULT_OLED_DEVICE));
        assert_eq!(config.interval_ms, 1000);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = MonitorConfig::default();
        config.oled.mask = Some(PathBuf::from("/etc/pironman/mask.txt"));
        config.snapshot_directory = Some(PathBuf::from("/tmp/snapshots"));
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: MonitorConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = LedConfig::load_or_default("/nonexistent/leds.toml");
        assert_eq!(config, LedConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("pironman-leds-{}.toml", std::process::id()));
        let config = LedConfig {
            count: 8,
            colors: vec!["#ff0000".to_string(), "00f".to_string()],
            ..LedConfig::default()
        };
        save_to_file(&config, &path).expect("saved");

        let loaded: LedConfig = load_from_file(&path).expect("loaded");
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("pironman-bad-{}.toml", std::process::id()));
        fs::write(&path, "count = \"many\"").expect("written");

        let result: Result<LedConfig, _> = load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x3C"), Ok(0x3C));
        assert_eq!(parse_address("0X3d"), Ok(0x3D));
        assert_eq!(parse_address("60"), Ok(60));
        assert_eq!(parse_address("074"), Ok(0o74));
        assert_eq!(parse_address("0"), Ok(0));
        assert!(parse_address("0x80").is_err());
        assert!(parse_address("oled").is_err());
    }
}
