// Sensors module - System readings shown on the dashboard
//
// This module provides:
// - SoC temperature from a sysfs thermal zone
// - CPU usage averaged over a short window of /proc/stat samples
// - Filesystem usage through statvfs
// - A snapshot type handed to renderers once per tick

pub mod cpu;
pub mod disk;
pub mod temperature;

pub use cpu::{CpuSampler, CPU_WINDOW, PROC_STAT};
pub use disk::{DiskSensor, DiskStats};
pub use temperature::{to_fahrenheit, TemperatureSensor, DEFAULT_THERMAL_ZONE};

use log::{trace, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while reading sensors
#[derive(Debug)]
pub enum SensorError {
    /// The source file or filesystem could not be read
    Read { path: PathBuf, source: io::Error },

    /// The source was read but its contents made no sense
    Parse { path: PathBuf, content: String },
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorError::Read { path, source } => {
                write!(f, "reading {}: {}", path.display(), source)
            }
            SensorError::Parse { path, content } => {
                write!(f, "unexpected contents in {}: {:?}", path.display(), content)
            }
        }
    }
}

impl std::error::Error for SensorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SensorError::Read { source, .. } => Some(source),
            SensorError::Parse { .. } => None,
        }
    }
}

/// Values visible to a renderer during one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReadings {
    /// SoC temperature in degrees Celsius
    pub temperature: f64,

    /// CPU usage in percent, averaged over `CPU_WINDOW` intervals
    pub cpu: f64,

    /// Wall clock as seconds since the Unix epoch
    pub time: i64,

    /// Used space of the monitored filesystem in percent
    pub disk: f64,
}

/// Anything that can produce a set of readings once per tick
pub trait SensorSource {
    fn sample(&mut self) -> SensorReadings;
}

impl<F> SensorSource for F
where
    F: FnMut() -> SensorReadings,
{
    fn sample(&mut self) -> SensorReadings {
        self()
    }
}

/// All sensors polled by the monitor
///
/// A failed read keeps the previous value, so one bad sample never blanks the
/// dashboard.
#[derive(Debug)]
pub struct Sensors {
    temperature: TemperatureSensor,
    cpu: CpuSampler,
    disk: DiskSensor,
    last: SensorReadings,
}

impl Sensors {
    /// Open every sensor
    ///
    /// The thermal zone and /proc/stat must be readable; the disk path is only
    /// checked on each sample.
    pub fn open(
        thermal_zone: &Path,
        proc_stat: &Path,
        disk_path: &Path,
        cpu_capacity: u64,
    ) -> Result<Self, SensorError> {
        let temperature = TemperatureSensor::open(thermal_zone)?;
        let cpu = CpuSampler::open(proc_stat, cpu_capacity)?;
        let disk = DiskSensor::new(disk_path);

        Ok(Self::from_parts(temperature, cpu, disk))
    }

    /// Assemble from already opened sensors
    pub fn from_parts(temperature: TemperatureSensor, cpu: CpuSampler, disk: DiskSensor) -> Self {
        let last = SensorReadings {
            cpu: cpu.usage(),
            ..SensorReadings::default()
        };
        Self {
            temperature,
            cpu,
            disk,
            last,
        }
    }

    /// Most recent readings without sampling again
    pub fn last(&self) -> SensorReadings {
        self.last
    }
}

impl SensorSource for Sensors {
    /// Take a fresh set of readings
    fn sample(&mut self) -> SensorReadings {
        match self.temperature.read() {
            Ok(celsius) => self.last.temperature = celsius,
            Err(e) => warn!("Keeping previous temperature: {}", e),
        }

        match self.cpu.update() {
            Ok(usage) => self.last.cpu = usage,
            Err(e) => warn!("Keeping previous CPU usage: {}", e),
        }

        match self.disk.read() {
            Ok(percent) => self.last.disk = percent,
            Err(e) => warn!("Keeping previous disk usage: {}", e),
        }

        self.last.time = chrono::Utc::now().timestamp();

        trace!(
            "Sensors: {:.1}°C, cpu {:.1}%, disk {:.1}%",
            self.last.temperature,
            self.last.cpu,
            self.last.disk
        );
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sample_keeps_previous_on_failure() {
        let dir = std::env::temp_dir().join(format!("pironman-sensors-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let zone = dir.join("temp");
        let stat = dir.join("stat");
        fs::write(&zone, "42000\n").expect("zone");
        fs::write(&stat, "cpu  1 0 1 1000 0 0 0 0 0 0\n").expect("stat");

        let mut sensors = Sensors::open(&zone, &stat, Path::new("/"), 400).expect("sensors");
        let first = sensors.sample();
        assert_eq!(first.temperature, 42.0);
        assert!(first.time > 0);

        fs::write(&zone, "broken").expect("zone");
        let second = sensors.sample();
        assert_eq!(second.temperature, 42.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_requires_thermal_zone() {
        let result = Sensors::open(
            Path::new("/nonexistent/temp"),
            Path::new(PROC_STAT),
            Path::new("/"),
            400,
        );
        assert!(matches!(result, Err(SensorError::Read { .. })));
    }
}
