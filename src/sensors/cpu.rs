// CPU usage sampler
//
// Reads the cumulative idle time from the first `cpu` line of /proc/stat and
// keeps a short window of samples, so the reported usage is averaged over
// several ticks and the graph stays readable on a 64-pixel-tall panel.

use super::SensorError;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of intervals the usage is averaged over
pub const CPU_WINDOW: usize = 5;

/// Default location of the kernel CPU counters
pub const PROC_STAT: &str = "/proc/stat";

/// Extract the aggregate idle counter from /proc/stat contents
///
/// The first line looks like `cpu  user nice system idle iowait ...`; the
/// idle field is the fourth number.
pub fn parse_idle(stat: &str) -> Option<u64> {
    let line = stat.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    fields.nth(3)?.parse().ok()
}

/// Clock ticks per second used by /proc/stat
pub fn clock_ticks_per_second() -> u64 {
    // SAFETY: sysconf has no preconditions
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        100
    }
}

/// Sliding window of idle counters
#[derive(Debug, Clone)]
pub struct CpuSampler {
    path: PathBuf,

    /// Idle counters, newest first; `CPU_WINDOW + 1` entries span the window
    idle: [u64; CPU_WINDOW + 1],

    /// Idle ticks a fully idle machine accumulates in one interval
    capacity: u64,
}

impl CpuSampler {
    /// Open the sampler and seed the window
    ///
    /// The window is seeded as if the machine had been idle for the whole
    /// window, so usage starts at 0% and fills in over the first intervals.
    ///
    /// # Arguments
    ///
    /// * `path` - Usually `/proc/stat`
    /// * `capacity` - Idle ticks per interval when every core is idle
    pub fn open<P: AsRef<Path>>(path: P, capacity: u64) -> Result<Self, SensorError> {
        let path = path.as_ref().to_path_buf();
        let idle = read_idle(&path)?;
        Ok(Self::seeded(path, idle, capacity))
    }

    /// Build a sampler around a known first idle value
    pub fn seeded(path: PathBuf, first_idle: u64, capacity: u64) -> Self {
        let capacity = capacity.max(1);
        let mut idle = [0u64; CPU_WINDOW + 1];
        for (i, slot) in idle.iter_mut().enumerate() {
            *slot = first_idle.saturating_sub(capacity * i as u64);
        }
        Self {
            path,
            idle,
            capacity,
        }
    }

    /// Capacity for the local machine
    ///
    /// One clock tick per core per second of interval.
    pub fn default_capacity(interval_secs: f64) -> u64 {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get() as u64)
            .unwrap_or(1);
        let ticks = clock_ticks_per_second() as f64 * interval_secs.max(0.0);
        ((cores as f64 * ticks).round() as u64).max(1)
    }

    /// Read a new sample and return the averaged usage
    pub fn update(&mut self) -> Result<f64, SensorError> {
        let idle = read_idle(&self.path)?;
        self.push(idle);
        Ok(self.usage())
    }

    /// Shift a new idle counter into the window
    pub fn push(&mut self, idle: u64) {
        self.idle.rotate_right(1);
        self.idle[0] = idle;
    }

    /// CPU usage in percent over the window
    pub fn usage(&self) -> f64 {
        let total = self.capacity * CPU_WINDOW as u64;
        let idle = self.idle[0].saturating_sub(self.idle[CPU_WINDOW]).min(total);
        (total - idle) as f64 * 100.0 / total as f64
    }
}

fn read_idle(path: &Path) -> Result<u64, SensorError> {
    let stat = fs::read_to_string(path).map_err(|source| SensorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_idle(&stat).ok_or_else(|| SensorError::Parse {
        path: path.to_path_buf(),
        content: stat.lines().next().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 0 0\n\
                        cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0\n";

    #[test]
    fn test_parse_idle() {
        assert_eq!(parse_idle(STAT), Some(46828483));
        assert_eq!(parse_idle("cpu  0 0 0 0 "), Some(0));
        assert_eq!(parse_idle("cpu0 1 2 3 4\n"), None);
        assert_eq!(parse_idle("cpu 1 2 3\n"), None);
        assert_eq!(parse_idle(""), None);
    }

    #[test]
    fn test_seeded_window_reads_idle() {
        let sampler = CpuSampler::seeded(PathBuf::new(), 10_000, 400);
        assert_eq!(sampler.usage(), 0.0);
    }

    #[test]
    fn test_seed_saturates_near_zero() {
        let sampler = CpuSampler::seeded(PathBuf::new(), 500, 400);
        assert_eq!(sampler.idle[CPU_WINDOW], 0);
        assert!(sampler.usage() > 0.0);
    }

    #[test]
    fn test_idle_machine_settles_to_zero() {
        let mut sampler = CpuSampler::seeded(PathBuf::new(), 10_000, 400);
        let mut idle = 10_000;
        for _ in 0..CPU_WINDOW {
            idle += 400;
            sampler.push(idle);
        }
        assert_eq!(sampler.usage(), 0.0);
    }

    #[test]
    fn test_half_busy_window() {
        let mut sampler = CpuSampler::seeded(PathBuf::new(), 10_000, 400);
        let mut idle = 10_000;
        for _ in 0..CPU_WINDOW {
            idle += 200;
            sampler.push(idle);
        }
        assert_eq!(sampler.usage(), 50.0);
    }

    #[test]
    fn test_counter_reset_is_clamped() {
        let mut sampler = CpuSampler::seeded(PathBuf::new(), 10_000, 400);
        sampler.push(5);
        assert_eq!(sampler.usage(), 100.0);

        sampler.push(u64::MAX);
        assert_eq!(sampler.usage(), 0.0);
    }

    #[test]
    fn test_open_missing_file() {
        let result = CpuSampler::open("/nonexistent/stat", 400);
        assert!(matches!(result, Err(SensorError::Read { .. })));
    }
}
