// Filesystem usage through statvfs

use super::SensorError;
use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Block counts of one filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskStats {
    /// Total blocks
    pub blocks: u64,

    /// Free blocks, including those reserved for root
    pub free: u64,

    /// Blocks available to unprivileged users
    pub available: u64,
}

impl DiskStats {
    /// Used space in percent, the way `df` reports it
    ///
    /// Reserved blocks count as neither used nor available.
    pub fn used_percent(&self) -> f64 {
        let used = self.blocks.saturating_sub(self.free);
        let visible = used + self.available;
        if visible == 0 {
            return 0.0;
        }
        used as f64 * 100.0 / visible as f64
    }
}

/// Reports usage of the filesystem holding `path`
#[derive(Debug, Clone)]
pub struct DiskSensor {
    path: PathBuf,
}

impl DiskSensor {
    /// Create a sensor for the filesystem mounted at or containing `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Query block counts
    pub fn stats(&self) -> Result<DiskStats, SensorError> {
        let c_path = CString::new(self.path.as_os_str().as_bytes()).map_err(|_| {
            SensorError::Read {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"),
            }
        })?;

        let mut raw = MaybeUninit::<libc::statvfs>::uninit();
        // SAFETY: c_path is NUL-terminated and raw is a valid out pointer
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), raw.as_mut_ptr()) };
        if rc != 0 {
            return Err(SensorError::Read {
                path: self.path.clone(),
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: statvfs returned 0 so the struct is filled in
        let raw = unsafe { raw.assume_init() };

        Ok(DiskStats {
            blocks: raw.f_blocks as u64,
            free: raw.f_bfree as u64,
            available: raw.f_bavail as u64,
        })
    }

    /// Used space in percent
    pub fn read(&self) -> Result<f64, SensorError> {
        Ok(self.stats()?.used_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        let stats = DiskStats {
            blocks: 1000,
            free: 300,
            available: 200,
        };
        // 700 used out of 900 visible
        assert!((stats.used_percent() - 77.777).abs() < 0.01);

        let empty = DiskStats {
            blocks: 0,
            free: 0,
            available: 0,
        };
        assert_eq!(empty.used_percent(), 0.0);
    }

    #[test]
    fn test_root_filesystem() {
        let percent = DiskSensor::new("/").read().expect("statvfs on /");
        assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn test_missing_path() {
        let sensor = DiskSensor::new("/nonexistent/mount/point");
        assert!(matches!(sensor.read(), Err(SensorError::Read { .. })));
    }
}
