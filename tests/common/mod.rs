// Common test utilities for integration tests
//
// This module provides stand-ins for the hardware the utilities talk to: an
// I2C bus that starts failing after a number of writes, a writer that
// produces short writes like a busy spidev, and a small deterministic
// number generator for property-style tests.

#![allow(dead_code)]

use embedded_hal::i2c::{self, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Error returned by `FlakyBus` once it starts failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl i2c::Error for BusFault {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Writes seen by a `FlakyBus`, shared so they outlive the driver
pub type WriteLog = Rc<RefCell<Vec<Vec<u8>>>>;

/// I2C bus that accepts `healthy_writes` writes and NAKs everything after
pub struct FlakyBus {
    pub healthy_writes: usize,
    pub writes: WriteLog,
    pub rejected: WriteLog,
}

impl FlakyBus {
    pub fn new(healthy_writes: usize) -> Self {
        FlakyBus {
            healthy_writes,
            writes: WriteLog::default(),
            rejected: WriteLog::default(),
        }
    }

    /// Bus that never fails
    pub fn healthy() -> Self {
        Self::new(usize::MAX)
    }

    /// Handle on the write log
    pub fn log(&self) -> WriteLog {
        Rc::clone(&self.writes)
    }

    /// Handle on the writes that were NAKed
    pub fn rejected_log(&self) -> WriteLog {
        Rc::clone(&self.rejected)
    }
}

impl ErrorType for FlakyBus {
    type Error = BusFault;
}

impl I2c<SevenBitAddress> for FlakyBus {
    fn transaction(
        &mut self,
        _address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            if let Operation::Write(bytes) = operation {
                let mut writes = self.writes.borrow_mut();
                if writes.len() >= self.healthy_writes {
                    self.rejected.borrow_mut().push(bytes.to_vec());
                    return Err(BusFault);
                }
                writes.push(bytes.to_vec());
            }
        }
        Ok(())
    }
}

/// Writer that truncates the first `short_writes` calls to `limit` bytes
pub struct ShortWriter {
    pub short_writes: usize,
    pub limit: usize,
    pub calls: usize,
    pub completed: Vec<Vec<u8>>,
}

impl ShortWriter {
    pub fn new(short_writes: usize, limit: usize) -> Self {
        ShortWriter {
            short_writes,
            limit,
            calls: 0,
            completed: Vec::new(),
        }
    }
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.calls <= self.short_writes {
            return Ok(buf.len().min(self.limit));
        }
        self.completed.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Tiny linear congruential generator so property tests are repeatable
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform value in `low..=high`
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        let span = (high - low + 1) as u32;
        low + (self.next_u32() % span) as i32
    }
}

/// Fresh scratch directory unique to this process and `name`
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("pironman-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch directory");
    dir
}

/// A /proc/stat style file whose aggregate cpu line reports `idle`
pub fn write_proc_stat(path: &std::path::Path, idle: u64) {
    let content = format!(
        "cpu  1000 20 300 {} 40 0 5 0 0 0\ncpu0 250 5 75 {} 10 0 1 0 0 0\n",
        idle,
        idle / 4
    );
    std::fs::write(path, content).expect("write proc stat");
}
