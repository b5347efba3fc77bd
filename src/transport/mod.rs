// Transport module - Getting frames onto the panel
//
// The SSD1306 driver is generic over `embedded_hal::i2c::I2c`, so the same
// code runs against the Linux `/dev/i2c-*` device and against the in-memory
// bus used for dry runs and tests.

pub mod ssd1306;

pub use ssd1306::{Cmd, Ssd1306, WireFrame, DEFAULT_ADDRESS, HEADER_LEN};

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use std::convert::Infallible;

/// Errors raised while talking to the display
#[derive(Debug)]
pub enum TransportError {
    /// The bus device could not be opened
    Open { device: String, reason: String },

    /// A write to the controller failed
    Bus { stage: &'static str, reason: String },
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Open { device, reason } => {
                write!(f, "opening I2C device {}: {}", device, reason)
            }
            TransportError::Bus { stage, reason } => {
                write!(f, "I2C write failed while {}: {}", stage, reason)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Maximum number of transactions a `MemoryBus` remembers
const HISTORY_LIMIT: usize = 64;

/// I2C bus that records writes in memory
///
/// Used by `--dry-run` and by tests. Reads return zeros.
#[derive(Debug, Default)]
pub struct MemoryBus {
    /// Address of the most recent transaction
    last_address: Option<u8>,

    /// Bytes of each write transaction, oldest first
    history: Vec<Vec<u8>>,

    /// Total number of write transactions seen
    write_count: usize,
}

impl MemoryBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Address used by the most recent transaction
    pub fn last_address(&self) -> Option<u8> {
        self.last_address
    }

    /// Recorded write transactions, oldest first
    pub fn history(&self) -> &[Vec<u8>] {
        &self.history
    }

    /// Most recent write transaction
    pub fn last_write(&self) -> Option<&[u8]> {
        self.history.last().map(Vec::as_slice)
    }

    /// Total number of write transactions, including ones trimmed from history
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl ErrorType for MemoryBus {
    type Error = Infallible;
}

impl I2c<SevenBitAddress> for MemoryBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.last_address = Some(address);

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    self.history.push(bytes.to_vec());
                    self.write_count += 1;
                    if self.history.len() > HISTORY_LIMIT {
                        self.history.remove(0);
                    }
                }
                Operation::Read(buffer) => buffer.fill(0),
            }
        }

        Ok(())
    }
}
