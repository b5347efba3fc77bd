// LED SPI transmitter
//
// Pushes an encoded buffer to the strip in one write. The LEDs latch after
// the line idles low for a while, so a partial transfer cannot be resumed;
// the whole buffer is resent after a short pause instead.

use super::LedError;
use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions};
use log::{debug, info, warn};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Pause between attempts, long enough for the strip to latch
pub const LATCH_DELAY: Duration = Duration::from_millis(1);

/// Attempts made before a string of short writes is given up on
pub const MAX_ATTEMPTS: u32 = 100;

/// Sends WS2812 buffers through any byte sink
///
/// On hardware the sink is a spidev handle; dry runs and tests use a `Vec<u8>`
/// or a custom writer.
pub struct LedTransmitter<W: Write> {
    writer: W,
    latch_delay: Duration,
    max_attempts: u32,
}

impl LedTransmitter<Spidev> {
    /// Open a spidev device for writing
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, LedError> {
        let device = device.as_ref();
        let spi = Spidev::open(device).map_err(|source| LedError::Open {
            device: device.display().to_string(),
            source,
        })?;
        info!("Opened SPI device {}", device.display());
        Ok(Self::new(spi))
    }

    /// Set the SPI clock in Hz
    pub fn set_clock_rate(&mut self, hz: u32) -> Result<(), LedError> {
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        self.writer
            .configure(&options)
            .map_err(LedError::Configure)?;
        debug!("SPI clock set to {} Hz", hz);
        Ok(())
    }
}

impl<W: Write> LedTransmitter<W> {
    /// Wrap an already opened sink
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            latch_delay: LATCH_DELAY,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Override the pause between attempts
    pub fn with_latch_delay(mut self, delay: Duration) -> Self {
        self.latch_delay = delay;
        self
    }

    /// Override the attempt limit
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Write the whole buffer in a single transfer
    ///
    /// A short write is logged, followed by a latch pause and a resend of the
    /// complete buffer. Any I/O error ends the transfer.
    ///
    /// # Returns
    ///
    /// The number of attempts it took
    pub fn transmit(&mut self, buffer: &[u8]) -> Result<u32, LedError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.writer.write(buffer) {
                Ok(written) if written == buffer.len() => break,
                Ok(written) => {
                    warn!(
                        "Incomplete SPI buffer write ({} of {} bytes), retrying",
                        written,
                        buffer.len()
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    debug!("SPI write interrupted, retrying");
                }
                Err(e) => return Err(LedError::Write(e)),
            }

            if attempt >= self.max_attempts {
                return Err(LedError::Incomplete {
                    attempts: attempt,
                    expected: buffer.len(),
                });
            }
            thread::sleep(self.latch_delay);
        }

        self.writer.flush().map_err(LedError::Write)?;
        debug!("Sent {} bytes in {} attempt(s)", buffer.len(), attempt);
        Ok(attempt)
    }

    /// The underlying sink
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consume the transmitter and return its sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}
