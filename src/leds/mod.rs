// LEDs module - WS2812 strings driven over SPI
//
// This module provides:
// - Hex color argument parsing and cyclic fill
// - GGRRBB bit-pair encoding into an SPI buffer
// - A transmitter that resends the whole buffer after short writes

pub mod color;
pub mod encoder;
pub mod transmitter;

pub use color::{fill_cyclic, hex3to6, parse_color, parse_colors, ColorError};
pub use encoder::{encode, encode_color, encoded_len, format_dump, CODES, SPI_CLOCK_HZ};
pub use transmitter::LedTransmitter;

use std::io;

/// Default spidev node wired to the LED string
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// Default number of LEDs on the string
pub const DEFAULT_COUNT: usize = 4;

/// Errors raised while driving the LED string
#[derive(Debug)]
pub enum LedError {
    /// The SPI device could not be opened
    Open { device: String, source: io::Error },

    /// The SPI clock could not be set
    Configure(io::Error),

    /// A write failed outright
    Write(io::Error),

    /// Every attempt ended in a short write
    Incomplete { attempts: u32, expected: usize },

    /// The color arguments were invalid
    Color(ColorError),
}

impl std::fmt::Display for LedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedError::Open { device, source } => {
                write!(f, "opening SPI device {}: {}", device, source)
            }
            LedError::Configure(e) => write!(f, "setting SPI frequency: {}", e),
            LedError::Write(e) => write!(f, "writing raw LED buffer to SPI device: {}", e),
            LedError::Incomplete {
                attempts,
                expected,
            } => write!(
                f,
                "SPI buffer of {} bytes still incomplete after {} attempts",
                expected, attempts
            ),
            LedError::Color(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedError::Open { source, .. } => Some(source),
            LedError::Configure(e) | LedError::Write(e) => Some(e),
            LedError::Color(e) => Some(e),
            LedError::Incomplete { .. } => None,
        }
    }
}

impl From<ColorError> for LedError {
    fn from(e: ColorError) -> Self {
        LedError::Color(e)
    }
}

/// Parse color arguments and expand them to `count` LEDs
pub fn plan_colors<S: AsRef<str>>(args: &[S], count: usize) -> Result<Vec<u32>, LedError> {
    let colors = parse_colors(args)?;
    Ok(fill_cyclic(&colors, count)?)
}
