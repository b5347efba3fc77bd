// Pironman Lite - WS2812 LED utility
//
// Sets every LED on the string once and exits. Colors given on the command
// line repeat to fill the whole string.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{debug, info};
use pironman_lite::config::LedConfig;
use pironman_lite::leds::{self, encode, format_dump, LedTransmitter, SPI_CLOCK_HZ};
use pironman_lite::{LogLevel, Logger};
use std::path::PathBuf;

/// SPI-based LED control utility for WS2812 strings
#[derive(Parser, Debug)]
#[command(name = "pironman-leds", version, about)]
struct Cli {
    /// SPI device, defaults to /dev/spidev0.0
    #[arg(short, long, value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// Number of LEDs, defaults to 4
    #[arg(short, long, value_name = "COUNT")]
    count: Option<usize>,

    /// Increase output verbosity (-v colors, -vv SPI buffer dump)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Encode and log, but do not open the SPI device
    #[arg(long)]
    dry_run: bool,

    /// Mirror log output into this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Colors as RGB, #RGB, 0xRGB, RRGGBB, #RRGGBB or 0xRRGGBB
    #[arg(value_name = "HEXCOLOR")]
    colors: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = Logger::new(LogLevel::from_verbosity(cli.verbose));
    if let Some(path) = &cli.log_file {
        logger = logger.with_log_file(path)?;
    }
    logger.install()?;

    let mut config = match &cli.config {
        Some(path) => LedConfig::load_or_default(path),
        None => LedConfig::default(),
    };
    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(count) = cli.count {
        config.count = count;
    }
    let arguments = if cli.colors.is_empty() {
        &config.colors
    } else {
        &cli.colors
    };

    // Bad colors are a usage error, reported the way clap reports its own
    let colors = match leds::plan_colors(arguments, config.count) {
        Ok(colors) => colors,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    info!(
        "Using SPI device: {} for {} LEDs of values:",
        config.device.display(),
        config.count
    );
    for color in &colors {
        info!("\t#{:06X}", color);
    }

    let buffer = encode(&colors);
    debug!("Planned SPI buffer:\n{}", format_dump(&buffer));

    if cli.dry_run {
        let mut transmitter = LedTransmitter::new(Vec::with_capacity(buffer.len()));
        transmitter.transmit(&buffer)?;
        info!("Dry run, {} bytes encoded", transmitter.writer().len());
        return Ok(());
    }

    let mut transmitter = LedTransmitter::open(&config.device)?;
    transmitter.set_clock_rate(SPI_CLOCK_HZ)?;
    transmitter.transmit(&buffer)?;

    Ok(())
}
