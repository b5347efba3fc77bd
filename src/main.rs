// Pironman Lite - OLED status monitor
//
// Draws temperature, CPU load, disk usage and the time onto a 128×64 SSD1306
// panel once per interval until interrupted, then switches the panel off.

use clap::Parser;
use embedded_hal::i2c::I2c;
use log::{error, info};
use pironman_lite::config::{self, parse_address, MonitorConfig};
use pironman_lite::display::{MaskCompositor, MaskPair};
use pironman_lite::monitor::{Monitor, MonitorOptions, Termination, Ticker};
use pironman_lite::render::Dashboard;
use pironman_lite::sensors::{CpuSampler, Sensors};
use pironman_lite::transport::Ssd1306;
use pironman_lite::{LogLevel, Logger};
use std::path::PathBuf;

/// Monitoring utility for tiny I2C OLED screens
#[derive(Parser, Debug)]
#[command(name = "pironman-monitor", version, about)]
struct Cli {
    /// Increase output verbosity (-v info, -vv frame timing, -vvv braille preview)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// OLED I2C device; defaults to /dev/i2c-1
    #[arg(long, value_name = "DEVICE")]
    oled_device: Option<PathBuf>,

    /// OLED I2C address; defaults to 0x3C
    #[arg(long, value_name = "ADDRESS", value_parser = parse_address)]
    oled_address: Option<u8>,

    /// Mask file overriding the built-in border
    #[arg(long, value_name = "FILE")]
    mask: Option<PathBuf>,

    /// Temperature monitoring device; defaults to /sys/class/thermal/thermal_zone0/temp
    #[arg(long, value_name = "DEVICE")]
    temperature_device: Option<PathBuf>,

    /// Filesystem whose usage is shown; defaults to /
    #[arg(long, value_name = "PATH")]
    disk_path: Option<PathBuf>,

    /// Milliseconds between frames
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Show temperatures in Fahrenheit
    #[arg(long)]
    fahrenheit: bool,

    /// Render without touching the I2C bus
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Print every frame to stdout as braille
    #[arg(long)]
    preview: bool,

    /// Save a PNG of the first frame into this directory
    #[arg(long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Mirror log output into this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,
}

impl Cli {
    /// Configuration file contents with command line overrides applied
    fn resolve_config(&self) -> MonitorConfig {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load_or_default(path),
            None => MonitorConfig::default(),
        };

        if let Some(device) = &self.oled_device {
            config.oled.device = device.clone();
        }
        if let Some(address) = self.oled_address {
            config.oled.address = address;
        }
        if let Some(mask) = &self.mask {
            config.oled.mask = Some(mask.clone());
        }
        if let Some(device) = &self.temperature_device {
            config.sensors.temperature_device = device.clone();
        }
        if let Some(path) = &self.disk_path {
            config.sensors.disk_path = path.clone();
        }
        if let Some(interval) = self.interval_ms {
            config.interval_ms = interval;
        }
        if self.fahrenheit {
            config.fahrenheit = true;
        }
        if let Some(directory) = &self.snapshot_dir {
            config.snapshot_directory = Some(directory.clone());
        }

        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = Logger::new(LogLevel::from_verbosity(cli.verbose));
    if let Some(path) = &cli.log_file {
        logger = logger.with_log_file(path)?;
    }
    logger.install()?;

    let config = cli.resolve_config();
    if let Some(path) = &cli.save_config {
        config::save_to_file(&config, path)?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }
    info!("pironman-monitor v{}", env!("CARGO_PKG_VERSION"));

    let sensors = Sensors::open(
        &config.sensors.temperature_device,
        &config.sensors.proc_stat,
        &config.sensors.disk_path,
        CpuSampler::default_capacity(config.interval().as_secs_f64()),
    )?;

    let mut compositor = MaskCompositor::new(MaskPair::rounded_border());
    if let Some(mask) = &config.oled.mask {
        compositor.apply_mask_file(mask);
    }

    let termination = Termination::from_signals()?;
    let options = MonitorOptions {
        preview: cli.preview,
        frame_limit: cli.frames,
        snapshot_directory: config.snapshot_directory.clone(),
    };

    let result = if cli.dry_run {
        info!("Dry run, frames are not sent to the display");
        run(
            Ssd1306::dry_run(config.oled.address),
            compositor,
            sensors,
            &config,
            options,
            &termination,
        )
    } else {
        let display = Ssd1306::open(&config.oled.device, config.oled.address)?;
        run(display, compositor, sensors, &config, options, &termination)
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn run<I: I2c>(
    display: Ssd1306<I>,
    compositor: MaskCompositor,
    sensors: Sensors,
    config: &MonitorConfig,
    options: MonitorOptions,
    termination: &Termination,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = Dashboard::new(config.fahrenheit);
    let mut monitor = Monitor::new(display, compositor, sensors, dashboard, options);
    monitor.start()?;

    let mut ticker = Ticker::new(config.interval());
    let stats = monitor.run(&mut ticker, termination)?;

    info!(
        "Stopped after {} frames ({} overruns)",
        stats.frames, stats.overruns
    );
    Ok(())
}
