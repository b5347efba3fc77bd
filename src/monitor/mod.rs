// Monitor module - The draw, composite and push cycle
//
// `Monitor` owns everything one panel needs: the drawing buffer, the mask
// compositor, the display driver, a sensor source and a renderer. Each tick
// it samples the sensors, lets the renderer draw, composites the masks
// straight into the display's wire buffer and pushes it.

pub mod signals;
pub mod ticker;

pub use signals::Termination;
pub use ticker::Ticker;

use crate::display::{render_braille, save_snapshot, FrameBuffer, MaskCompositor, MaskPair};
use crate::render::{Canvas, FrameRenderer};
use crate::sensors::SensorSource;
use crate::transport::{Ssd1306, TransportError};
use embedded_hal::i2c::I2c;
use log::{debug, info, log_enabled, warn, Level};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Optional behavior of the monitor loop
#[derive(Debug, Clone, Default)]
pub struct MonitorOptions {
    /// Print every frame to stdout as braille
    pub preview: bool,

    /// Stop after this many frames
    pub frame_limit: Option<u64>,

    /// Save the first frame as a PNG in this directory
    pub snapshot_directory: Option<PathBuf>,
}

/// Counters kept across frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames pushed to the panel
    pub frames: u64,

    /// Ticks skipped because a frame was still being processed
    pub overruns: u64,

    /// Time spent rendering and compositing the last frame
    pub last_frame_time: Duration,
}

/// One OLED panel and everything that feeds it
pub struct Monitor<I: I2c, S: SensorSource, R: FrameRenderer> {
    display: Ssd1306<I>,
    compositor: MaskCompositor,
    frame: FrameBuffer,
    sensors: S,
    renderer: R,
    options: MonitorOptions,
    stats: FrameStats,
}

impl<I: I2c, S: SensorSource, R: FrameRenderer> Monitor<I, S, R> {
    /// Assemble a monitor
    ///
    /// The renderer's static chrome is painted into the masks here, on top of
    /// whatever mask file the compositor already loaded.
    pub fn new(
        display: Ssd1306<I>,
        mut compositor: MaskCompositor,
        sensors: S,
        mut renderer: R,
        options: MonitorOptions,
    ) -> Self {
        renderer.setup(compositor.masks_mut());
        Self {
            display,
            compositor,
            frame: FrameBuffer::new(),
            sensors,
            renderer,
            options,
            stats: FrameStats::default(),
        }
    }

    /// Power the panel up
    pub fn start(&mut self) -> Result<(), TransportError> {
        self.display.initialize()?;
        info!("Display initialized");
        Ok(())
    }

    /// Produce and push one frame
    pub fn tick(&mut self) -> Result<(), TransportError> {
        let readings = self.sensors.sample();

        let started = Instant::now();
        {
            let mut canvas = Canvas::new(&mut self.frame, self.compositor.masks_mut());
            self.renderer.render(&readings, &mut canvas);
        }
        self.compositor
            .composite(&self.frame, self.display.frame_mut());
        self.stats.last_frame_time = started.elapsed();

        self.display.push()?;
        self.stats.frames += 1;

        debug!(
            "Frame {} took {:.6} seconds ({} overruns)",
            self.stats.frames,
            self.stats.last_frame_time.as_secs_f64(),
            self.stats.overruns
        );

        if self.options.preview || log_enabled!(Level::Trace) {
            println!("{}", render_braille(self.display.frame()));
        }

        if self.stats.frames == 1 {
            if let Some(directory) = &self.options.snapshot_directory {
                match save_snapshot(self.display.frame(), directory) {
                    Ok(path) => info!("Snapshot saved to {}", path.display()),
                    Err(e) => warn!("Could not save snapshot: {}", e),
                }
            }
        }

        Ok(())
    }

    /// Run until terminated or the frame limit is reached, then power off
    ///
    /// The panel is switched off on both the normal and the error path.
    pub fn run(
        &mut self,
        ticker: &mut Ticker,
        termination: &Termination,
    ) -> Result<FrameStats, TransportError> {
        let result = self.run_loop(ticker, termination);
        let shutdown = self.display.shutdown();
        result?;
        shutdown?;
        Ok(self.stats)
    }

    fn run_loop(
        &mut self,
        ticker: &mut Ticker,
        termination: &Termination,
    ) -> Result<(), TransportError> {
        loop {
            if let Some(limit) = self.options.frame_limit {
                if self.stats.frames >= limit {
                    info!("Frame limit of {} reached", limit);
                    return Ok(());
                }
            }

            if !ticker.wait(termination) {
                info!("Termination requested");
                return Ok(());
            }
            self.stats.overruns = ticker.overruns();

            self.tick()?;
        }
    }

    /// Counters so far
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The display driver
    pub fn display(&self) -> &Ssd1306<I> {
        &self.display
    }

    /// The drawing buffer, before masks are applied
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// The masks applied to every frame
    pub fn masks(&self) -> &MaskPair {
        self.compositor.masks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorReadings;
    use crate::transport::{MemoryBus, HEADER_LEN};

    fn fixed() -> SensorReadings {
        SensorReadings {
            temperature: 45.0,
            cpu: 50.0,
            time: 0,
            disk: 25.0,
        }
    }

    fn square(_: &SensorReadings, canvas: &mut Canvas<'_>) {
        canvas.fill_rect(0, 0, 7, 7);
    }

    fn monitor(
        masks: MaskPair,
        options: MonitorOptions,
    ) -> Monitor<MemoryBus, fn() -> SensorReadings, fn(&SensorReadings, &mut Canvas<'_>)> {
        Monitor::new(
            Ssd1306::dry_run(0x3C),
            MaskCompositor::new(masks),
            fixed as fn() -> SensorReadings,
            square as fn(&SensorReadings, &mut Canvas<'_>),
            options,
        )
    }

    #[test]
    fn test_tick_composites_into_wire_frame() {
        let mut masks = MaskPair::transparent();
        masks.and_mask_mut().erase_rect(0, 0, 0, 7);
        masks.or_mask_mut().fill_rect(127, 63, 127, 63);

        let mut monitor = monitor(masks, MonitorOptions::default());
        monitor.tick().expect("memory bus");

        let wire = monitor.display().bus().last_write().expect("frame pushed");
        let payload = &wire[HEADER_LEN..];
        assert_eq!(payload[0], 0x00);
        assert_eq!(payload[1], 0xFF);
        assert_eq!(payload[1023], 0x80);

        // The drawing buffer itself is untouched by the masks
        assert_eq!(monitor.frame().stripe(0)[0], 0xFF);
        assert_eq!(monitor.stats().frames, 1);
    }

    #[test]
    fn test_run_honors_frame_limit_and_powers_off() {
        let options = MonitorOptions {
            frame_limit: Some(3),
            ..MonitorOptions::default()
        };
        let mut monitor = monitor(MaskPair::transparent(), options);
        monitor.start().expect("memory bus");

        let mut ticker = Ticker::immediate(Duration::from_millis(1));
        let stats = monitor
            .run(&mut ticker, &Termination::new())
            .expect("memory bus");

        assert_eq!(stats.frames, 3);
        assert!(!monitor.display().is_powered());
        assert_eq!(monitor.display().bus().last_write(), Some(&[0x80, 0xAE][..]));
        // init + blank frame + 3 frames + power off
        assert_eq!(monitor.display().bus().write_count(), 6);
    }

    #[test]
    fn test_run_stops_on_termination() {
        let mut monitor = monitor(MaskPair::transparent(), MonitorOptions::default());
        monitor.start().expect("memory bus");

        let termination = Termination::new();
        termination.request();
        let mut ticker = Ticker::new(Duration::from_secs(60));
        let stats = monitor.run(&mut ticker, &termination).expect("memory bus");

        assert_eq!(stats.frames, 0);
        assert!(!monitor.display().is_powered());
    }

    #[test]
    fn test_snapshot_after_first_frame() {
        let directory =
            std::env::temp_dir().join(format!("pironman-monitor-snap-{}", std::process::id()));
        let options = MonitorOptions {
            snapshot_directory: Some(directory.clone()),
            ..MonitorOptions::default()
        };
        let mut monitor = monitor(MaskPair::transparent(), options);
        monitor.tick().expect("memory bus");

        let pngs = std::fs::read_dir(&directory)
            .expect("snapshot directory created")
            .count();
        assert_eq!(pngs, 1);

        let _ = std::fs::remove_dir_all(&directory);
    }
}
