// Built-in status dashboard
//
// Layout on the 128×64 panel:
//
//   y  0..15  clock (16 px font) on the left, temperature and CPU % right
//   y 16..54  scrolling CPU history, one column per tick, temperature dots
//   y 55      graph axis with a tick mark every `TICK_SPACING` columns
//   y 56..63  disk usage bar
//
// The axes and the bar outline live in the OR mask. The tick marks scroll
// with the graph in a layer of their own; each frame the axis stripe of the
// OR mask is rebuilt from the static chrome plus that layer, so other chrome
// in the stripe is never moved.

use super::{Canvas, FrameRenderer};
use crate::display::{FrameBuffer, MaskPair, SCREEN_WIDTH, STRIPE_HEIGHT};
use crate::sensors::{to_fahrenheit, SensorReadings};

const RIGHT: i32 = 127;

const GRAPH_TOP: i32 = 16;
const GRAPH_BOTTOM: i32 = 54;
const GRAPH_HEIGHT: i32 = GRAPH_BOTTOM - GRAPH_TOP + 1;
const AXIS_Y: i32 = 55;
const AXIS_STRIPE: usize = AXIS_Y as usize / STRIPE_HEIGHT;

/// Columns between axis tick marks
pub const TICK_SPACING: u64 = 10;

/// Temperature shown at the bottom of the graph, in °C
const TEMP_FLOOR: i32 = 30;

/// Temperature shown at the top of the graph, in °C
const TEMP_CEILING: i32 = 85;

const DISK_LABEL_Y: i32 = 56;
const DISK_BAR_LEFT: i32 = 26;
const DISK_BAR_TOP: i32 = 57;
const DISK_BAR_BOTTOM: i32 = 62;

/// Clock, temperature, CPU graph and disk bar
#[derive(Debug, Clone)]
pub struct Dashboard {
    fahrenheit: bool,
    frames: u64,
    /// OR mask as it stood after setup
    chrome: Option<FrameBuffer>,
    /// Scrolling axis tick marks
    ticks: FrameBuffer,
}

impl Dashboard {
    pub fn new(fahrenheit: bool) -> Self {
        Self {
            fahrenheit,
            frames: 0,
            chrome: None,
            ticks: FrameBuffer::new(),
        }
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Text for the temperature readout, e.g. `51.2C`
    pub fn temperature_label(&self, celsius: f64) -> String {
        if self.fahrenheit {
            format!("{:.0}F", to_fahrenheit(celsius))
        } else {
            format!("{:.1}C", celsius)
        }
    }

    fn draw_header(&self, readings: &SensorReadings, canvas: &mut Canvas<'_>) {
        canvas.erase_rect(0, 0, RIGHT, GRAPH_TOP - 1);

        let clock = canvas.date("%H:%M", readings.time);
        canvas.print(2, 0, &clock, 2);

        let temperature = self.temperature_label(readings.temperature);
        canvas.print(right_aligned(&temperature, 6), 0, &temperature, 1);

        let cpu = format!("{:.0}%", readings.cpu.clamp(0.0, 100.0));
        canvas.print(right_aligned(&cpu, 6), 8, &cpu, 1);
    }

    fn draw_graph(&self, readings: &SensorReadings, canvas: &mut Canvas<'_>) {
        // Scroll the history one column left and clear the newest column
        canvas.copy_rect(1, GRAPH_TOP, RIGHT, GRAPH_BOTTOM, -1, 0);
        canvas.erase_rect(RIGHT, GRAPH_TOP, RIGHT, GRAPH_BOTTOM);

        let bar = cpu_bar_height(readings.cpu);
        if bar > 0 {
            canvas.fill_rect(RIGHT, GRAPH_BOTTOM - bar + 1, RIGHT, GRAPH_BOTTOM);
        }

        // Temperature dot, inverted where it falls inside the CPU bar
        let dot = temperature_row(readings.temperature);
        if dot > GRAPH_BOTTOM - bar {
            canvas.erase_rect(RIGHT, dot, RIGHT, dot);
        } else {
            canvas.fill_rect(RIGHT, dot, RIGHT, dot);
        }
    }

    fn draw_axis_ticks(&mut self, canvas: &mut Canvas<'_>) {
        let or_mask = canvas.masks_mut().or_mask_mut();
        let chrome = self.chrome.get_or_insert_with(|| or_mask.clone());

        // Column 0 holds the vertical axis, so ticks stop at column 1
        self.ticks.copy_rect(2, AXIS_Y, RIGHT, AXIS_Y, -1, 0);
        self.ticks.erase_rect(RIGHT, AXIS_Y - 2, RIGHT, AXIS_Y - 1);
        if self.frames % TICK_SPACING == 0 {
            self.ticks.fill_rect(RIGHT, AXIS_Y - 2, RIGHT, AXIS_Y - 1);
        }

        let ticks = self.ticks.stripe(AXIS_STRIPE);
        let fixed = chrome.stripe(AXIS_STRIPE);
        for x in 0..SCREEN_WIDTH {
            or_mask.stripe_mut(AXIS_STRIPE)[x] = fixed[x] | ticks[x];
        }
    }

    fn draw_disk(&self, readings: &SensorReadings, canvas: &mut Canvas<'_>) {
        canvas.print(0, DISK_LABEL_Y, "disk", 1);

        let inner_left = DISK_BAR_LEFT + 1;
        let inner_right = RIGHT - 1;
        canvas.erase_rect(inner_left, DISK_BAR_TOP + 1, inner_right, DISK_BAR_BOTTOM - 1);

        let width = inner_right - inner_left + 1;
        let filled = (readings.disk.clamp(0.0, 100.0) * width as f64 / 100.0).round() as i32;
        if filled > 0 {
            canvas.fill_rect(
                inner_left,
                DISK_BAR_TOP + 1,
                inner_left + filled - 1,
                DISK_BAR_BOTTOM - 1,
            );
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(false)
    }
}

impl FrameRenderer for Dashboard {
    fn setup(&mut self, masks: &mut MaskPair) {
        let or_mask = masks.or_mask_mut();

        // The clock uses the top pixel row, so no chrome there
        or_mask.erase_rect(0, 0, RIGHT, 0);

        // Graph axes
        or_mask.fill_rect(0, GRAPH_TOP, 0, AXIS_Y);
        or_mask.fill_rect(0, AXIS_Y, RIGHT, AXIS_Y);

        // Disk bar outline
        or_mask.fill_rect(DISK_BAR_LEFT, DISK_BAR_TOP, RIGHT, DISK_BAR_BOTTOM);
        or_mask.erase_rect(
            DISK_BAR_LEFT + 1,
            DISK_BAR_TOP + 1,
            RIGHT - 1,
            DISK_BAR_BOTTOM - 1,
        );
    }

    fn render(&mut self, readings: &SensorReadings, canvas: &mut Canvas<'_>) {
        self.draw_header(readings, canvas);
        self.draw_graph(readings, canvas);
        self.draw_axis_ticks(canvas);
        self.draw_disk(readings, canvas);
        self.frames += 1;
    }
}

/// X position that ends `text` at the right edge of the panel
fn right_aligned(text: &str, glyph_width: i32) -> i32 {
    RIGHT + 1 - text.len() as i32 * glyph_width
}

/// Bar height in pixels for a CPU percentage
fn cpu_bar_height(cpu: f64) -> i32 {
    let percent = if cpu.is_nan() { 0.0 } else { cpu.clamp(0.0, 100.0) };
    (percent * GRAPH_HEIGHT as f64 / 100.0).round() as i32
}

/// Graph row for a temperature, clamped to the graph area
///
/// Signed arithmetic so temperatures below the floor clamp to the bottom row
/// instead of wrapping.
fn temperature_row(celsius: f64) -> i32 {
    let degrees = celsius.round() as i32;
    let span = TEMP_CEILING - TEMP_FLOOR;
    let offset = (degrees.saturating_sub(TEMP_FLOOR)).clamp(0, span);
    GRAPH_BOTTOM - offset * (GRAPH_HEIGHT - 1) / span
}
