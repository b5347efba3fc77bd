// Render module - What gets drawn each tick
//
// A `FrameRenderer` is called once per tick with the latest sensor readings
// and a `Canvas`. The canvas is the whole drawing surface a renderer gets:
// text, rectangle fill/erase/copy, restricted date formatting and access to
// the masks for chrome that changes over time.

pub mod dashboard;
pub mod date;

pub use dashboard::Dashboard;
pub use date::{format_date, MAX_DATE_LEN};

use crate::display::{FrameBuffer, MaskPair};
use crate::sensors::SensorReadings;

/// Per-tick drawing strategy
pub trait FrameRenderer {
    /// Paint static chrome into the masks before the first frame
    fn setup(&mut self, _masks: &mut MaskPair) {}

    /// Draw one frame
    fn render(&mut self, readings: &SensorReadings, canvas: &mut Canvas<'_>);
}

impl<F> FrameRenderer for F
where
    F: FnMut(&SensorReadings, &mut Canvas<'_>),
{
    fn render(&mut self, readings: &SensorReadings, canvas: &mut Canvas<'_>) {
        self(readings, canvas)
    }
}

/// Drawing surface handed to renderers
///
/// All coordinates are untrusted; out-of-range values are clipped or
/// ignored by the frame buffer.
pub struct Canvas<'a> {
    frame: &'a mut FrameBuffer,
    masks: &'a mut MaskPair,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut FrameBuffer, masks: &'a mut MaskPair) -> Self {
        Self { frame, masks }
    }

    /// Draw `text` with its top-left corner at (x, y)
    ///
    /// `size` 1-4 selects the 8/16/24/32 pixel tall font.
    pub fn print(&mut self, x: i32, y: i32, text: &str, size: i32) {
        self.frame.print(x, y, text, size);
    }

    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.frame.fill_rect(x0, y0, x1, y1);
    }

    pub fn erase_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.frame.erase_rect(x0, y0, x1, y1);
    }

    /// Move a stripe-aligned region; see `FrameBuffer::copy_rect`
    pub fn copy_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x_offset: i32,
        y_offset: i32,
    ) {
        self.frame.copy_rect(x0, y0, x1, y1, x_offset, y_offset);
    }

    /// Format a timestamp; see `format_date`
    pub fn date(&self, format: &str, timestamp: i64) -> String {
        format_date(format, timestamp)
    }

    /// The frame being drawn
    pub fn frame(&self) -> &FrameBuffer {
        self.frame
    }

    /// The masks composited over this frame
    pub fn masks_mut(&mut self) -> &mut MaskPair {
        self.masks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closure<F: FnMut(&SensorReadings, &mut Canvas<'_>)>(f: F) -> F {
        f
    }

    #[test]
    fn test_closure_renderer() {
        let mut frame = FrameBuffer::new();
        let mut masks = MaskPair::transparent();
        let mut renderer = closure(|readings, canvas| {
            let width = readings.cpu as i32;
            canvas.fill_rect(0, 0, width - 1, 7);
        });

        let readings = SensorReadings {
            cpu: 10.0,
            ..SensorReadings::default()
        };
        renderer.render(&readings, &mut Canvas::new(&mut frame, &mut masks));

        assert_eq!(&frame.stripe(0)[..10], &[0xFF; 10]);
        assert_eq!(frame.stripe(0)[10], 0);
    }

    #[test]
    fn test_canvas_clips_untrusted_input() {
        let mut frame = FrameBuffer::new();
        let mut masks = MaskPair::transparent();
        let mut canvas = Canvas::new(&mut frame, &mut masks);

        canvas.fill_rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        canvas.copy_rect(-500, -500, 500, 500, 1000, -1000);
        canvas.print(i32::MAX, 0, "overflow", 1);
        canvas.print(0, 0, "size", 9);

        assert!(canvas.frame().as_slice().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_canvas_reaches_masks() {
        let mut frame = FrameBuffer::new();
        let mut masks = MaskPair::transparent();
        {
            let mut canvas = Canvas::new(&mut frame, &mut masks);
            canvas.masks_mut().or_mask_mut().fill_rect(0, 0, 0, 0);
        }
        assert!(masks.or_mask().get_pixel(0, 0));
    }
}
