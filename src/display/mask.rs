// Mask compositing
//
// Static chrome (borders, labels, graph axes) lives in a pair of masks that
// are combined with the drawn frame once per update:
//
//     output[i] = (frame[i] | or_mask[i]) & and_mask[i]
//
// Mask text files describe one pixel row per line: `X` knocks a pixel out
// through the AND mask, `+` forces it on through the OR mask, anything else
// leaves the pixel alone.

use super::framebuffer::{FrameBuffer, FRAME_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// AND/OR overlay pair
///
/// Both masks are full frame buffers so the ordinary drawing primitives can
/// be used to paint chrome into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPair {
    and_mask: FrameBuffer,
    or_mask: FrameBuffer,
}

impl MaskPair {
    /// Masks that leave the frame untouched (AND all ones, OR all zeros)
    pub fn transparent() -> Self {
        Self {
            and_mask: FrameBuffer::filled(0xFF),
            or_mask: FrameBuffer::new(),
        }
    }

    /// Built-in decorative chrome: a one pixel border with rounded corners
    pub fn rounded_border() -> Self {
        let mut masks = Self::transparent();
        let right = SCREEN_WIDTH as i32 - 1;
        let bottom = SCREEN_HEIGHT as i32 - 1;

        masks.or_mask.fill_rect(0, 0, right, bottom);
        masks.or_mask.erase_rect(1, 1, right - 1, bottom - 1);

        for (x, y) in [(0, 0), (right, 0), (0, bottom), (right, bottom)] {
            masks.and_mask.set_pixel(x, y, false);
        }

        masks
    }

    /// The AND mask; cleared bits force pixels off
    pub fn and_mask(&self) -> &FrameBuffer {
        &self.and_mask
    }

    /// Mutable AND mask, for renderers that redraw chrome every frame
    pub fn and_mask_mut(&mut self) -> &mut FrameBuffer {
        &mut self.and_mask
    }

    /// The OR mask; set bits force pixels on
    pub fn or_mask(&self) -> &FrameBuffer {
        &self.or_mask
    }

    /// Mutable OR mask, for renderers that redraw chrome every frame
    pub fn or_mask_mut(&mut self) -> &mut FrameBuffer {
        &mut self.or_mask
    }

    /// Replace both masks with the contents of a mask description
    ///
    /// Masks are reset to transparent first. Each line is one pixel row; only
    /// the first 64 lines and the first 128 bytes of each line are used. Short
    /// lines and missing rows stay transparent.
    ///
    /// # Returns
    /// Number of rows read. On a read error the rows parsed so far are kept.
    pub fn load_text<R: BufRead>(&mut self, mut reader: R) -> io::Result<usize> {
        *self = Self::transparent();

        let mut line = Vec::with_capacity(SCREEN_WIDTH + 2);
        let mut rows = 0;
        while rows < SCREEN_HEIGHT {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            let y = rows as i32;
            for (x, &c) in line.iter().take(SCREEN_WIDTH).enumerate() {
                match c {
                    b'X' => self.and_mask.set_pixel(x as i32, y, false),
                    b'+' => self.or_mask.set_pixel(x as i32, y, true),
                    _ => {}
                }
            }
            rows += 1;
        }

        Ok(rows)
    }

    /// Parse a mask description from a string
    pub fn from_text(text: &str) -> Self {
        let mut masks = Self::transparent();
        // Reading from an in-memory slice cannot fail
        let _ = masks.load_text(text.as_bytes());
        masks
    }

    /// Load a mask file from disk, replacing both masks
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        let file = File::open(path)?;
        self.load_text(BufReader::new(file))
    }
}

impl Default for MaskPair {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Combines the drawn frame with the mask pair
///
/// This is the single synchronization point between drawing and
/// transmission: it runs over the whole frame once per update and writes the
/// result into a separate output buffer, leaving the drawing buffer intact
/// for the next frame.
#[derive(Debug, Clone, Default)]
pub struct MaskCompositor {
    masks: MaskPair,
}

impl MaskCompositor {
    /// Create a compositor around a mask pair
    pub fn new(masks: MaskPair) -> Self {
        Self { masks }
    }

    /// Get the current masks
    pub fn masks(&self) -> &MaskPair {
        &self.masks
    }

    /// Get mutable access to the masks
    pub fn masks_mut(&mut self) -> &mut MaskPair {
        &mut self.masks
    }

    /// Override the masks from a file, keeping the current ones on failure
    ///
    /// A missing or unreadable mask file is not fatal; it only disables the
    /// override.
    ///
    /// # Returns
    /// `true` if the file was applied
    pub fn apply_mask_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let mut masks = MaskPair::transparent();
        match masks.load_file(path) {
            Ok(rows) => {
                log::info!("Loaded {} mask rows from {}", rows, path.display());
                self.masks = masks;
                true
            }
            Err(e) => {
                log::warn!(
                    "Could not read mask file {} ({}), using default",
                    path.display(),
                    e
                );
                false
            }
        }
    }

    /// Composite `frame` into `output`
    ///
    /// # Panics
    /// Panics if `output` is not exactly `FRAME_SIZE` bytes
    pub fn composite(&self, frame: &FrameBuffer, output: &mut [u8]) {
        assert_eq!(
            output.len(),
            FRAME_SIZE,
            "composite output must be exactly one frame"
        );

        let and = self.masks.and_mask.as_slice();
        let or = self.masks.or_mask.as_slice();
        for (i, (out, &pixel)) in output.iter_mut().zip(frame.as_slice()).enumerate() {
            *out = (pixel | or[i]) & and[i];
        }
    }

    /// Composite into a freshly allocated frame buffer
    pub fn composite_to_frame(&self, frame: &FrameBuffer) -> FrameBuffer {
        let mut output = FrameBuffer::new();
        self.composite(frame, output.as_mut_slice());
        output
    }
}
