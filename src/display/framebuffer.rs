// Frame Buffer - 1-bit-per-pixel bitmap for the SSD1306 panel
//
// The panel is 128×64 pixels. Memory is organized as eight horizontal
// "stripes", each 8 pixels tall and stored as one byte per column, which is
// exactly the page layout the controller expects in horizontal addressing mode.
// Bit `b` of the byte at `stripe * 128 + x` is pixel `(x, stripe * 8 + b)`.

use super::font::{self, Font};

/// Panel width in pixels
pub const SCREEN_WIDTH: usize = 128;

/// Panel height in pixels
pub const SCREEN_HEIGHT: usize = 64;

/// Height of one stripe in pixels
pub const STRIPE_HEIGHT: usize = 8;

/// Number of stripes covering the panel
pub const STRIPE_COUNT: usize = SCREEN_HEIGHT / STRIPE_HEIGHT;

/// Total number of bytes in the frame buffer
pub const FRAME_SIZE: usize = SCREEN_WIDTH * STRIPE_COUNT;

const MAX_X: i32 = SCREEN_WIDTH as i32 - 1;
const MAX_Y: i32 = SCREEN_HEIGHT as i32 - 1;
const MAX_STRIPE: i32 = STRIPE_COUNT as i32 - 1;

/// How a rectangle operation modifies the bits it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Set,
    Clear,
}

impl Paint {
    /// Apply a partial-stripe bit mask to one byte
    #[inline]
    fn apply(self, byte: &mut u8, mask: u8) {
        match self {
            Paint::Set => *byte |= mask,
            Paint::Clear => *byte &= !mask,
        }
    }

    /// Byte value used for whole-stripe fills
    #[inline]
    fn fill_byte(self) -> u8 {
        match self {
            Paint::Set => 0xFF,
            Paint::Clear => 0x00,
        }
    }
}

/// A rectangle that has been normalized and clipped to the panel
///
/// All coordinates are inclusive and guaranteed to be inside the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClippedRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl ClippedRect {
    /// Normalize corner order and clip to the panel
    ///
    /// Returns `None` when the rectangle lies entirely off the panel.
    fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        let (y0, y1) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
        let (x0, x1) = if x0 > x1 { (x1, x0) } else { (x0, x1) };

        if y0 > MAX_Y || y1 < 0 || x0 > MAX_X || x1 < 0 {
            return None;
        }

        Some(Self {
            x0: x0.max(0),
            y0: y0.max(0),
            x1: x1.min(MAX_X),
            y1: y1.min(MAX_Y),
        })
    }
}

/// Frame buffer for the monochrome panel
///
/// Every drawing primitive accepts untrusted signed coordinates (they come
/// straight from renderers) and clips or rejects them, so no input can index
/// outside the 1024-byte buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixel data, one byte per column per stripe
    bytes: [u8; FRAME_SIZE],
}

impl FrameBuffer {
    /// Create a new frame buffer with every pixel off
    pub fn new() -> Self {
        Self {
            bytes: [0x00; FRAME_SIZE],
        }
    }

    /// Create a frame buffer with every byte set to `value`
    pub fn filled(value: u8) -> Self {
        Self {
            bytes: [value; FRAME_SIZE],
        }
    }

    /// Byte offset of column `x` within `stripe`
    #[inline]
    fn offset(stripe: usize, x: usize) -> usize {
        stripe * SCREEN_WIDTH + x
    }

    /// Set or clear a single pixel
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !(0..=MAX_X).contains(&x) || !(0..=MAX_Y).contains(&y) {
            return;
        }

        let (x, y) = (x as usize, y as usize);
        let byte = &mut self.bytes[Self::offset(y / STRIPE_HEIGHT, x)];
        let bit = 1 << (y % STRIPE_HEIGHT);
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Read a single pixel; out-of-range coordinates read as off
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        if !(0..=MAX_X).contains(&x) || !(0..=MAX_Y).contains(&y) {
            return false;
        }

        let (x, y) = (x as usize, y as usize);
        self.bytes[Self::offset(y / STRIPE_HEIGHT, x)] & (1 << (y % STRIPE_HEIGHT)) != 0
    }

    /// Borrow one stripe (128 column bytes)
    ///
    /// # Panics
    /// Panics if `stripe` is not below `STRIPE_COUNT`
    pub fn stripe(&self, stripe: usize) -> &[u8] {
        assert!(stripe < STRIPE_COUNT, "stripe {} out of bounds", stripe);
        let start = Self::offset(stripe, 0);
        &self.bytes[start..start + SCREEN_WIDTH]
    }

    /// Mutably borrow one stripe (128 column bytes)
    ///
    /// # Panics
    /// Panics if `stripe` is not below `STRIPE_COUNT`
    pub fn stripe_mut(&mut self, stripe: usize) -> &mut [u8] {
        assert!(stripe < STRIPE_COUNT, "stripe {} out of bounds", stripe);
        let start = Self::offset(stripe, 0);
        &mut self.bytes[start..start + SCREEN_WIDTH]
    }

    /// Get the raw stripe-ordered bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Get mutable access to the raw stripe-ordered bytes
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Turn on every pixel in the inclusive rectangle (x0,y0)-(x1,y1)
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.paint_rect(x0, y0, x1, y1, Paint::Set);
    }

    /// Turn off every pixel in the inclusive rectangle (x0,y0)-(x1,y1)
    pub fn erase_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.paint_rect(x0, y0, x1, y1, Paint::Clear);
    }

    /// Shared body of `fill_rect` / `erase_rect`
    ///
    /// The rectangle is split into a partial stripe at the top, a partial
    /// stripe at the bottom, and whole stripes in between which are written a
    /// byte at a time. When both ends fall inside the same stripe the top pass
    /// consumes every row, which leaves nothing for the bottom pass.
    fn paint_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, paint: Paint) {
        let Some(rect) = ClippedRect::new(x0, y0, x1, y1) else {
            return;
        };

        let columns = rect.x0 as usize..=rect.x1 as usize;
        let mut top = rect.y0;
        let mut bottom = rect.y1;

        let top_stripe = (top / 8) as usize;
        let mut mask = 0u8;
        while top & 7 != 0 && top <= bottom {
            mask |= 1 << (top & 7);
            top += 1;
        }
        if mask != 0 {
            self.paint_columns(top_stripe, columns.clone(), mask, paint);
        }

        let bottom_stripe = (bottom / 8) as usize;
        let mut mask = 0u8;
        while bottom & 7 != 7 && top <= bottom {
            mask |= 1 << (bottom & 7);
            bottom -= 1;
        }
        if mask != 0 {
            self.paint_columns(bottom_stripe, columns.clone(), mask, paint);
        }

        // Whatever is left is stripe-aligned at both ends
        let mut y = top;
        while y < bottom {
            let stripe = (y / 8) as usize;
            let start = Self::offset(stripe, *columns.start());
            let end = Self::offset(stripe, *columns.end());
            self.bytes[start..=end].fill(paint.fill_byte());
            y += 8;
        }
    }

    fn paint_columns(
        &mut self,
        stripe: usize,
        columns: std::ops::RangeInclusive<usize>,
        mask: u8,
        paint: Paint,
    ) {
        for byte in &mut self.stripe_mut(stripe)[columns] {
            paint.apply(byte, mask);
        }
    }

    /// Copy a stripe-aligned rectangle by an offset
    ///
    /// The low three bits of every Y input are ignored, so the rectangle always
    /// covers whole stripes and moves by whole stripes. Both the source and
    /// the destination are clipped to the panel; moves are overlap-safe, so a
    /// region may be scrolled onto itself.
    ///
    /// # Arguments
    /// * `x0`, `y0`, `x1`, `y1` - Inclusive source corners
    /// * `x_offset`, `y_offset` - Displacement applied to the source region
    pub fn copy_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x_offset: i32,
        y_offset: i32,
    ) {
        let (x0, x1) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
        let (y0, y1) = if y0 > y1 { (y1, y0) } else { (y0, y1) };

        // Arithmetic shift keeps negative coordinates in the stripe "below" zero
        let (s0, s1, so) = (y0 >> 3, y1 >> 3, y_offset >> 3);

        // Clip the source both to the panel and to where the destination lands
        let s0 = s0.max(0).max(-so);
        let s1 = s1.min(MAX_STRIPE).min(MAX_STRIPE - so);
        let x0 = x0.max(0).max(x_offset.saturating_neg());
        let x1 = x1.min(MAX_X).min(MAX_X.saturating_sub(x_offset));

        if s0 > s1 || x0 > x1 {
            return;
        }

        let width = (x1 - x0 + 1) as usize;
        let copy_stripe = |bytes: &mut [u8; FRAME_SIZE], stripe: i32| {
            let src = Self::offset(stripe as usize, x0 as usize);
            let dst = Self::offset((stripe + so) as usize, (x0 + x_offset) as usize);
            bytes.copy_within(src..src + width, dst);
        };

        // Walk away from the destination so overlapping stripes are read
        // before they are overwritten
        if so > 0 {
            for stripe in (s0..=s1).rev() {
                copy_stripe(&mut self.bytes, stripe);
            }
        } else {
            for stripe in s0..=s1 {
                copy_stripe(&mut self.bytes, stripe);
            }
        }
    }

    /// Blit one glyph of the built-in font
    ///
    /// `size` selects the 8/16/24/32 pixel tall font (1-4). The low three
    /// bits of `y` are ignored. Nothing is drawn if the size is unknown or the
    /// glyph would not fit entirely on the panel.
    ///
    /// # Returns
    /// `true` if the glyph was drawn
    pub fn draw_glyph(&mut self, x: i32, y: i32, code: u32, size: i32) -> bool {
        match font::builtin(size) {
            Some(font) => self.draw_glyph_with(font, x, y, code),
            None => false,
        }
    }

    /// Blit one glyph of an explicit font
    pub fn draw_glyph_with(&mut self, font: &Font, x: i32, y: i32, code: u32) -> bool {
        let width = font.width() as i32;
        let height = (font.stripes() * STRIPE_HEIGHT) as i32;

        if x < 0 || y < 0 || y > SCREEN_HEIGHT as i32 - height || x > SCREEN_WIDTH as i32 - width
        {
            return false;
        }

        let first_stripe = (y >> 3) as usize;
        for (row, columns) in font.glyph_rows(code).enumerate() {
            let start = Self::offset(first_stripe + row, x as usize);
            self.bytes[start..start + columns.len()].copy_from_slice(columns);
        }

        true
    }

    /// Render a string left to right starting at (x, y)
    ///
    /// Each byte of `text` is drawn as one glyph; glyphs that do not fit are
    /// skipped but still advance the cursor.
    pub fn print(&mut self, x: i32, y: i32, text: &str, size: i32) {
        let Some(font) = font::builtin(size) else {
            return;
        };

        let advance = font.width() as i32;
        let mut cursor = x;
        for byte in text.bytes() {
            self.draw_glyph_with(font, cursor, y, u32::from(byte));
            cursor = cursor.saturating_add(advance);
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.bytes.iter().map(|b| b.count_ones()).sum::<u32>();
        f.debug_struct("FrameBuffer")
            .field("lit_pixels", &lit)
            .finish()
    }
}
