// Terminal preview
//
// Renders a frame as Unicode braille so the panel contents can be checked
// over SSH. Each braille cell covers 2×4 pixels, so every stripe becomes two
// text lines of 64 cells.

use super::framebuffer::{FRAME_SIZE, SCREEN_WIDTH, STRIPE_COUNT};

const BRAILLE_BASE: u32 = 0x2800;

/// Braille dot pattern for a 2×4 block of one stripe half
///
/// `left` and `right` are the two column bytes, `shift` selects the upper
/// (0) or lower (4) half of the stripe.
fn braille_cell(left: u8, right: u8, shift: u32) -> char {
    let l = left >> shift;
    let r = right >> shift;

    // Dots 1-3 and 4-6 are the first three rows, dots 7 and 8 the fourth
    let mut dots = u32::from(l & 0x07) | (u32::from(r & 0x07) << 3);
    if l & 0x08 != 0 {
        dots |= 0x40;
    }
    if r & 0x08 != 0 {
        dots |= 0x80;
    }

    char::from_u32(BRAILLE_BASE + dots).unwrap_or(' ')
}

/// Render a stripe-ordered frame as braille text
///
/// # Panics
/// Panics if `frame` is not exactly `FRAME_SIZE` bytes
pub fn render_braille(frame: &[u8]) -> String {
    assert_eq!(frame.len(), FRAME_SIZE, "preview needs a full frame");

    let mut out = String::with_capacity(STRIPE_COUNT * 2 * (SCREEN_WIDTH / 2 * 3 + 1));
    for stripe in frame.chunks_exact(SCREEN_WIDTH) {
        for shift in [0, 4] {
            for pair in stripe.chunks_exact(2) {
                out.push(braille_cell(pair[0], pair[1], shift));
            }
            out.push('\n');
        }
    }
    out
}
