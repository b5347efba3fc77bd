// Display module - Monochrome frame drawing and compositing
//
// This module provides:
// - 128×64 1-bit frame buffer organized as 8-pixel stripes
// - Rectangle fill/erase/copy and glyph blitting
// - Built-in fonts in four sizes
// - AND/OR mask compositing for static chrome
// - Braille terminal preview and PNG snapshots

pub mod font;
pub mod framebuffer;
pub mod mask;
pub mod preview;
pub mod screenshot;

pub use font::{Font, FONT_WIDTHS};
pub use framebuffer::{
    FrameBuffer, FRAME_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, STRIPE_COUNT, STRIPE_HEIGHT,
};
pub use mask::{MaskCompositor, MaskPair};
pub use preview::render_braille;
pub use screenshot::{save_snapshot, ScreenshotError};
