// Snapshot functionality
//
// Captures a composited frame and saves it as a grayscale PNG.

use super::framebuffer::{FRAME_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, STRIPE_HEIGHT};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during snapshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a snapshot of a stripe-ordered frame
///
/// # Arguments
///
/// * `frame` - Composited frame (1024 stripe-ordered bytes)
/// * `directory` - Directory to write into; created if missing
///
/// # Returns
///
/// Path of the written PNG
pub fn save_snapshot(frame: &[u8], directory: &Path) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(directory)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_path = directory.join(format!("snapshot_{}.png", timestamp));

    let luma = frame_to_luma(frame);
    save_png(
        &file_path,
        &luma,
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    )?;

    Ok(file_path)
}

/// Unpack a stripe-ordered frame into row-major 8-bit grayscale
///
/// Lit pixels become 0xFF, dark pixels 0x00.
///
/// # Panics
///
/// Panics if `frame` is not exactly `FRAME_SIZE` bytes
fn frame_to_luma(frame: &[u8]) -> Vec<u8> {
    assert_eq!(frame.len(), FRAME_SIZE, "snapshot needs a full frame");

    let mut luma = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT];
    for (y, row) in luma.chunks_exact_mut(SCREEN_WIDTH).enumerate() {
        let stripe = &frame[(y / STRIPE_HEIGHT) * SCREEN_WIDTH..][..SCREEN_WIDTH];
        let bit = 1 << (y % STRIPE_HEIGHT);
        for (pixel, &column) in row.iter_mut().zip(stripe) {
            if column & bit != 0 {
                *pixel = 0xFF;
            }
        }
    }
    luma
}

/// Save grayscale data as a PNG file
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_luma() {
        let mut frame = vec![0u8; FRAME_SIZE];
        frame[0] = 0b0000_0001; // (0, 0)
        frame[SCREEN_WIDTH + 5] = 0b1000_0000; // (5, 15)

        let luma = frame_to_luma(&frame);
        assert_eq!(luma.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
        assert_eq!(luma[0], 0xFF);
        assert_eq!(luma[1], 0x00);
        assert_eq!(luma[15 * SCREEN_WIDTH + 5], 0xFF);
        assert_eq!(luma.iter().filter(|&&p| p == 0xFF).count(), 2);
    }

    #[test]
    fn test_save_snapshot_writes_png() {
        let dir = std::env::temp_dir().join(format!("pironman-snapshot-{}", std::process::id()));
        let path = save_snapshot(&[0xAA; FRAME_SIZE], &dir).expect("snapshot saved");

        let bytes = fs::read(&path).expect("png readable");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let _ = fs::remove_dir_all(&dir);
    }
}
