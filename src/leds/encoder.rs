// WS2812 SPI encoder
//
// A WS2812 data bit is a long or short high pulse inside a fixed ~1.25 µs
// slot. Clocking SPI at 3.125 MHz gives 320 ns per SPI bit, so one nibble of
// SPI output (`0b0010` or `0b0110`) reproduces one WS2812 bit. Each SPI byte
// therefore carries two LED bits, and one 24-bit color takes 12 bytes.

use std::fmt::Write;

/// SPI clock giving 320 ns per bit; 125 MHz core clock divided by 40
pub const SPI_CLOCK_HZ: u32 = 3_125_000;

/// SPI byte for each two-bit group, indexed by the group value
pub const CODES: [u8; 4] = [0x22, 0x26, 0x62, 0x66];

/// Zero bytes before and after the LED data
pub const PADDING: usize = 4;

/// SPI bytes per LED
pub const BYTES_PER_LED: usize = 12;

/// Total buffer length for `count` LEDs
pub fn encoded_len(count: usize) -> usize {
    PADDING + count * BYTES_PER_LED + PADDING
}

/// Encode one `0xRRGGBB` color into its 12 SPI bytes
///
/// The strip expects green first, so the channels go out as G, R, B, each
/// most significant bit first. Bits above the low 24 are ignored.
pub fn encode_color(color: u32) -> [u8; BYTES_PER_LED] {
    let color = color & 0x00FF_FFFF;
    let wire = ((color & 0x00FF00) << 8) | ((color & 0xFF0000) >> 8) | (color & 0x0000FF);

    let mut out = [0u8; BYTES_PER_LED];
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = 22 - 2 * i;
        *byte = CODES[((wire >> shift) & 3) as usize];
    }
    out
}

/// Build the full SPI buffer for a string of LEDs
///
/// # Arguments
///
/// * `colors` - One `0xRRGGBB` value per LED, first LED first
///
/// # Returns
///
/// `encoded_len(colors.len())` bytes: leading zeros, LED data, trailing zeros
pub fn encode(colors: &[u32]) -> Vec<u8> {
    let mut buffer = vec![0u8; encoded_len(colors.len())];
    for (chunk, &color) in buffer[PADDING..]
        .chunks_exact_mut(BYTES_PER_LED)
        .zip(colors)
    {
        chunk.copy_from_slice(&encode_color(color));
    }
    buffer
}

/// Format a buffer for logging
///
/// The padding bytes go on the first line and the rest follow eight to a
/// line, each line indented with a tab and bytes separated by colons.
pub fn format_dump(buffer: &[u8]) -> String {
    let mut out = String::with_capacity(buffer.len() * 5 + 16);
    let (head, body) = buffer.split_at(buffer.len().min(PADDING));

    for line in std::iter::once(head).chain(body.chunks(8)) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('\t');
        for (i, byte) in line.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            let _ = write!(out, "0x{:02X}", byte);
        }
    }
    out
}
