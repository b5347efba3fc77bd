// Built-in bitmap fonts
//
// Glyphs are stored the same way the frame buffer is: one byte per column,
// least significant bit at the top, one row of column bytes per stripe. A
// single 5×7 base face is scaled up for the 16, 24 and 32 pixel tall sizes.

use std::sync::OnceLock;

/// First character code covered by the glyph table
pub const FIRST_CHAR: u32 = 32;

/// Last character code covered by the glyph table
pub const LAST_CHAR: u32 = 126;

/// Number of glyphs in every font
pub const GLYPH_COUNT: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

/// Glyph advance (including one blank spacing column) for sizes 1-4
pub const FONT_WIDTHS: [usize; 4] = [6, 8, 12, 16];

const BASE_WIDTH: usize = 5;

/// 5×7 base face for ' '..='~', one byte per column
#[rustfmt::skip]
const BASE_GLYPHS: [[u8; BASE_WIDTH]; GLYPH_COUNT] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x56, 0x20, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x10, 0x08, 0x08, 0x10, 0x08], // '~'
];

/// A fixed-width font laid out in stripe rows
#[derive(Debug, Clone)]
pub struct Font {
    /// Glyph advance in columns
    width: usize,
    /// Glyph height in stripes (8 pixels each)
    stripes: usize,
    /// `GLYPH_COUNT` glyphs of `width * stripes` bytes each
    data: Vec<u8>,
}

impl Font {
    /// Build the font for `size` (1-4) by scaling the base face
    ///
    /// The final column of every glyph is left blank as letter spacing.
    fn scaled(size: usize) -> Self {
        let width = FONT_WIDTHS[size - 1];
        let drawn = width - 1;
        let mut data = vec![0u8; GLYPH_COUNT * width * size];

        for (index, glyph) in BASE_GLYPHS.iter().enumerate() {
            for stripe in 0..size {
                for dx in 0..drawn {
                    let column = glyph[dx * BASE_WIDTH / drawn];
                    let mut byte = 0u8;
                    for bit in 0..8 {
                        let source_row = (stripe * 8 + bit) / size;
                        if column & (1 << source_row) != 0 {
                            byte |= 1 << bit;
                        }
                    }
                    data[(index * size + stripe) * width + dx] = byte;
                }
            }
        }

        Self {
            width,
            stripes: size,
            data,
        }
    }

    /// Glyph advance in columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Glyph height in 8-pixel stripes
    pub fn stripes(&self) -> usize {
        self.stripes
    }

    /// Glyph bytes for a character code, falling back to the blank glyph
    pub fn glyph(&self, code: u32) -> &[u8] {
        let index = if (FIRST_CHAR..=LAST_CHAR).contains(&code) {
            (code - FIRST_CHAR) as usize
        } else {
            0
        };
        let len = self.width * self.stripes;
        &self.data[index * len..(index + 1) * len]
    }

    /// Iterate a glyph one stripe row at a time, top to bottom
    pub fn glyph_rows(&self, code: u32) -> std::slice::Chunks<'_, u8> {
        self.glyph(code).chunks(self.width)
    }
}

/// Look up the built-in font for a size selector
///
/// Sizes 1-4 select 8, 16, 24 and 32 pixel tall fonts; anything else is `None`.
pub fn builtin(size: i32) -> Option<&'static Font> {
    static FONTS: OnceLock<[Font; 4]> = OnceLock::new();

    if !(1..=4).contains(&size) {
        return None;
    }

    let fonts = FONTS.get_or_init(|| [1, 2, 3, 4].map(Font::scaled));
    fonts.get(size as usize - 1)
}
