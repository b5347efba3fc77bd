// Color argument parsing
//
// Colors are given on the command line as hex strings in one of six forms:
// `RGB`, `#RGB`, `0xRGB`, `RRGGBB`, `#RRGGBB` or `0xRRGGBB`. The short forms
// are widened by doubling every nibble, so `#A5F` is `#AA55FF`.

use std::fmt;

/// Errors produced while parsing color arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The argument length matches none of the accepted forms
    InvalidLength(String),

    /// The argument has the right length but the wrong prefix
    InvalidPrefix(String),

    /// The argument contains something other than hex digits
    InvalidDigits(String),

    /// LEDs were requested but no colors were supplied
    NoColors { count: usize },

    /// More colors were supplied than there are LEDs
    TooManyColors { supplied: usize, count: usize },
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::InvalidLength(arg) => write!(
                f,
                "'{}' is not a color, expected RGB, #RGB, 0xRGB, RRGGBB, #RRGGBB or 0xRRGGBB",
                arg
            ),
            ColorError::InvalidPrefix(arg) => {
                write!(f, "'{}' must start with '#' or '0x' for its length", arg)
            }
            ColorError::InvalidDigits(arg) => {
                write!(f, "'{}' contains characters that are not hex digits", arg)
            }
            ColorError::NoColors { count } => {
                write!(f, "no colors given for {} LEDs", count)
            }
            ColorError::TooManyColors { supplied, count } => {
                write!(f, "{} colors given but only {} LEDs", supplied, count)
            }
        }
    }
}

impl std::error::Error for ColorError {}

/// Widen a 12-bit `0xRGB` value to 24-bit `0xRRGGBB`
///
/// Each nibble is duplicated into a full byte. Bits above the low 12 are
/// ignored.
pub fn hex3to6(value: u32) -> u32 {
    ((value & 0x00F) * 0x11) + ((value & 0x0F0) * 0x110) + ((value & 0xF00) * 0x1100)
}

/// Parse one color argument into a 24-bit `0xRRGGBB` word
pub fn parse_color(arg: &str) -> Result<u32, ColorError> {
    let (digits, short) = match arg.len() {
        3 => (arg, true),
        6 => (arg, false),
        4 | 7 => match arg.strip_prefix('#') {
            Some(rest) => (rest, arg.len() == 4),
            None => return Err(ColorError::InvalidPrefix(arg.to_string())),
        },
        5 | 8 => match arg.strip_prefix("0x") {
            Some(rest) => (rest, arg.len() == 5),
            None => return Err(ColorError::InvalidPrefix(arg.to_string())),
        },
        _ => return Err(ColorError::InvalidLength(arg.to_string())),
    };

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidDigits(arg.to_string()));
    }

    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| ColorError::InvalidDigits(arg.to_string()))?;

    Ok(if short { hex3to6(value) } else { value })
}

/// Parse a list of color arguments
pub fn parse_colors<S: AsRef<str>>(args: &[S]) -> Result<Vec<u32>, ColorError> {
    args.iter().map(|arg| parse_color(arg.as_ref())).collect()
}

/// Extend `colors` to exactly `count` entries by repeating it
///
/// Missing slots take `colors[i % colors.len()]`, so `[a, b]` for four LEDs
/// becomes `[a, b, a, b]`.
pub fn fill_cyclic(colors: &[u32], count: usize) -> Result<Vec<u32>, ColorError> {
    if colors.len() > count {
        return Err(ColorError::TooManyColors {
            supplied: colors.len(),
            count,
        });
    }

    if colors.is_empty() {
        if count == 0 {
            return Ok(Vec::new());
        }
        return Err(ColorError::NoColors { count });
    }

    Ok((0..count).map(|i| colors[i % colors.len()]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex3to6() {
        assert_eq!(hex3to6(0xABC), 0xAABBCC);
        assert_eq!(hex3to6(0x000), 0x000000);
        assert_eq!(hex3to6(0xFFF), 0xFFFFFF);
        assert_eq!(hex3to6(0x1F00A), 0xFF00AA);
    }

    #[test]
    fn test_parse_all_forms() {
        assert_eq!(parse_color("f80"), Ok(0xFF8800));
        assert_eq!(parse_color("#f80"), Ok(0xFF8800));
        assert_eq!(parse_color("0xf80"), Ok(0xFF8800));
        assert_eq!(parse_color("102030"), Ok(0x102030));
        assert_eq!(parse_color("#102030"), Ok(0x102030));
        assert_eq!(parse_color("0x102030"), Ok(0x102030));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_color("12"), Err(ColorError::InvalidLength(_))));
        assert!(matches!(
            parse_color("0x1020304"),
            Err(ColorError::InvalidLength(_))
        ));
        assert!(matches!(parse_color("1234"), Err(ColorError::InvalidPrefix(_))));
        assert!(matches!(
            parse_color("#12345"),
            Err(ColorError::InvalidPrefix(_))
        ));
        assert!(matches!(parse_color("0y12345"), Err(ColorError::InvalidPrefix(_))));
        assert!(matches!(parse_color("ggg"), Err(ColorError::InvalidDigits(_))));
        assert!(matches!(parse_color("#+12"), Err(ColorError::InvalidDigits(_))));
        assert!(matches!(parse_color("0x 12"), Err(ColorError::InvalidDigits(_))));
    }

    #[test]
    fn test_fill_cyclic_repeats() {
        let filled = fill_cyclic(&[0x100000, 0x002000], 4).expect("valid");
        assert_eq!(filled, vec![0x100000, 0x002000, 0x100000, 0x002000]);

        let filled = fill_cyclic(&[1, 2, 3], 5).expect("valid");
        assert_eq!(filled, vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn test_fill_cyclic_errors() {
        assert_eq!(fill_cyclic(&[], 3), Err(ColorError::NoColors { count: 3 }));
        assert_eq!(
            fill_cyclic(&[1, 2, 3], 2),
            Err(ColorError::TooManyColors {
                supplied: 3,
                count: 2
            })
        );
        assert_eq!(fill_cyclic(&[], 0), Ok(Vec::new()));
    }
}
