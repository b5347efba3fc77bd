// LED pipeline integration tests
// Arguments through cyclic fill, encoding and a retrying transmitter

mod common;

use common::ShortWriter;
use pironman_lite::leds::{
    encode, encode_color, encoded_len, format_dump, plan_colors, ColorError, LedError,
    LedTransmitter, CODES,
};
use std::time::Duration;

/// Decode one LED back to RGB from its 12 SPI bytes
fn decode_led(bytes: &[u8]) -> u32 {
    let mut grb = 0u32;
    for byte in bytes {
        let pair = match byte {
            0x22 => 0,
            0x26 => 1,
            0x62 => 2,
            0x66 => 3,
            _ => panic!("unexpected code {:#04x}", byte),
        };
        grb = grb << 2 | pair;
    }
    let g = grb >> 16 & 0xFF;
    let r = grb >> 8 & 0xFF;
    let b = grb & 0xFF;
    r << 16 | g << 8 | b
}

#[test]
fn test_arguments_to_buffer() {
    let colors = plan_colors(&["f00", "0x00ff00"], 5).unwrap();
    assert_eq!(colors, vec![0xFF0000, 0x00FF00, 0xFF0000, 0x00FF00, 0xFF0000]);

    let buffer = encode(&colors);
    assert_eq!(buffer.len(), encoded_len(5));
    assert_eq!(buffer.len(), 4 + 12 * 5 + 4);
    assert_eq!(&buffer[..4], &[0, 0, 0, 0]);
    assert_eq!(&buffer[buffer.len() - 4..], &[0, 0, 0, 0]);

    for (i, color) in colors.iter().enumerate() {
        let start = 4 + i * 12;
        assert_eq!(decode_led(&buffer[start..start + 12]), *color, "LED {}", i);
    }
}

#[test]
fn test_every_byte_between_padding_is_a_code() {
    let colors: Vec<u32> = (0..64u32).map(|i| i.wrapping_mul(0x04_0B_11)).collect();
    let buffer = encode(&colors);
    for byte in &buffer[4..buffer.len() - 4] {
        assert!(CODES.contains(byte), "byte {:#04x}", byte);
    }
}

#[test]
fn test_green_is_sent_first() {
    let bytes = encode_color(0x00FF00);
    assert_eq!(&bytes[..4], &[0x66; 4]);
    assert_eq!(&bytes[4..], &[0x22; 8]);
}

#[test]
fn test_too_many_colors_is_rejected() {
    match plan_colors(&["f00", "0f0", "00f"], 2) {
        Err(LedError::Color(ColorError::TooManyColors { supplied, count })) => {
            assert_eq!((supplied, count), (3, 2));
        }
        other => panic!("expected too many colors, got {:?}", other),
    }
}

#[test]
fn test_no_colors_is_rejected() {
    let none: [&str; 0] = [];
    assert!(matches!(
        plan_colors(&none, 4),
        Err(LedError::Color(ColorError::NoColors { .. }))
    ));
}

#[test]
fn test_short_writes_resend_whole_buffer() {
    let buffer = encode(&[0x123456, 0xABCDEF]);
    let mut transmitter = LedTransmitter::new(ShortWriter::new(2, 7))
        .with_latch_delay(Duration::from_millis(0));

    let attempts = transmitter.transmit(&buffer).unwrap();

    assert_eq!(attempts, 3);
    let writer = transmitter.into_inner();
    assert_eq!(writer.calls, 3);
    assert_eq!(writer.completed, vec![buffer]);
}

#[test]
fn test_persistent_short_writes_give_up() {
    let buffer = encode(&[0xFFFFFF]);
    let mut transmitter = LedTransmitter::new(ShortWriter::new(usize::MAX, 1))
        .with_latch_delay(Duration::from_millis(0))
        .with_max_attempts(5);

    match transmitter.transmit(&buffer) {
        Err(LedError::Incomplete { attempts, expected }) => {
            assert_eq!(attempts, 5);
            assert_eq!(expected, buffer.len());
        }
        other => panic!("expected incomplete write, got {:?}", other),
    }
}

#[test]
fn test_dump_lists_every_byte() {
    let buffer = encode(&[0x000000, 0xFFFFFF]);
    let dump = format_dump(&buffer);
    assert_eq!(dump.matches("0x").count(), buffer.len());
    assert!(dump.starts_with('\t'));
}
