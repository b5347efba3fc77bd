//! SSD1306 over I2C
//!
//! Every I2C write to the controller starts with a control byte: `0x80` means
//! "one command byte follows, then another control byte", `0x40` means "the
//! rest of this transaction is display RAM". Command sequences are therefore
//! sent as alternating `0x80, command` pairs, while a whole frame is one
//! `0x40` followed by 1024 raw bytes.

use super::{MemoryBus, TransportError};
use crate::display::FRAME_SIZE;
use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use log::{debug, info, warn};
use std::path::Path;

/// Usual 7-bit address of 128×64 SSD1306 modules
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Control byte announcing a single command byte
pub const CONTROL_COMMAND: u8 = 0x80;

/// Control byte announcing a run of display RAM bytes
pub const CONTROL_DATA: u8 = 0x40;

/// SSD1306 command opcodes
pub struct Cmd;

impl Cmd {
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDRESS: u8 = 0x21;
    pub const PAGE_ADDRESS: u8 = 0x22;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const START_LINE: u8 = 0x40;
    pub const CONTRAST: u8 = 0x81;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SEGMENT_REMAP: u8 = 0xA1;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const MULTIPLEX_RATIO: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const DISPLAY_OFFSET: u8 = 0xD3;
    pub const CLOCK_DIVIDE: u8 = 0xD5;
    pub const PRECHARGE: u8 = 0xD9;
    pub const COM_PINS: u8 = 0xDA;
    pub const VCOMH_DESELECT: u8 = 0xDB;
}

/// Power-up sequence, commands and their arguments in order
pub const INIT_COMMANDS: &[u8] = &[
    Cmd::DISPLAY_OFF,
    Cmd::MEMORY_MODE,
    0x00, // horizontal addressing, matches the stripe layout
    Cmd::MULTIPLEX_RATIO,
    0x3F, // 64 rows
    Cmd::DISPLAY_OFFSET,
    0x00,
    Cmd::START_LINE,
    Cmd::SEGMENT_REMAP,
    Cmd::COM_SCAN_DEC,
    Cmd::COM_PINS,
    0x12, // alternative COM pin layout used by 128×64 modules
    Cmd::CONTRAST,
    0xFF,
    Cmd::RESUME_RAM,
    Cmd::NORMAL_DISPLAY,
    Cmd::CLOCK_DIVIDE,
    0x80,
    Cmd::PRECHARGE,
    0xF1,
    Cmd::VCOMH_DESELECT,
    0x30,
    Cmd::CHARGE_PUMP,
    0x14, // internal charge pump on
    Cmd::DISPLAY_ON,
    Cmd::DEACTIVATE_SCROLL,
];

/// Power-down sequence
pub const SHUTDOWN_COMMANDS: &[u8] = &[Cmd::DISPLAY_OFF];

/// Interleave command bytes with `CONTROL_COMMAND` markers
pub fn command_stream(commands: &[u8]) -> Vec<u8> {
    commands
        .iter()
        .flat_map(|&command| [CONTROL_COMMAND, command])
        .collect()
}

/// Length of the preamble sent in front of every frame
pub const HEADER_LEN: usize = 13;

/// Preamble resetting the controller's RAM window to the full panel
///
/// Re-sent with every frame so the write cursor always starts at the top-left.
const FRAME_HEADER: [u8; HEADER_LEN] = [
    CONTROL_COMMAND,
    Cmd::COLUMN_ADDRESS,
    CONTROL_COMMAND,
    0x00,
    CONTROL_COMMAND,
    0x7F,
    CONTROL_COMMAND,
    Cmd::PAGE_ADDRESS,
    CONTROL_COMMAND,
    0x00,
    CONTROL_COMMAND,
    0x07,
    CONTROL_DATA,
];

/// One complete I2C frame transfer: preamble followed by pixel payload
///
/// Kept as a single contiguous buffer so a frame is one write. The first
/// `HEADER_LEN` bytes are fixed; only `payload_mut` is ever handed out for
/// writing.
#[derive(Clone)]
pub struct WireFrame {
    bytes: [u8; HEADER_LEN + FRAME_SIZE],
}

impl WireFrame {
    /// Create a frame with a blank payload
    pub fn new() -> Self {
        let mut bytes = [0u8; HEADER_LEN + FRAME_SIZE];
        bytes[..HEADER_LEN].copy_from_slice(&FRAME_HEADER);
        Self { bytes }
    }

    /// The fixed preamble
    pub fn header(&self) -> &[u8] {
        &self.bytes[..HEADER_LEN]
    }

    /// Pixel bytes in stripe order
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Mutable pixel bytes in stripe order
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[HEADER_LEN..]
    }

    /// Everything that goes on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for WireFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// SSD1306 panel attached to an I2C bus
///
/// The panel is switched off again when the driver is dropped, so the OLED
/// is never left lit after the process exits.
pub struct Ssd1306<I: I2c> {
    i2c: I,
    address: u8,
    frame: WireFrame,
    powered: bool,
}

impl Ssd1306<I2cdev> {
    /// Open a Linux I2C character device
    pub fn open<P: AsRef<Path>>(device: P, address: u8) -> Result<Self, TransportError> {
        let device = device.as_ref();
        let i2c = I2cdev::new(device).map_err(|e| TransportError::Open {
            device: device.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(
            "Opened OLED on {} at address {:#04x}",
            device.display(),
            address
        );
        Ok(Self::new(i2c, address))
    }
}

impl Ssd1306<MemoryBus> {
    /// Driver that writes into memory instead of hardware
    pub fn dry_run(address: u8) -> Self {
        Self::new(MemoryBus::new(), address)
    }
}

impl<I: I2c> Ssd1306<I> {
    /// Wrap an already opened bus
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            frame: WireFrame::new(),
            powered: false,
        }
    }

    fn send(&mut self, bytes: &[u8], stage: &'static str) -> Result<(), TransportError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| TransportError::Bus {
                stage,
                reason: format!("{:?}", e),
            })
    }

    /// Power the panel up and clear it
    ///
    /// A blank frame is pushed straight away so old RAM contents never scroll
    /// in on startup. The panel counts as powered from the first init byte, so
    /// a half-initialized panel is still switched off on drop.
    pub fn initialize(&mut self) -> Result<(), TransportError> {
        debug!("Sending SSD1306 init sequence");
        let init = command_stream(INIT_COMMANDS);
        self.powered = true;
        self.send(&init, "initializing display")?;

        self.frame.payload_mut().fill(0);
        self.push()
    }

    /// Mutable pixel payload of the next frame
    pub fn frame_mut(&mut self) -> &mut [u8] {
        self.frame.payload_mut()
    }

    /// Pixel payload of the next frame
    pub fn frame(&self) -> &[u8] {
        self.frame.payload()
    }

    /// Send the current frame, preamble included
    pub fn push(&mut self) -> Result<(), TransportError> {
        let Self {
            i2c,
            address,
            frame,
            ..
        } = self;
        i2c.write(*address, frame.as_bytes())
            .map_err(|e| TransportError::Bus {
                stage: "pushing frame",
                reason: format!("{:?}", e),
            })
    }

    /// Switch the panel off
    pub fn shutdown(&mut self) -> Result<(), TransportError> {
        let off = command_stream(SHUTDOWN_COMMANDS);
        self.send(&off, "powering display off")?;
        self.powered = false;
        info!("OLED powered off");
        Ok(())
    }

    /// Whether `initialize` was attempted without a successful `shutdown`
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// The underlying bus
    pub fn bus(&self) -> &I {
        &self.i2c
    }
}

impl<I: I2c> Drop for Ssd1306<I> {
    fn drop(&mut self) {
        if self.powered {
            if let Err(e) = self.shutdown() {
                warn!("Could not power off display: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_stream_interleaves_markers() {
        assert_eq!(
            command_stream(&[Cmd::DISPLAY_OFF, Cmd::DISPLAY_ON]),
            vec![0x80, 0xAE, 0x80, 0xAF]
        );
    }

    #[test]
    fn test_init_sequence_bounds() {
        let init = command_stream(INIT_COMMANDS);
        assert_eq!(&init[..2], &[0x80, 0xAE]);
        assert_eq!(&init[init.len() - 4..], &[0x80, 0xAF, 0x80, 0x2E]);
        assert_eq!(init.len(), INIT_COMMANDS.len() * 2);
    }

    #[test]
    fn test_wire_frame_layout() {
        let mut frame = WireFrame::new();
        frame.payload_mut()[0] = 0x5A;

        assert_eq!(frame.as_bytes().len(), HEADER_LEN + FRAME_SIZE);
        assert_eq!(frame.header()[HEADER_LEN - 1], CONTROL_DATA);
        assert_eq!(frame.as_bytes()[HEADER_LEN], 0x5A);
        assert_eq!(frame.payload().len(), FRAME_SIZE);
    }

    #[test]
    fn test_initialize_sends_init_then_blank_frame() {
        let mut display = Ssd1306::dry_run(DEFAULT_ADDRESS);
        display.frame_mut().fill(0xFF);
        display.initialize().expect("memory bus");

        let history = display.bus().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], command_stream(INIT_COMMANDS));
        assert_eq!(&history[1][..HEADER_LEN], &FRAME_HEADER);
        assert!(history[1][HEADER_LEN..].iter().all(|&b| b == 0));
        assert_eq!(display.bus().last_address(), Some(DEFAULT_ADDRESS));
        assert!(display.is_powered());
    }

    #[test]
    fn test_push_resends_header() {
        let mut display = Ssd1306::dry_run(0x3D);
        display.frame_mut()[1023] = 0x81;
        display.push().expect("memory bus");
        display.push().expect("memory bus");

        for write in display.bus().history() {
            assert_eq!(write.len(), HEADER_LEN + FRAME_SIZE);
            assert_eq!(&write[..HEADER_LEN], &FRAME_HEADER);
            assert_eq!(write[HEADER_LEN + 1023], 0x81);
        }
    }

    #[test]
    fn test_shutdown_powers_off() {
        let mut display = Ssd1306::dry_run(DEFAULT_ADDRESS);
        display.initialize().expect("memory bus");
        display.shutdown().expect("memory bus");

        assert_eq!(display.bus().last_write(), Some(&[0x80, 0xAE][..]));
        assert!(!display.is_powered());
    }
}
