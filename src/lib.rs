// Pironman Lite Library
// Core library for the OLED status monitor and the WS2812 LED utility

// Public modules
pub mod config;
pub mod display;
pub mod leds;
pub mod logger;
pub mod monitor;
pub mod render;
pub mod sensors;
pub mod transport;

// Re-export main types for convenience
pub use config::{ConfigError, LedConfig, MonitorConfig};
pub use display::{FrameBuffer, MaskCompositor, MaskPair};
pub use leds::{LedError, LedTransmitter};
pub use logger::{LogLevel, Logger};
pub use monitor::{FrameStats, Monitor, MonitorOptions, Termination, Ticker};
pub use render::{Canvas, Dashboard, FrameRenderer};
pub use sensors::{SensorError, SensorReadings, SensorSource, Sensors};
pub use transport::{MemoryBus, Ssd1306, TransportError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let _frame = FrameBuffer::new();
        let _compositor = MaskCompositor::new(MaskPair::rounded_border());
        let _display = Ssd1306::dry_run(transport::DEFAULT_ADDRESS);
        let _transmitter = LedTransmitter::new(Vec::new());
        let _dashboard = Dashboard::default();
        let _config = MonitorConfig::default();
    }
}
