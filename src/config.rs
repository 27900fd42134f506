//! Process configuration for the bridge

use anyhow::{Context, Result};
use std::time::Duration;

/// Configuration for the serial bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Path to the serial device (e.g. "/dev/ttyACM0")
    pub device_path: String,
    /// Baud rate; must match the firmware's Serial.begin() rate, a
    /// mismatch garbles bytes without raising an error at this layer
    pub baud_rate: u32,
    /// Bound for a single write+flush against the device
    pub io_timeout: Duration,
    /// Address the HTTP listener binds to
    pub listen_addr: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_path: "/dev/ttyACM0".into(),
            baud_rate: 115_200,
            io_timeout: Duration::from_secs(1),
            listen_addr: "127.0.0.1:8000".into(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: LED_BRIDGE_DEVICE, LED_BRIDGE_BAUD,
    /// LED_BRIDGE_IO_TIMEOUT_MS, LED_BRIDGE_LISTEN.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LED_BRIDGE_DEVICE") {
            config.device_path = path;
        }
        if let Ok(baud) = std::env::var("LED_BRIDGE_BAUD") {
            config.baud_rate = baud
                .parse()
                .with_context(|| format!("invalid LED_BRIDGE_BAUD: {baud}"))?;
        }
        if let Ok(ms) = std::env::var("LED_BRIDGE_IO_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("invalid LED_BRIDGE_IO_TIMEOUT_MS: {ms}"))?;
            config.io_timeout = Duration::from_millis(ms);
        }
        if let Ok(addr) = std::env::var("LED_BRIDGE_LISTEN") {
            config.listen_addr = addr;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware_expectations() {
        let config = BridgeConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.io_timeout, Duration::from_secs(1));
    }
}
