//! Target device description and protocol limits.
//!
//! A device is described either by `device: key = "value"` lines in the
//! script or by a TOML file; both feed the same [`DeviceConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version this compiler emits. Devices declaring any other
/// version are rejected.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Errors raised while applying a single device setting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceSettingError {
    #[error("unknown device setting '{0}'")]
    UnknownKey(String),

    #[error("device setting '{key}' expects an unsigned integer, found '{value}'")]
    InvalidInteger { key: String, value: String },

    #[error("device setting '{key}' expects true/yes/false/no, found '{value}'")]
    InvalidBool { key: String, value: String },

    #[error("device setting '{0}' must be greater than zero")]
    Zero(&'static str),
}

/// Static description of the target LED controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub usb_vendor_id: String,
    pub usb_product_id: String,
    pub usb_packet_byte_len: u32,
    #[serde(alias = "tickIntervalMs")]
    pub tick_interval_millisecs: u32,
    pub ram_space_bytes: u32,
    pub rom_space_bytes: u32,
    pub led_count: u32,
    pub protocol_version: String,
    pub save_to_rom: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "unknown".into(),
            device_type: "unknown".into(),
            usb_vendor_id: "unknown".into(),
            usb_product_id: "unknown".into(),
            usb_packet_byte_len: 64,
            tick_interval_millisecs: 0,
            ram_space_bytes: 0,
            rom_space_bytes: 0,
            led_count: 0,
            protocol_version: "unknown".into(),
            save_to_rom: false,
        }
    }
}

impl DeviceConfig {
    /// Apply one `key = "value"` setting. Keys are case-insensitive.
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<(), DeviceSettingError> {
        match key.to_ascii_lowercase().as_str() {
            // Name keeps its case for display.
            "name" => self.name = value.to_string(),
            "type" => self.device_type = value.to_ascii_lowercase(),
            "usbvendorid" => self.usb_vendor_id = value.to_ascii_lowercase(),
            "usbproductid" => self.usb_product_id = value.to_ascii_lowercase(),
            "usbpacketbytelen" => self.usb_packet_byte_len = parse_u32(key, value)?,
            "tickintervalmillisecs" => self.tick_interval_millisecs = parse_u32(key, value)?,
            "ramspacebytes" => self.ram_space_bytes = parse_u32(key, value)?,
            "romspacebytes" => self.rom_space_bytes = parse_u32(key, value)?,
            "ledcount" => self.led_count = parse_u32(key, value)?,
            "protocolversion" => self.protocol_version = value.to_ascii_lowercase(),
            "savetorom" => self.save_to_rom = parse_bool(key, value)?,
            _ => return Err(DeviceSettingError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Check the settings every compilation depends on.
    pub fn validate(&self) -> Result<(), DeviceSettingError> {
        if self.led_count == 0 {
            return Err(DeviceSettingError::Zero("ledCount"));
        }
        if self.tick_interval_millisecs == 0 {
            return Err(DeviceSettingError::Zero("tickIntervalMillisecs"));
        }
        if self.usb_packet_byte_len == 0 {
            return Err(DeviceSettingError::Zero("usbPacketByteLen"));
        }
        Ok(())
    }

    /// USB packet length in bits.
    pub fn packet_bits(&self) -> u64 {
        u64::from(self.usb_packet_byte_len) * 8
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, DeviceSettingError> {
    value
        .trim()
        .parse()
        .map_err(|_| DeviceSettingError::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DeviceSettingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(DeviceSettingError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Limits imposed by the device protocol rather than by a specific device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolLimits {
    /// Maximum number of concurrently executing paths.
    pub max_threads: u32,
}

impl Default for ProtocolLimits {
    fn default() -> Self {
        Self { max_threads: 256 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_case_insensitive() {
        let mut dev = DeviceConfig::default();
        dev.apply_setting("LedCount", "8").unwrap();
        dev.apply_setting("TICKINTERVALMILLISECS", "10").unwrap();
        dev.apply_setting("saveToRom", "Yes").unwrap();
        dev.apply_setting("name", "Desk Lamp").unwrap();
        dev.apply_setting("protocolVersion", "1.0").unwrap();
        assert_eq!(dev.led_count, 8);
        assert_eq!(dev.tick_interval_millisecs, 10);
        assert!(dev.save_to_rom);
        assert_eq!(dev.name, "Desk Lamp");
        assert_eq!(dev.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut dev = DeviceConfig::default();
        assert_eq!(
            dev.apply_setting("ledCount", "eight"),
            Err(DeviceSettingError::InvalidInteger {
                key: "ledCount".into(),
                value: "eight".into()
            })
        );
        assert!(matches!(
            dev.apply_setting("saveToRom", "maybe"),
            Err(DeviceSettingError::InvalidBool { .. })
        ));
        assert_eq!(
            dev.apply_setting("colour", "red"),
            Err(DeviceSettingError::UnknownKey("colour".into()))
        );
    }

    #[test]
    fn validate_requires_leds_and_tick() {
        let mut dev = DeviceConfig::default();
        assert_eq!(dev.validate(), Err(DeviceSettingError::Zero("ledCount")));
        dev.led_count = 8;
        assert_eq!(
            dev.validate(),
            Err(DeviceSettingError::Zero("tickIntervalMillisecs"))
        );
        dev.tick_interval_millisecs = 10;
        assert_eq!(dev.validate(), Ok(()));
    }

    #[test]
    fn defaults_match_usb_full_speed_packet() {
        let dev = DeviceConfig::default();
        assert_eq!(dev.usb_packet_byte_len, 64);
        assert_eq!(dev.packet_bits(), 512);
        assert_eq!(ProtocolLimits::default().max_threads, 256);
    }
}
