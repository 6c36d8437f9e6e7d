//! Compilation context threaded through every backend stage.

use glow_types::{DeviceConfig, ProtocolLimits, PROTOCOL_VERSION};

use crate::error::{CodegenError, CodegenResult};

/// Device description plus protocol limits for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileContext {
    pub device: DeviceConfig,
    pub limits: ProtocolLimits,
}

impl CompileContext {
    pub fn new(device: DeviceConfig) -> Self {
        Self {
            device,
            limits: ProtocolLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ProtocolLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Reject devices this compiler cannot target.
    pub fn check(&self) -> CodegenResult<()> {
        if self.device.protocol_version != PROTOCOL_VERSION {
            return Err(CodegenError::ProtocolMismatch {
                found: self.device.protocol_version.clone(),
                expected: PROTOCOL_VERSION.to_string(),
            });
        }
        self.device
            .validate()
            .map_err(|e| CodegenError::InvalidDevice(e.to_string()))
    }

    pub fn tick_ms(&self) -> u64 {
        u64::from(self.device.tick_interval_millisecs)
    }

    pub fn led_count(&self) -> u32 {
        self.device.led_count
    }

    pub fn packet_bits(&self) -> u64 {
        self.device.packet_bits()
    }
}
