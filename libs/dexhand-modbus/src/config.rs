//! Serial channel configuration
//!
//! One [`SerialConfig`] describes one hand on one port. Everything except
//! the device path has a default matching the controller's factory UART
//! settings (115200 8N1, device address 1, 1 s request timeout).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_DEVICE_ADDRESS;
use crate::error::{HandError, Result};

/// Parity setting for the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    #[serde(alias = "N", alias = "none")]
    None,
    #[serde(alias = "E", alias = "even")]
    Even,
    #[serde(alias = "O", alias = "odd")]
    Odd,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Even => tokio_serial::Parity::Even,
            Parity::Odd => tokio_serial::Parity::Odd,
        }
    }
}

/// Serial port and addressing settings for one hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0`
    pub device: String,
    /// Device address on the bus
    #[serde(default = "default_modbus_id")]
    pub modbus_id: u8,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_modbus_id() -> u8 {
    1
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_timeout_ms() -> u64 {
    1000
}

impl SerialConfig {
    /// Factory settings on the given device path.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            modbus_id: default_modbus_id(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: Parity::default(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings the port or the bus cannot carry.
    pub fn validate(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(HandError::config("device path is empty"));
        }
        if self.modbus_id == 0 || self.modbus_id > MAX_DEVICE_ADDRESS {
            return Err(HandError::config(format!(
                "modbus_id {} outside [1,{MAX_DEVICE_ADDRESS}]",
                self.modbus_id
            )));
        }
        if self.baud_rate == 0 {
            return Err(HandError::config("baud_rate must be non-zero"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(HandError::config(format!(
                "data_bits {} outside [5,8]",
                self.data_bits
            )));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(HandError::config(format!(
                "stop_bits {} outside [1,2]",
                self.stop_bits
            )));
        }
        if self.timeout_ms == 0 {
            return Err(HandError::config("timeout_ms must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn serial_data_bits(&self) -> tokio_serial::DataBits {
        match self.data_bits {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            _ => tokio_serial::DataBits::Eight,
        }
    }

    pub(crate) fn serial_stop_bits(&self) -> tokio_serial::StopBits {
        match self.stop_bits {
            2 => tokio_serial::StopBits::Two,
            _ => tokio_serial::StopBits::One,
        }
    }
}
