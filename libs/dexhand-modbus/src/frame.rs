//! Request frame construction
//!
//! A request is one of three typed variants, one per supported function code.
//! Register count and byte count for multi-writes are always derived from the
//! value list, so a declared-count/list-length mismatch cannot reach the wire.
//! All validation happens before a single byte is emitted.
//!
//! Wire layout (big-endian except the trailing CRC, which is low byte first):
//!
//! ```text
//! [Device:1][Function:1][Register:2]<payload>[CRC16:2]
//!   0x03 payload: [Count:2]
//!   0x06 payload: [Value:2]
//!   0x10 payload: [Count:2][ByteCount:1][Value:2] x Count
//! ```

use crate::constants::{MAX_DEVICE_ADDRESS, MAX_READ_REGISTERS, MAX_WRITE_REGISTERS};
use crate::crc::append_crc;
use crate::error::{HandError, Result};

/// Function codes understood by the hand controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionCode {
    /// FC 0x03 - read a block of holding registers
    ReadHoldingRegisters = 0x03,
    /// FC 0x06 - write one holding register
    WriteSingleRegister = 0x06,
    /// FC 0x10 - write a consecutive block of holding registers
    WriteMultipleRegisters = 0x10,
}

impl FunctionCode {
    /// Wire value of the function code
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = HandError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x03 => Ok(FunctionCode::ReadHoldingRegisters),
            0x06 => Ok(FunctionCode::WriteSingleRegister),
            0x10 => Ok(FunctionCode::WriteMultipleRegisters),
            other => Err(HandError::invalid_command(format!(
                "unsupported function code 0x{other:02X}"
            ))),
        }
    }
}

impl std::fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}", self.code())
    }
}

/// One typed Modbus request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read `count` holding registers starting at `address`
    ReadHolding { address: u16, count: u16 },
    /// Write `value` to the single register at `address`
    WriteSingle { address: u16, value: u16 },
    /// Write `values` to the consecutive block starting at `address`
    WriteMultiple { address: u16, values: Vec<u16> },
}

impl Request {
    /// Read a single holding register.
    pub fn read(address: u16) -> Self {
        Request::ReadHolding { address, count: 1 }
    }

    /// Read a block of holding registers.
    pub fn read_many(address: u16, count: u16) -> Self {
        Request::ReadHolding { address, count }
    }

    /// Write one register.
    pub fn write(address: u16, value: u16) -> Self {
        Request::WriteSingle { address, value }
    }

    /// Write a consecutive register block.
    pub fn write_many(address: u16, values: Vec<u16>) -> Self {
        Request::WriteMultiple { address, values }
    }

    /// Function code this request is sent with
    pub fn function_code(&self) -> FunctionCode {
        match self {
            Request::ReadHolding { .. } => FunctionCode::ReadHoldingRegisters,
            Request::WriteSingle { .. } => FunctionCode::WriteSingleRegister,
            Request::WriteMultiple { .. } => FunctionCode::WriteMultipleRegisters,
        }
    }

    /// Target register address
    pub fn address(&self) -> u16 {
        match self {
            Request::ReadHolding { address, .. }
            | Request::WriteSingle { address, .. }
            | Request::WriteMultiple { address, .. } => *address,
        }
    }

    /// Encode into a wire-ready RTU frame for the given device address.
    ///
    /// Validates the request first; nothing is emitted for an invalid one.
    pub fn encode(&self, device: u8) -> Result<Vec<u8>> {
        if device > MAX_DEVICE_ADDRESS {
            return Err(HandError::invalid_command(format!(
                "device address {device} exceeds {MAX_DEVICE_ADDRESS}"
            )));
        }

        let mut frame = match self {
            Request::ReadHolding { address, count } => {
                if *count == 0 || *count as usize > MAX_READ_REGISTERS {
                    return Err(HandError::invalid_command(format!(
                        "read count {count} outside 1..={MAX_READ_REGISTERS}"
                    )));
                }
                let mut frame = Vec::with_capacity(8);
                frame.push(device);
                frame.push(FunctionCode::ReadHoldingRegisters.code());
                frame.extend_from_slice(&address.to_be_bytes());
                frame.extend_from_slice(&count.to_be_bytes());
                frame
            }
            Request::WriteSingle { address, value } => {
                let mut frame = Vec::with_capacity(8);
                frame.push(device);
                frame.push(FunctionCode::WriteSingleRegister.code());
                frame.extend_from_slice(&address.to_be_bytes());
                frame.extend_from_slice(&value.to_be_bytes());
                frame
            }
            Request::WriteMultiple { address, values } => {
                if values.is_empty() {
                    return Err(HandError::invalid_command(
                        "write multiple requires at least one value",
                    ));
                }
                if values.len() > MAX_WRITE_REGISTERS {
                    return Err(HandError::invalid_command(format!(
                        "write count {} exceeds {MAX_WRITE_REGISTERS}",
                        values.len()
                    )));
                }
                let count = values.len() as u16;
                let mut frame = Vec::with_capacity(9 + values.len() * 2);
                frame.push(device);
                frame.push(FunctionCode::WriteMultipleRegisters.code());
                frame.extend_from_slice(&address.to_be_bytes());
                frame.extend_from_slice(&count.to_be_bytes());
                frame.push((count * 2) as u8);
                for value in values {
                    frame.extend_from_slice(&value.to_be_bytes());
                }
                frame
            }
        };

        append_crc(&mut frame);
        Ok(frame)
    }
}
