//! Response validation and decoding
//!
//! Every inbound frame goes through the same gauntlet, in a fixed order:
//! minimum length, function code echo, CRC, then payload decoding. The first
//! failing check decides the error kind, so a frame that is both short and
//! corrupt reports [`HandError::InvalidResponse`], not a CRC failure. The
//! CRC is never computed over a frame shorter than
//! [`MIN_RESPONSE_LEN`](crate::constants::MIN_RESPONSE_LEN) bytes.
//!
//! Exception replies (function code echoed with the high bit set) fail the
//! function-code check and therefore surface as `InvalidResponse`.

use crate::constants::MIN_RESPONSE_LEN;
use crate::crc::check_crc;
use crate::error::{HandError, Result};
use crate::frame::FunctionCode;

/// Decoded reply from the hand controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Register values from a holding-register read, in request order
    Values(Vec<u16>),
    /// Confirmed single or multiple write echo
    WriteAck,
}

impl Response {
    /// Extract read values, rejecting a write acknowledgement.
    pub fn into_values(self) -> Result<Vec<u16>> {
        match self {
            Response::Values(values) => Ok(values),
            Response::WriteAck => Err(HandError::invalid_response(
                "expected register values, got write acknowledgement",
            )),
        }
    }
}

/// Validate and decode a raw reply frame against the function code that was
/// sent.
pub fn parse_response(raw: &[u8], expected: FunctionCode) -> Result<Response> {
    if raw.len() < MIN_RESPONSE_LEN {
        return Err(HandError::invalid_response(format!(
            "frame too short: {} bytes, need at least {MIN_RESPONSE_LEN}",
            raw.len()
        )));
    }

    let echoed = raw[1];
    if echoed != expected.code() {
        return Err(HandError::invalid_response(format!(
            "function code echo 0x{echoed:02X}, expected {expected}"
        )));
    }

    if let Err((calculated, received)) = check_crc(raw) {
        return Err(HandError::crc_mismatch(calculated, received));
    }

    match expected {
        FunctionCode::ReadHoldingRegisters => decode_values(raw),
        FunctionCode::WriteSingleRegister | FunctionCode::WriteMultipleRegisters => {
            Ok(Response::WriteAck)
        }
    }
}

/// Decode the data section of a read reply into big-endian register values.
fn decode_values(raw: &[u8]) -> Result<Response> {
    let byte_count = raw[2] as usize;
    let data = &raw[3..raw.len() - 2];

    if byte_count != data.len() {
        return Err(HandError::invalid_response(format!(
            "byte count {byte_count} disagrees with {} data bytes",
            data.len()
        )));
    }
    if byte_count % 2 != 0 {
        return Err(HandError::invalid_response(format!(
            "odd byte count {byte_count} cannot hold 16-bit registers"
        )));
    }

    let values = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Ok(Response::Values(values))
}
