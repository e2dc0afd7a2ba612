//! Protocol constants
//!
//! Frame-size limits follow the Modbus specification: the RS485 ADU is capped
//! at 256 bytes, so register counts are bounded by what fits in one PDU.

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Minimum valid reply frame
///
/// Address(1) + Function(1) + at least one payload byte(1) + CRC(2) = 5 bytes.
/// Anything shorter is rejected before the CRC is even computed.
pub const MIN_RESPONSE_LEN: usize = 5;

/// Receive buffer size for one exchange
///
/// The largest reply this driver can provoke is the 0x3F-register history
/// fault read: 1 + 1 + 1 + 63 x 2 + 2 = 131 bytes. 256 bytes matches the RTU
/// ADU ceiling and leaves headroom.
pub const RESPONSE_BUFFER_SIZE: usize = 256;

// ============================================================================
// Register Operation Limits
// ============================================================================

/// Maximum register count for FC 0x03 (Read Holding Registers)
///
/// Response PDU: function(1) + byte count(1) + N x 2 <= 253, so N <= 125.
pub const MAX_READ_REGISTERS: usize = 125;

/// Maximum register count for FC 0x10 (Write Multiple Registers)
///
/// Request PDU: function(1) + address(2) + count(2) + byte count(1) + N x 2
/// <= 253, so N <= 123.
pub const MAX_WRITE_REGISTERS: usize = 123;

// ============================================================================
// Device Constants
// ============================================================================

/// Actuated axes per hand unit
pub const AXIS_COUNT: usize = 6;

/// Highest valid Modbus slave address
pub const MAX_DEVICE_ADDRESS: u8 = 247;

/// Registers held by the history fault log
pub const HISTORY_FAULT_REGISTERS: u16 = 0x3F;

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_constants() {
        assert_eq!(MIN_RESPONSE_LEN, 5);
        assert_eq!(RESPONSE_BUFFER_SIZE, 256);
    }

    #[test]
    fn test_register_limits() {
        // Read limit: response PDU must fit in 253 bytes
        let read_pdu = 1 + 1 + MAX_READ_REGISTERS * 2;
        assert!(read_pdu <= 253);
        assert_eq!(MAX_READ_REGISTERS, 125);

        // Write limit: request PDU must fit in 253 bytes
        let write_pdu = 1 + 2 + 2 + 1 + MAX_WRITE_REGISTERS * 2;
        assert!(write_pdu <= 253);
        assert_eq!(MAX_WRITE_REGISTERS, 123);
    }

    #[test]
    fn test_history_fault_read_fits_buffer() {
        let frame = 1 + 1 + 1 + HISTORY_FAULT_REGISTERS as usize * 2 + 2;
        assert!(frame <= RESPONSE_BUFFER_SIZE);
    }
}
