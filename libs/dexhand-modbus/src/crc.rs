//! CRC16/MODBUS checksum engine
//!
//! Polynomial 0xA001 (reflected 0x8005), initial value 0xFFFF. Every frame on
//! the bus carries this checksum over all preceding bytes, transmitted low
//! byte first - the only little-endian field in the protocol.

/// Calculate the Modbus CRC16 over a byte sequence.
///
/// Pure and deterministic; must stay bit-identical to the device firmware so
/// frames interoperate with real hardware.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC16 of the current frame contents, low byte first.
#[inline]
pub fn append_crc(frame: &mut Vec<u8>) {
    let crc = crc16(frame);
    frame.extend_from_slice(&crc.to_le_bytes());
}

/// Verify the trailing two bytes of a frame against the recomputed CRC16.
///
/// Returns `(expected, received)` on mismatch so the caller can report both
/// values. Frames shorter than the checksum itself never verify.
pub fn check_crc(frame: &[u8]) -> std::result::Result<(), (u16, u16)> {
    if frame.len() < 2 {
        return Err((0, 0));
    }
    let (payload, tail) = frame.split_at(frame.len() - 2);
    let received = u16::from_le_bytes([tail[0], tail[1]]);
    let expected = crc16(payload);
    if expected == received {
        Ok(())
    } else {
        Err((expected, received))
    }
}
