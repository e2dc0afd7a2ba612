//! In-memory hand controller for tests and offline bring-up
//!
//! [`SimulatedHand`] speaks the same raw frames as the wire: requests are
//! CRC-checked, replies come back CRC-stamped, and a frame addressed to a
//! different device gets silence, exactly like a shared RS-485 bus. Motion
//! is instantaneous; a commanded axis reports initialized on the next status
//! read and target writes are mirrored straight into the matching telemetry
//! block.
//!
//! The write log and the fault-injection knobs exist for tests: the log
//! records every accepted write in bus order, and the knobs corrupt exactly
//! one following reply.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::constants::{AXIS_COUNT, MAX_READ_REGISTERS};
use crate::crc::{append_crc, check_crc};
use crate::error::{HandError, Result};
use crate::registers::{
    CURRENT_DRAW_BASE, CURRENT_FAULTS, CURRENT_POSITION_BASE, CURRENT_SPEED_BASE, FAULT_RESET,
    INIT_COMMAND, INIT_STATUS, SYSTEM_RESTART, TARGET_POSITION_BASE, TARGET_SPEED_BASE,
};
use crate::transport::HandTransport;

/// One accepted register write, in bus order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Function code that carried the write (0x06 or 0x10)
    pub function: u8,
    pub address: u16,
    pub values: Vec<u16>,
}

#[derive(Debug, Default)]
struct FaultInjection {
    corrupt_next_crc: bool,
    truncate_next: bool,
    drop_next: bool,
}

/// Simulated hand controller behind the [`HandTransport`] seam
pub struct SimulatedHand {
    device_id: u8,
    registers: Mutex<HashMap<u16, u16>>,
    writes: Mutex<Vec<WriteRecord>>,
    injection: Mutex<FaultInjection>,
    open: Mutex<bool>,
}

impl SimulatedHand {
    /// New powered-on controller at the given bus address.
    pub fn new(device_id: u8) -> Self {
        let mut bank = HashMap::new();
        // Idle current draw noise so telemetry reads look alive
        let mut rng = rand::thread_rng();
        for i in 0..AXIS_COUNT as u16 {
            bank.insert(CURRENT_DRAW_BASE + i, rng.gen_range(40..90));
        }

        Self {
            device_id,
            registers: Mutex::new(bank),
            writes: Mutex::new(Vec::new()),
            injection: Mutex::new(FaultInjection::default()),
            open: Mutex::new(true),
        }
    }

    // ========================================================================
    // Test Accessors
    // ========================================================================

    /// Stage a register value directly, bypassing the bus.
    pub fn set_register(&self, address: u16, value: u16) {
        self.registers.lock().insert(address, value);
    }

    /// Read a register directly, bypassing the bus.
    pub fn get_register(&self, address: u16) -> Option<u16> {
        self.registers.lock().get(&address).copied()
    }

    /// Accepted writes so far, oldest first.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }

    /// Corrupt the CRC of the next reply.
    pub fn corrupt_next_crc(&self) {
        self.injection.lock().corrupt_next_crc = true;
    }

    /// Cut the next reply below the minimum frame length.
    pub fn truncate_next(&self) {
        self.injection.lock().truncate_next = true;
    }

    /// Swallow the next reply entirely.
    pub fn drop_next(&self) {
        self.injection.lock().drop_next = true;
    }

    // ========================================================================
    // Frame Handling
    // ========================================================================

    /// Decode one request frame; `None` means bus silence.
    fn handle_frame(&self, frame: &[u8]) -> Option<Vec<u8>> {
        if frame.len() < 8 || check_crc(frame).is_err() {
            debug!("sim: ignoring malformed frame ({}B)", frame.len());
            return None;
        }
        if frame[0] != self.device_id {
            // Addressed to someone else on the bus
            return None;
        }

        let function = frame[1];
        let address = u16::from_be_bytes([frame[2], frame[3]]);
        let body = &frame[4..frame.len() - 2];

        match function {
            0x03 => self.read_holding_registers(address, body),
            0x06 => self.write_single_register(address, body),
            0x10 => self.write_multiple_registers(address, body),
            other => Some(self.build_exception(other, 0x01)),
        }
    }

    /// Read holding registers (function 0x03)
    fn read_holding_registers(&self, start: u16, body: &[u8]) -> Option<Vec<u8>> {
        if body.len() != 2 {
            return None;
        }
        let count = u16::from_be_bytes([body[0], body[1]]);
        if count == 0 || count as usize > MAX_READ_REGISTERS {
            return Some(self.build_exception(0x03, 0x03));
        }

        let bank = self.registers.lock();
        let mut reply = vec![self.device_id, 0x03, (count * 2) as u8];
        for i in 0..count {
            let value = bank.get(&(start + i)).copied().unwrap_or(0);
            reply.extend_from_slice(&value.to_be_bytes());
        }
        append_crc(&mut reply);
        Some(reply)
    }

    /// Write single register (function 0x06)
    fn write_single_register(&self, address: u16, body: &[u8]) -> Option<Vec<u8>> {
        if body.len() != 2 {
            return None;
        }
        let value = u16::from_be_bytes([body[0], body[1]]);

        self.apply_write(address, value);
        self.writes.lock().push(WriteRecord {
            function: 0x06,
            address,
            values: vec![value],
        });

        // Echo of the request
        let mut reply = vec![self.device_id, 0x06];
        reply.extend_from_slice(&address.to_be_bytes());
        reply.extend_from_slice(&value.to_be_bytes());
        append_crc(&mut reply);
        Some(reply)
    }

    /// Write multiple registers (function 0x10)
    fn write_multiple_registers(&self, start: u16, body: &[u8]) -> Option<Vec<u8>> {
        if body.len() < 3 {
            return None;
        }
        let count = u16::from_be_bytes([body[0], body[1]]);
        let byte_count = body[2] as usize;
        let data = &body[3..];
        if byte_count != 2 * count as usize || data.len() != byte_count {
            return Some(self.build_exception(0x10, 0x03));
        }

        let values: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        for (i, value) in values.iter().enumerate() {
            self.apply_write(start + i as u16, *value);
        }
        self.writes.lock().push(WriteRecord {
            function: 0x10,
            address: start,
            values,
        });

        let mut reply = vec![self.device_id, 0x10];
        reply.extend_from_slice(&start.to_be_bytes());
        reply.extend_from_slice(&count.to_be_bytes());
        append_crc(&mut reply);
        Some(reply)
    }

    /// Store one register and run its controller side effect.
    fn apply_write(&self, address: u16, value: u16) {
        let mut bank = self.registers.lock();
        bank.insert(address, value);

        match address {
            INIT_COMMAND => {
                // Each commanded axis finishes instantly and reports
                // initialized (field 0b01)
                let mut status = bank.get(&INIT_STATUS).copied().unwrap_or(0);
                for i in 0..AXIS_COUNT as u16 {
                    if (value >> (i * 2)) & 0b11 != 0 {
                        status &= !(0b11 << (i * 2));
                        status |= 0b01 << (i * 2);
                    }
                }
                bank.insert(INIT_STATUS, status);
            }
            FAULT_RESET if value == 1 => {
                bank.insert(CURRENT_FAULTS, 0);
            }
            SYSTEM_RESTART if value == 1 => {
                // Reboot loses the initialization state
                bank.insert(INIT_STATUS, 0);
            }
            addr if block_offset(addr, TARGET_POSITION_BASE).is_some() => {
                let offset = addr - TARGET_POSITION_BASE;
                bank.insert(CURRENT_POSITION_BASE + offset, value);
            }
            addr if block_offset(addr, TARGET_SPEED_BASE).is_some() => {
                let offset = addr - TARGET_SPEED_BASE;
                bank.insert(CURRENT_SPEED_BASE + offset, value);
            }
            _ => {}
        }
    }

    fn build_exception(&self, function: u8, code: u8) -> Vec<u8> {
        let mut reply = vec![self.device_id, function | 0x80, code];
        append_crc(&mut reply);
        reply
    }
}

/// Offset of `address` within the six-register block at `base`, if inside.
fn block_offset(address: u16, base: u16) -> Option<u16> {
    if (base..base + AXIS_COUNT as u16).contains(&address) {
        Some(address - base)
    } else {
        None
    }
}

#[async_trait]
impl HandTransport for SimulatedHand {
    async fn transact(&self, request: &[u8]) -> Result<Vec<u8>> {
        if !*self.open.lock() {
            return Err(HandError::connection("not connected"));
        }

        let reply = self.handle_frame(request);

        let injection = {
            let mut guard = self.injection.lock();
            std::mem::take(&mut *guard)
        };
        if injection.drop_next {
            return Ok(Vec::new());
        }

        let mut reply = match reply {
            Some(reply) => reply,
            None => return Ok(Vec::new()),
        };
        if injection.truncate_next {
            reply.truncate(3);
        }
        if injection.corrupt_next_crc {
            if let Some(last) = reply.last_mut() {
                *last ^= 0xFF;
            }
        }
        Ok(reply)
    }

    async fn is_open(&self) -> bool {
        *self.open.lock()
    }

    async fn close(&self) -> Result<()> {
        *self.open.lock() = false;
        Ok(())
    }
}
