//! Register map of the DH5 hand controller
//!
//! Pure address arithmetic over 1-indexed axes. Finger assignment:
//! F1 thumb rotation, F2 index, F3 middle, F4 ring, F5 little, F6 thumb
//! pitch. Typical position travel in encoder counts: F1 30-934, F2 10-1771,
//! F3 30-1731, F4 30-1701, F5 30-1771, F6 30-938 (per-unit calibration
//! varies by a few counts).
//!
//! Two layout quirks to preserve exactly:
//! - The single-axis target-force registers stride by 0x10 per axis; batched
//!   force writes still use the consecutive block at the 0x0107 base.
//! - Init command and init status pack one 2-bit field per axis into a
//!   single word, axis n in bits [2(n-1), 2(n-1)+1].

use crate::constants::AXIS_COUNT;
use crate::error::{HandError, Result};

// ============================================================================
// Register Addresses
// ============================================================================

/// Initialization command word (all six 2-bit mode fields)
pub const INIT_COMMAND: u16 = 0x0100;
/// Target position block base, one register per axis
pub const TARGET_POSITION_BASE: u16 = 0x0101;
/// Target force block base; single-axis stride is 0x10
pub const TARGET_FORCE_BASE: u16 = 0x0107;
/// Target speed block base, one register per axis
pub const TARGET_SPEED_BASE: u16 = 0x010D;
/// Initialization status word (read)
pub const INIT_STATUS: u16 = 0x0200;
/// Current position block base (read)
pub const CURRENT_POSITION_BASE: u16 = 0x0207;
/// Current speed block base (read)
pub const CURRENT_SPEED_BASE: u16 = 0x020D;
/// Current draw block base (read)
pub const CURRENT_DRAW_BASE: u16 = 0x0213;
/// Active fault word (read)
pub const CURRENT_FAULTS: u16 = 0x021F;
/// Save-parameters flag; write 1 to persist the configuration block
pub const SAVE_PARAMETERS: u16 = 0x0300;
/// UART configuration block: [modbus id, baud code, stop bits, parity code]
pub const UART_CONFIG: u16 = 0x0302;
/// Fault reset; write 1 to clear the active fault word
pub const FAULT_RESET: u16 = 0x0501;
/// System restart; write 1 to reboot the controller
pub const SYSTEM_RESTART: u16 = 0x0503;
/// History fault log base (read, 0x3F registers)
pub const HISTORY_FAULTS: u16 = 0x0B00;

// ============================================================================
// Axis
// ============================================================================

/// One of the six actuated axes, validated to [1,6] at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Axis(u8);

impl Axis {
    pub const F1: Axis = Axis(1);
    pub const F2: Axis = Axis(2);
    pub const F3: Axis = Axis(3);
    pub const F4: Axis = Axis(4);
    pub const F5: Axis = Axis(5);
    pub const F6: Axis = Axis(6);

    /// Validate a 1-indexed axis number.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=AXIS_COUNT as u8).contains(&number) {
            Ok(Axis(number))
        } else {
            Err(HandError::invalid_command(format!(
                "axis {number} outside [1,{AXIS_COUNT}]"
            )))
        }
    }

    /// All six axes in order.
    pub fn all() -> [Axis; AXIS_COUNT] {
        [
            Axis::F1,
            Axis::F2,
            Axis::F3,
            Axis::F4,
            Axis::F5,
            Axis::F6,
        ]
    }

    /// 1-indexed axis number
    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-based offset used in address arithmetic
    #[inline]
    fn index(self) -> u16 {
        (self.0 - 1) as u16
    }

    /// Bit position of this axis's 2-bit field in the init words
    #[inline]
    fn field_shift(self) -> u16 {
        self.index() * 2
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Target position register for an axis
#[inline]
pub fn target_position(axis: Axis) -> u16 {
    TARGET_POSITION_BASE + axis.index()
}

/// Target speed register for an axis
#[inline]
pub fn target_speed(axis: Axis) -> u16 {
    TARGET_SPEED_BASE + axis.index()
}

/// Target force register for an axis (0x10 stride)
#[inline]
pub fn target_force(axis: Axis) -> u16 {
    TARGET_FORCE_BASE + axis.index() * 0x10
}

/// Current position register for an axis
#[inline]
pub fn current_position(axis: Axis) -> u16 {
    CURRENT_POSITION_BASE + axis.index()
}

/// Current speed register for an axis
#[inline]
pub fn current_speed(axis: Axis) -> u16 {
    CURRENT_SPEED_BASE + axis.index()
}

/// Current draw register for an axis
#[inline]
pub fn current_draw(axis: Axis) -> u16 {
    CURRENT_DRAW_BASE + axis.index()
}

// ============================================================================
// Initialization Modes and Status
// ============================================================================

/// Initialization command mode, one 2-bit field per axis
///
/// 0b00 is reserved (no command for that axis) and is rejected as an
/// explicit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InitMode {
    /// Drive to the closed end stop
    Close = 0b01,
    /// Drive to the open end stop
    Open = 0b10,
    /// Sweep the full travel to find the stroke
    FindStroke = 0b11,
}

impl InitMode {
    /// Field value within an init word
    #[inline]
    pub fn bits(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u8> for InitMode {
    type Error = HandError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0b01 => Ok(InitMode::Close),
            0b10 => Ok(InitMode::Open),
            0b11 => Ok(InitMode::FindStroke),
            other => Err(HandError::invalid_command(format!(
                "init mode 0b{other:02b} outside {{01,10,11}}"
            ))),
        }
    }
}

/// Per-axis initialization state decoded from the status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    NotInitialized,
    Initialized,
    Initializing,
}

impl InitStatus {
    /// Decode one 2-bit status field: 01 initialized, 10 initializing,
    /// anything else not initialized.
    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b01 => InitStatus::Initialized,
            0b10 => InitStatus::Initializing,
            _ => InitStatus::NotInitialized,
        }
    }
}

impl std::fmt::Display for InitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InitStatus::NotInitialized => "not initialized",
            InitStatus::Initialized => "initialized",
            InitStatus::Initializing => "initializing",
        };
        f.write_str(s)
    }
}

/// Pack the same mode into all six axis fields.
pub fn pack_all_axes(mode: InitMode) -> u16 {
    let mut word = 0u16;
    for axis in Axis::all() {
        word |= mode.bits() << axis.field_shift();
    }
    word
}

/// Replace one axis's 2-bit field in an init word, leaving the rest intact.
pub fn merge_axis_mode(word: u16, axis: Axis, mode: InitMode) -> u16 {
    let cleared = word & !(0b11 << axis.field_shift());
    cleared | (mode.bits() << axis.field_shift())
}

/// Init word commanding a single axis; all other fields stay 0b00 (no
/// command).
pub fn pack_single_axis(axis: Axis, mode: InitMode) -> u16 {
    merge_axis_mode(0, axis, mode)
}

/// Decode the init status word into per-axis states.
pub fn unpack_init_status(word: u16) -> [InitStatus; AXIS_COUNT] {
    let mut status = [InitStatus::NotInitialized; AXIS_COUNT];
    for (i, slot) in status.iter_mut().enumerate() {
        *slot = InitStatus::from_bits(word >> (i * 2));
    }
    status
}
