//! Axis-oriented command dispatcher for one hand
//!
//! [`HandClient`] turns domain operations into single request/response
//! exchanges on its transport. Every argument is validated before any bytes
//! are sent: a bad axis, mode, or list shape fails with
//! [`HandError::InvalidCommand`] and the wire never sees the request.
//!
//! Batched setters drive the consecutive register block starting at F1. The
//! axis list declares which fingers the caller intends to move and fixes the
//! write length; values always land from the block base upward, which is how
//! the controller defines its multi-register map.
//!
//! No operation retries on failure. Every error is returned to the caller,
//! who owns the resend policy; [`HandError::is_retryable`] marks the kinds
//! where a plain resend can help.

use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::{AXIS_COUNT, HISTORY_FAULT_REGISTERS, MAX_DEVICE_ADDRESS};
use crate::error::{HandError, Result};
use crate::frame::{FunctionCode, Request};
use crate::registers::{
    self, Axis, InitMode, InitStatus, CURRENT_DRAW_BASE, CURRENT_FAULTS, CURRENT_POSITION_BASE,
    CURRENT_SPEED_BASE, FAULT_RESET, HISTORY_FAULTS, INIT_COMMAND, INIT_STATUS, SAVE_PARAMETERS,
    SYSTEM_RESTART, TARGET_FORCE_BASE, TARGET_POSITION_BASE, TARGET_SPEED_BASE, UART_CONFIG,
};
use crate::response::{parse_response, Response};
use crate::transport::HandTransport;

/// UART settings block written verbatim to the controller
///
/// Field values are the controller's own codes, not engineering units;
/// consult the manual's baud and parity tables. The new settings take
/// effect after [`HandClient::save_parameters`] and a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub modbus_id: u16,
    pub baud_code: u16,
    pub stop_bits: u16,
    pub parity_code: u16,
}

impl UartConfig {
    /// Register block in controller order.
    fn to_registers(self) -> [u16; 4] {
        [
            self.modbus_id,
            self.baud_code,
            self.stop_bits,
            self.parity_code,
        ]
    }
}

/// Command dispatcher bound to one device address on one transport
pub struct HandClient {
    transport: Arc<dyn HandTransport>,
    device_id: u8,
}

impl HandClient {
    /// Bind a client to a transport and bus address.
    ///
    /// Address 0 is the broadcast address and never answers, so it is
    /// rejected along with everything above the RTU maximum.
    pub fn new(transport: Arc<dyn HandTransport>, device_id: u8) -> Result<Self> {
        if device_id == 0 || device_id > MAX_DEVICE_ADDRESS {
            return Err(HandError::invalid_command(format!(
                "device address {device_id} outside [1,{MAX_DEVICE_ADDRESS}]"
            )));
        }
        Ok(Self {
            transport,
            device_id,
        })
    }

    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    pub fn transport(&self) -> &Arc<dyn HandTransport> {
        &self.transport
    }

    // ========================================================================
    // Register Operations
    // ========================================================================

    /// One full exchange: encode, transact, decode.
    async fn execute(&self, request: Request) -> Result<Response> {
        let expected = request.function_code();
        let frame = request.encode(self.device_id)?;
        let raw = self.transport.transact(&frame).await?;
        parse_response(&raw, expected)
    }

    /// One exchange from a raw function code, for scripting and bench work.
    ///
    /// The code is validated before any bytes are built: anything other than
    /// 0x03/0x06/0x10 is [`HandError::InvalidCommand`]. Data is interpreted
    /// per code - `[count]` for a read (defaulting to 1 when empty),
    /// `[value]` for a single write, the full value block for a multi-write.
    pub async fn execute_raw(
        &self,
        function: u8,
        address: u16,
        data: &[u16],
    ) -> Result<Response> {
        let request = match FunctionCode::try_from(function)? {
            FunctionCode::ReadHoldingRegisters => Request::ReadHolding {
                address,
                count: data.first().copied().unwrap_or(1),
            },
            FunctionCode::WriteSingleRegister => {
                let value = data.first().copied().ok_or_else(|| {
                    HandError::invalid_command("single write requires a value")
                })?;
                Request::WriteSingle { address, value }
            }
            FunctionCode::WriteMultipleRegisters => Request::WriteMultiple {
                address,
                values: data.to_vec(),
            },
        };
        self.execute(request).await
    }

    /// Read `count` holding registers starting at `address`.
    pub async fn read_holding(&self, address: u16, count: u16) -> Result<Vec<u16>> {
        let values = self
            .execute(Request::read_many(address, count))
            .await?
            .into_values()?;
        if values.len() != count as usize {
            return Err(HandError::invalid_response(format!(
                "requested {count} registers, device returned {}",
                values.len()
            )));
        }
        Ok(values)
    }

    /// Read one holding register.
    pub async fn read_register(&self, address: u16) -> Result<u16> {
        let values = self.read_holding(address, 1).await?;
        values
            .first()
            .copied()
            .ok_or_else(|| HandError::invalid_response("empty register read"))
    }

    /// Write one holding register.
    pub async fn write_register(&self, address: u16, value: u16) -> Result<()> {
        self.execute(Request::write(address, value)).await?;
        Ok(())
    }

    /// Write a consecutive register block.
    pub async fn write_registers(&self, address: u16, values: &[u16]) -> Result<()> {
        self.execute(Request::write_many(address, values.to_vec()))
            .await?;
        Ok(())
    }

    /// Read one six-axis telemetry block into per-axis order.
    async fn read_block(&self, base: u16) -> Result<[u16; AXIS_COUNT]> {
        let values = self.read_holding(base, AXIS_COUNT as u16).await?;
        values
            .try_into()
            .map_err(|_| HandError::invalid_response("telemetry block length mismatch"))
    }

    /// Shared shape check for the batched setters.
    fn check_batch(axes: &[Axis], values: &[u16], what: &str) -> Result<()> {
        if axes.is_empty() {
            return Err(HandError::invalid_command("axis list is empty"));
        }
        if axes.len() != values.len() {
            return Err(HandError::invalid_command(format!(
                "{what} list length {} disagrees with {} axes",
                values.len(),
                axes.len()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Motion Targets
    // ========================================================================

    /// Set one axis's target position.
    pub async fn set_position(&self, axis: Axis, value: u16) -> Result<()> {
        self.write_register(registers::target_position(axis), value)
            .await
    }

    /// Set one axis's target speed.
    pub async fn set_speed(&self, axis: Axis, value: u16) -> Result<()> {
        self.write_register(registers::target_speed(axis), value)
            .await
    }

    /// Set one axis's target force limit.
    pub async fn set_force(&self, axis: Axis, value: u16) -> Result<()> {
        self.write_register(registers::target_force(axis), value)
            .await
    }

    /// Set target positions for the given axes in one block write.
    pub async fn set_all_positions(&self, axes: &[Axis], positions: &[u16]) -> Result<()> {
        Self::check_batch(axes, positions, "position")?;
        self.write_registers(TARGET_POSITION_BASE, positions).await
    }

    /// Set target speeds for the given axes in one block write.
    pub async fn set_all_speeds(&self, axes: &[Axis], speeds: &[u16]) -> Result<()> {
        Self::check_batch(axes, speeds, "speed")?;
        self.write_registers(TARGET_SPEED_BASE, speeds).await
    }

    /// Set target force limits for the given axes in one block write.
    pub async fn set_all_forces(&self, axes: &[Axis], forces: &[u16]) -> Result<()> {
        Self::check_batch(axes, forces, "force")?;
        self.write_registers(TARGET_FORCE_BASE, forces).await
    }

    /// Stage speeds and force limits, then start the move.
    ///
    /// Exactly three block writes in fixed order: speed, force, position.
    /// Limits are on the controller before it sees the new position, so the
    /// move never starts under stale limits. All list shapes are checked
    /// before the first write; the first failed write aborts the rest.
    pub async fn set_all(
        &self,
        axes: &[Axis],
        positions: &[u16],
        speeds: &[u16],
        forces: &[u16],
    ) -> Result<()> {
        Self::check_batch(axes, speeds, "speed")?;
        Self::check_batch(axes, forces, "force")?;
        Self::check_batch(axes, positions, "position")?;

        self.write_registers(TARGET_SPEED_BASE, speeds).await?;
        self.write_registers(TARGET_FORCE_BASE, forces).await?;
        self.write_registers(TARGET_POSITION_BASE, positions).await?;
        Ok(())
    }

    // ========================================================================
    // Telemetry
    // ========================================================================

    /// Current position of one axis.
    pub async fn position(&self, axis: Axis) -> Result<u16> {
        self.read_register(registers::current_position(axis)).await
    }

    /// Current speed of one axis.
    pub async fn speed(&self, axis: Axis) -> Result<u16> {
        self.read_register(registers::current_speed(axis)).await
    }

    /// Current draw of one axis.
    pub async fn current_draw(&self, axis: Axis) -> Result<u16> {
        self.read_register(registers::current_draw(axis)).await
    }

    /// Current positions of all six axes.
    pub async fn all_positions(&self) -> Result<[u16; AXIS_COUNT]> {
        self.read_block(CURRENT_POSITION_BASE).await
    }

    /// Current speeds of all six axes.
    pub async fn all_speeds(&self) -> Result<[u16; AXIS_COUNT]> {
        self.read_block(CURRENT_SPEED_BASE).await
    }

    /// Current draw of all six axes.
    pub async fn all_current_draws(&self) -> Result<[u16; AXIS_COUNT]> {
        self.read_block(CURRENT_DRAW_BASE).await
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Command all six axes to initialize with the same mode.
    pub async fn initialize(&self, mode: InitMode) -> Result<()> {
        let word = registers::pack_all_axes(mode);
        debug!("init all axes: 0x{:04X}", word);
        self.write_register(INIT_COMMAND, word).await
    }

    /// Command one axis to initialize, leaving the others uncommanded.
    pub async fn initialize_axis(&self, axis: Axis, mode: InitMode) -> Result<()> {
        let word = registers::pack_single_axis(axis, mode);
        debug!("init {}: 0x{:04X}", axis, word);
        self.write_register(INIT_COMMAND, word).await
    }

    /// Decode the per-axis initialization status word.
    pub async fn initialization_status(&self) -> Result<[InitStatus; AXIS_COUNT]> {
        let word = self.read_register(INIT_STATUS).await?;
        Ok(registers::unpack_init_status(word))
    }

    // ========================================================================
    // Faults and Maintenance
    // ========================================================================

    /// Active fault word.
    pub async fn current_faults(&self) -> Result<u16> {
        self.read_register(CURRENT_FAULTS).await
    }

    /// Full history fault log.
    pub async fn history_faults(&self) -> Result<Vec<u16>> {
        self.read_holding(HISTORY_FAULTS, HISTORY_FAULT_REGISTERS)
            .await
    }

    /// Clear the active fault word.
    pub async fn reset_faults(&self) -> Result<()> {
        debug!("fault reset");
        self.write_register(FAULT_RESET, 1).await
    }

    /// Reboot the controller. Initialization state is lost.
    pub async fn restart_system(&self) -> Result<()> {
        info!("restart requested (device {})", self.device_id);
        self.write_register(SYSTEM_RESTART, 1).await
    }

    /// Write new UART settings.
    ///
    /// The block is staged in volatile memory; call
    /// [`save_parameters`](Self::save_parameters) and restart to apply.
    pub async fn set_uart_config(&self, config: UartConfig) -> Result<()> {
        info!(
            "UART reconfig: id={} baud_code={}",
            config.modbus_id, config.baud_code
        );
        self.write_registers(UART_CONFIG, &config.to_registers())
            .await
    }

    /// Persist the staged configuration block.
    pub async fn save_parameters(&self) -> Result<()> {
        self.write_register(SAVE_PARAMETERS, 1).await
    }
}
