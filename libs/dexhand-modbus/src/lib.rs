//! DexHand Modbus RTU Driver
//!
//! Master-side serial driver for six-axis dexterous hand controllers
//! speaking Modbus RTU over RS-485.
//!
//! # Architecture
//!
//! This library provides:
//! - **Frame Layer**: CRC16 engine, typed requests, response decoding
//! - **Register Map**: axis addressing, init-word packing, status decoding
//! - **Transport**: serial port session with half-duplex serialization
//! - **Client**: axis-oriented commands (motion, telemetry, init, faults)
//! - **Simulator**: in-memory controller for tests and offline bring-up
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dexhand_modbus::{Axis, HandClient, SerialConfig, SerialTransport};
//!
//! # async fn demo() -> dexhand_modbus::Result<()> {
//! let config = SerialConfig::new("/dev/ttyUSB0");
//! let transport = Arc::new(SerialTransport::new(config));
//! transport.connect().await?;
//!
//! let hand = HandClient::new(transport, 1)?;
//! hand.set_speed(Axis::F2, 500).await?;
//! hand.set_position(Axis::F2, 1200).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod crc;
pub mod error;
pub mod frame;
pub mod registers;
pub mod response;
pub mod sim;
pub mod transport;

// Re-export core types
pub use client::{HandClient, UartConfig};
pub use config::{Parity, SerialConfig};
pub use constants::AXIS_COUNT;
pub use crc::crc16;
pub use error::{HandError, Result};
pub use frame::{FunctionCode, Request};
pub use registers::{Axis, InitMode, InitStatus};
pub use response::Response;
pub use sim::SimulatedHand;
pub use transport::{HandTransport, SerialTransport};
