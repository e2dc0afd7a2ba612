//! handsrv - control service for six-axis dexterous hands
//!
//! Thin operations layer over the `dexhand-modbus` driver: loads the hand
//! roster from YAML, opens one serial session per hand, and exposes the
//! driver's commands as CLI subcommands. Multi-hand operations run one task
//! per session and join them all before reporting.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;

pub use config::{HandChannelConfig, HandsrvConfig};
pub use error::{HandsrvError, Result};
pub use manager::{HandManager, HandSession};

/// Service identity
pub const SERVICE_NAME: &str = "handsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
