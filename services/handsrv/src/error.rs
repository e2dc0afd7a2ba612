//! Service-level error types
//!
//! Driver errors pass through untouched so command code can still match on
//! [`HandError`](dexhand_modbus::HandError) kinds when deciding what to
//! report; everything else is service plumbing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HandsrvError>;

#[derive(Error, Debug)]
pub enum HandsrvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(#[from] dexhand_modbus::HandError),

    #[error("Unknown hand '{0}' (not in configuration)")]
    UnknownHand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandsrvError {
    pub fn config(message: impl Into<String>) -> Self {
        HandsrvError::Config(message.into())
    }
}

impl From<figment::Error> for HandsrvError {
    fn from(error: figment::Error) -> Self {
        HandsrvError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_errors_pass_through() {
        let driver = dexhand_modbus::HandError::crc_mismatch(0x0A84, 0x0000);
        let service: HandsrvError = driver.into();
        match service {
            HandsrvError::Driver(dexhand_modbus::HandError::CrcCheckFailed(_)) => {}
            other => panic!("expected driver CRC error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_error_display() {
        let error = HandsrvError::config("no hands configured");
        assert_eq!(
            error.to_string(),
            "Configuration error: no hands configured"
        );
    }
}
