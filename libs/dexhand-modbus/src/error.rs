//! Error types for the DexHand Modbus driver
//!
//! One typed error covers the whole request lifecycle. The four wire-level
//! kinds mirror the device protocol contract and stay distinct so callers can
//! choose a resend policy per kind: a `CrcCheckFailed` is line noise worth
//! retrying, an `InvalidCommand` never is.

use thiserror::Error;

/// Result type used throughout the driver
pub type Result<T> = std::result::Result<T, HandError>;

/// Driver error taxonomy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandError {
    /// Serial port not open or unreachable; raised before any bytes are sent
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request rejected before transmission: unsupported function code,
    /// axis outside [1,6], invalid init mode, or inconsistent value lists
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Reply too short or function-code echo mismatch
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reply checksum does not match the recomputed CRC16
    #[error("CRC check failed: {0}")]
    CrcCheckFailed(String),

    /// Underlying I/O failure on an open port
    #[error("IO error: {0}")]
    Io(String),

    /// Serial port layer failure (enumeration, open, configuration)
    #[error("Serial error: {0}")]
    Serial(String),

    /// Deadline elapsed while establishing a connection
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid session configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl HandError {
    pub fn connection(msg: impl Into<String>) -> Self {
        HandError::ConnectionFailed(msg.into())
    }

    pub fn invalid_command(msg: impl Into<String>) -> Self {
        HandError::InvalidCommand(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        HandError::InvalidResponse(msg.into())
    }

    pub fn crc_mismatch(expected: u16, actual: u16) -> Self {
        HandError::CrcCheckFailed(format!(
            "expected 0x{expected:04X}, received 0x{actual:04X}"
        ))
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        HandError::Timeout(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        HandError::Config(msg.into())
    }

    /// True for failures that may clear on a plain resend of the same frame
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HandError::CrcCheckFailed(_) | HandError::InvalidResponse(_) | HandError::Timeout(_)
        )
    }
}

impl From<std::io::Error> for HandError {
    fn from(err: std::io::Error) -> Self {
        HandError::Io(err.to_string())
    }
}

impl From<tokio_serial::Error> for HandError {
    fn from(err: tokio_serial::Error) -> Self {
        HandError::Serial(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    // ========================================================================
    // Error Construction Tests
    // ========================================================================

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            HandError::connection("port closed"),
            HandError::ConnectionFailed(_)
        ));
        assert!(matches!(
            HandError::invalid_command("axis 7"),
            HandError::InvalidCommand(_)
        ));
        assert!(matches!(
            HandError::invalid_response("3 bytes"),
            HandError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_crc_mismatch_formats_both_values() {
        let err = HandError::crc_mismatch(0x0A84, 0x0A85);
        let msg = err.to_string();
        assert!(msg.contains("0x0A84"));
        assert!(msg.contains("0x0A85"));
    }

    #[test]
    fn test_display_messages() {
        let err = HandError::ConnectionFailed("not open".to_string());
        assert_eq!(err.to_string(), "Connection failed: not open");

        let err = HandError::InvalidCommand("axis 0 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid command: axis 0 out of range");
    }

    // ========================================================================
    // Retry Classification Tests
    // ========================================================================

    #[test]
    fn test_retryable_classification() {
        assert!(HandError::crc_mismatch(1, 2).is_retryable());
        assert!(HandError::invalid_response("short").is_retryable());
        assert!(HandError::timeout("connect").is_retryable());

        assert!(!HandError::invalid_command("axis 9").is_retryable());
        assert!(!HandError::connection("closed").is_retryable());
        assert!(!HandError::config("bad parity").is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: HandError = io_err.into();
        assert!(matches!(err, HandError::Io(_)));
    }
}
