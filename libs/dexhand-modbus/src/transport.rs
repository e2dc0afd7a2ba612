//! Serial transport for the half-duplex RTU link
//!
//! One [`SerialTransport`] owns one serial port and therefore one hand. The
//! request lock serializes complete exchanges, so callers may share a
//! transport across tasks; only one frame is ever in flight on the wire.
//! Frame end is detected by line silence: the controller streams its reply
//! back-to-back, so a 50 ms gap after at least one byte means the frame is
//! done.
//!
//! The transport returns whatever bytes arrived, including none at all when
//! the deadline passes in silence. Deciding whether those bytes form a valid
//! reply is the decoder's job, so a silent or truncated exchange surfaces
//! through [`parse_response`](crate::response::parse_response) with the
//! matching error kind.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info, trace, warn};

use crate::config::SerialConfig;
use crate::constants::RESPONSE_BUFFER_SIZE;
use crate::error::{HandError, Result};

/// Gap that marks the end of an RTU frame
const INTER_BYTE_TIMEOUT: Duration = Duration::from_millis(50);

/// Maximum backoff between reconnect attempts
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Byte-level exchange with one hand controller
#[async_trait]
pub trait HandTransport: Send + Sync {
    /// Write one request frame and collect the reply until the line goes
    /// quiet or the deadline passes. An empty reply is `Ok`; the decoder
    /// classifies it.
    async fn transact(&self, request: &[u8]) -> Result<Vec<u8>>;

    /// Whether the underlying channel is currently open
    async fn is_open(&self) -> bool;

    /// Release the underlying channel.
    async fn close(&self) -> Result<()>;
}

/// [`HandTransport`] over a physical serial port
#[derive(Debug)]
pub struct SerialTransport {
    config: SerialConfig,
    /// Open port, None until [`connect`](Self::connect) succeeds
    stream: Mutex<Option<SerialStream>>,
    /// Serializes request/response exchanges on the half-duplex line
    request_lock: Mutex<()>,
}

impl SerialTransport {
    /// New transport in the disconnected state.
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: Mutex::new(None),
            request_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Open the serial port, replacing any previous connection.
    pub async fn connect(&self) -> Result<()> {
        debug!(
            "RTU: {} @{}baud",
            self.config.device, self.config.baud_rate
        );

        let port = tokio_serial::new(self.config.device.as_str(), self.config.baud_rate)
            .data_bits(self.config.serial_data_bits())
            .parity(self.config.parity.into())
            .stop_bits(self.config.serial_stop_bits())
            .timeout(self.config.timeout())
            .open_native_async()
            .map_err(|e| {
                error!("RTU err: {} - {}", self.config.device, e);
                HandError::connection(format!(
                    "failed to open serial port {}: {e}",
                    self.config.device
                ))
            })?;

        info!("RTU opened: {}", self.config.device);
        *self.stream.lock().await = Some(port);
        Ok(())
    }

    /// Connect with exponential backoff, giving up after `max_attempts`.
    pub async fn connect_with_retry(&self, max_attempts: u32) -> Result<()> {
        let mut delay_ms = 1000u64;

        for attempt in 1..=max_attempts {
            match self.connect().await {
                Ok(()) => {
                    info!("Connected (#{} attempts)", attempt);
                    return Ok(());
                }
                Err(e) if attempt == max_attempts => return Err(e),
                Err(e) => {
                    warn!("Retry {}/{}: {} ({}ms)", attempt, max_attempts, e, delay_ms);
                    sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(MAX_RETRY_DELAY_MS);
                }
            }
        }

        Err(HandError::connection("no connection attempts made"))
    }

    /// Read reply bytes until the inter-byte gap or the overall deadline.
    async fn receive(&self, port: &mut SerialStream) -> Result<Vec<u8>> {
        let mut buffer = [0u8; RESPONSE_BUFFER_SIZE];
        let mut total_bytes = 0;
        let deadline = self.config.timeout();
        let start_time = Instant::now();

        loop {
            if start_time.elapsed() >= deadline {
                // Silent or stalled device; hand back what arrived
                break;
            }

            let remaining_buffer = &mut buffer[total_bytes..];
            let read_size = remaining_buffer.len().min(128);

            match timeout(INTER_BYTE_TIMEOUT, port.read(&mut remaining_buffer[..read_size])).await {
                Ok(Ok(bytes)) => {
                    if bytes == 0 {
                        error!("RTU closed");
                        return Err(HandError::connection("serial connection closed"));
                    }
                    total_bytes += bytes;

                    if total_bytes >= buffer.len() {
                        error!("RTU overflow: {}B", total_bytes);
                        return Err(HandError::invalid_response(format!(
                            "reply exceeds {RESPONSE_BUFFER_SIZE}-byte buffer"
                        )));
                    }
                }
                Ok(Err(e)) => {
                    error!("RTU RX: {}", e);
                    return Err(HandError::Io(format!("serial read error: {e}")));
                }
                Err(_) => {
                    // Inter-byte gap: the frame is complete once anything
                    // has arrived
                    if total_bytes > 0 {
                        break;
                    }
                }
            }
        }

        Ok(buffer[..total_bytes].to_vec())
    }
}

#[async_trait]
impl HandTransport for SerialTransport {
    async fn transact(&self, request: &[u8]) -> Result<Vec<u8>> {
        let _exchange = self.request_lock.lock().await;

        let mut guard = self.stream.lock().await;
        let port = guard
            .as_mut()
            .ok_or_else(|| HandError::connection("not connected"))?;

        port.write_all(request).await.map_err(|e| {
            error!("RTU TX: {}", e);
            HandError::Io(format!("serial write error: {e}"))
        })?;
        port.flush().await.map_err(|e| {
            error!("RTU flush: {}", e);
            HandError::Io(format!("serial flush error: {e}"))
        })?;
        debug!("RTU TX: {}B", request.len());
        trace!("TX {}", hex_string(request));

        let reply = self.receive(port).await?;
        debug!("RTU RX: {}B", reply.len());
        trace!("RX {}", hex_string(&reply));
        Ok(reply)
    }

    async fn is_open(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    async fn close(&self) -> Result<()> {
        *self.stream.lock().await = None;
        debug!("Disconnected");
        Ok(())
    }
}

fn hex_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    // ========================================================================
    // Disconnected State Tests
    // ========================================================================

    #[tokio::test]
    async fn test_transact_before_connect_fails() {
        let transport = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0"));
        let result = transport.transact(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x01]).await;
        match result {
            Err(HandError::ConnectionFailed(msg)) => assert!(msg.contains("not connected")),
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let transport = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0"));
        assert!(!transport.is_open().await);
        assert!(transport.close().await.is_ok());
        assert!(transport.close().await.is_ok());
        assert!(!transport.is_open().await);
    }

    // ========================================================================
    // Connection Failure Tests
    // ========================================================================

    #[tokio::test]
    async fn test_connect_missing_device_fails() {
        let transport = SerialTransport::new(SerialConfig::new("/dev/dexhand-missing-port"));
        let result = transport.connect().await;
        assert!(matches!(result, Err(HandError::ConnectionFailed(_))));
        assert!(!transport.is_open().await);
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        let transport = SerialTransport::new(SerialConfig::new("/dev/dexhand-missing-port"));
        // Single attempt keeps the test free of backoff sleeps
        let result = transport.connect_with_retry(1).await;
        assert!(matches!(result, Err(HandError::ConnectionFailed(_))));
    }

    // ========================================================================
    // Helper Tests
    // ========================================================================

    #[test]
    fn test_hex_string_format() {
        assert_eq!(hex_string(&[0x01, 0x0A, 0xFF]), "01 0A FF");
        assert_eq!(hex_string(&[]), "");
    }
}
