//! Hand session lifecycle and multi-hand orchestration
//!
//! One [`HandSession`] per roster entry, each owning its serial port
//! through the driver. Cross-hand operations spawn one task per session
//! and join every task before reporting, so "move both hands" completes
//! only when both hands have answered.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dexhand_modbus::{HandClient, HandTransport, SerialTransport, SimulatedHand};
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::HandsrvConfig;
use crate::error::{HandsrvError, Result};

/// Connect retry budget when opening real ports
const CONNECT_ATTEMPTS: u32 = 3;

/// One connected hand
pub struct HandSession {
    pub name: String,
    pub client: HandClient,
}

/// All live sessions, keyed by roster name
pub struct HandManager {
    sessions: DashMap<String, Arc<HandSession>>,
}

impl HandManager {
    /// Open one session per configured hand.
    ///
    /// With `simulate`, every serial port is replaced by an in-memory
    /// controller; the roster and addressing stay identical.
    pub async fn connect_all(config: &HandsrvConfig, simulate: bool) -> Result<Self> {
        let sessions = DashMap::new();

        for hand in &config.hands {
            let transport: Arc<dyn HandTransport> = if simulate {
                info!("hand '{}': simulated controller", hand.name);
                Arc::new(SimulatedHand::new(hand.serial.modbus_id))
            } else {
                let transport = SerialTransport::new(hand.serial.clone());
                transport.connect_with_retry(CONNECT_ATTEMPTS).await?;
                Arc::new(transport)
            };

            let client = HandClient::new(transport, hand.serial.modbus_id)?;
            sessions.insert(
                hand.name.clone(),
                Arc::new(HandSession {
                    name: hand.name.clone(),
                    client,
                }),
            );
        }

        info!("{} hand(s) connected", sessions.len());
        Ok(Self { sessions })
    }

    /// Session by roster name.
    pub fn get(&self, name: &str) -> Result<Arc<HandSession>> {
        self.sessions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HandsrvError::UnknownHand(name.to_string()))
    }

    /// Roster names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run one operation per session concurrently and join them all.
    ///
    /// Results come back sorted by hand name. A failed or panicked task
    /// reports as that hand's error; the other hands still finish.
    pub async fn for_each_joined<F, Fut, T>(&self, op: F) -> Vec<(String, Result<T>)>
    where
        F: Fn(Arc<HandSession>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut names = Vec::with_capacity(self.sessions.len());
        let mut handles = Vec::with_capacity(self.sessions.len());
        for name in self.names() {
            if let Ok(session) = self.get(&name) {
                names.push(name);
                handles.push(tokio::spawn(op(session)));
            }
        }

        let joined = join_all(handles).await;
        names
            .into_iter()
            .zip(joined)
            .map(|(name, outcome)| {
                let result = match outcome {
                    Ok(result) => result,
                    Err(e) => Err(HandsrvError::Other(anyhow::anyhow!(
                        "task for '{name}' failed: {e}"
                    ))),
                };
                (name, result)
            })
            .collect()
    }

    /// Close every session.
    pub async fn close_all(&self) {
        for entry in self.sessions.iter() {
            if let Err(e) = entry.value().client.transport().close().await {
                warn!("close '{}': {}", entry.key(), e);
            }
        }
    }
}
