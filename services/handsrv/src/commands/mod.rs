//! CLI subcommand implementations
//!
//! Each module carries one `execute` entry point taking the connected
//! [`HandManager`](crate::manager::HandManager) and the parsed arguments.
//! `validate` is the exception: it only touches the configuration file.

pub mod grab;
pub mod init;
pub mod maintenance;
pub mod motion;
pub mod status;
pub mod validate;

use std::sync::Arc;

use crate::error::Result;
use crate::manager::{HandManager, HandSession};

/// Resolve `--hand NAME` to a session list: the named hand when given,
/// every configured hand otherwise (sorted by name).
pub(crate) fn select_hands(
    manager: &HandManager,
    hand: Option<&str>,
) -> Result<Vec<Arc<HandSession>>> {
    match hand {
        Some(name) => Ok(vec![manager.get(name)?]),
        None => manager
            .names()
            .iter()
            .map(|name| manager.get(name))
            .collect(),
    }
}
