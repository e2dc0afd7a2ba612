//! Logging bootstrap
//!
//! Console output always; a daily-rolled file under `log_dir` when
//! configured. `RUST_LOG` overrides everything, otherwise `--verbose`
//! selects debug for this service and the driver. The returned guard must
//! stay alive for the process lifetime or buffered file output is lost.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Result;
use crate::SERVICE_NAME;

pub struct LogConfig {
    pub verbose: bool,
    pub no_color: bool,
    pub log_dir: Option<String>,
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let default_filter = if config.verbose {
        format!("info,{SERVICE_NAME}=debug,dexhand_modbus=debug")
    } else {
        "info".to_string()
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = fmt::layer()
        .with_ansi(!config.no_color)
        .with_target(false)
        .with_timer(LocalTimer);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
        let file_appender = tracing_appender::rolling::daily(dir, format!("{SERVICE_NAME}.log"));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_timer(LocalTimer)
            .with_writer(non_blocking);
        registry.with(file_layer).init();
        Ok(Some(guard))
    } else {
        registry.init();
        Ok(None)
    }
}
