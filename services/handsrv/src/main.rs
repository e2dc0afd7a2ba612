use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dexhand_modbus::InitMode;

use handsrv::commands::{grab, init, maintenance, motion, status, validate};
use handsrv::config::HandsrvConfig;
use handsrv::error::Result;
use handsrv::logging::{self, LogConfig};
use handsrv::manager::HandManager;

/// Dexterous hand control CLI
#[derive(Parser)]
#[command(name = "handsrv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Talk to in-process simulated hands instead of serial ports
    #[arg(long, global = true)]
    simulate: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file without opening any ports
    Validate,

    /// Show initialization state, telemetry, and faults
    Status {
        /// Limit to one hand by name
        #[arg(long)]
        hand: Option<String>,
    },

    /// Home the axes (required after power-up or restart)
    Init {
        /// Limit to one hand by name
        #[arg(long)]
        hand: Option<String>,

        /// Single axis number (1-6); all axes when omitted
        #[arg(short, long)]
        axis: Option<u8>,

        /// Homing mode
        #[arg(short, long, value_enum, default_value = "open")]
        mode: InitModeArg,
    },

    /// Set targets for one axis of one hand
    Set {
        /// Hand name
        #[arg(long)]
        hand: String,

        /// Axis number (1-6)
        #[arg(short, long)]
        axis: u8,

        /// Target position
        #[arg(short, long)]
        position: Option<u16>,

        /// Target speed
        #[arg(short, long)]
        speed: Option<u16>,

        /// Target force limit
        #[arg(short, long)]
        force: Option<u16>,
    },

    /// Write a full six-axis pose in block writes
    SetAll {
        /// Hand name
        #[arg(long)]
        hand: String,

        /// Six target positions for F1..F6, comma separated
        #[arg(short, long, value_delimiter = ',')]
        positions: Vec<u16>,

        /// Six target speeds, comma separated
        #[arg(short, long, value_delimiter = ',')]
        speeds: Option<Vec<u16>>,

        /// Six target force limits, comma separated
        #[arg(short, long, value_delimiter = ',')]
        forces: Option<Vec<u16>>,
    },

    /// Drive every connected hand into a grip pose simultaneously
    Grab {
        /// Six target positions, comma separated; built-in grip pose when omitted
        #[arg(short, long, value_delimiter = ',')]
        positions: Option<Vec<u16>>,

        /// Closing speed applied to all axes
        #[arg(short, long, default_value_t = 30)]
        speed: u16,
    },

    /// Read and clear latched fault codes
    ResetFaults {
        /// Limit to one hand by name
        #[arg(long)]
        hand: Option<String>,
    },

    /// Restart the hand controller firmware
    Restart {
        /// Limit to one hand by name
        #[arg(long)]
        hand: Option<String>,
    },

    /// Rewrite the controller's UART block (raw controller codes)
    Uart {
        /// Hand name
        #[arg(long)]
        hand: String,

        /// New Modbus device address
        #[arg(long)]
        modbus_id: u16,

        /// Baud rate code from the controller manual
        #[arg(long)]
        baud_code: u16,

        /// Stop bits
        #[arg(long, default_value_t = 1)]
        stop_bits: u16,

        /// Parity code (0 none, 1 odd, 2 even)
        #[arg(long, default_value_t = 0)]
        parity_code: u16,

        /// Persist to non-volatile memory afterwards
        #[arg(long)]
        save: bool,
    },
}

/// Homing mode accepted by `init`
#[derive(ValueEnum, Clone, Copy, Debug)]
enum InitModeArg {
    /// Drive to the closed end stop
    Close,
    /// Drive to the open end stop
    Open,
    /// Sweep the full travel to find the stroke
    FindStroke,
}

impl From<InitModeArg> for InitMode {
    fn from(mode: InitModeArg) -> Self {
        match mode {
            InitModeArg::Close => InitMode::Close,
            InitModeArg::Open => InitMode::Open,
            InitModeArg::FindStroke => InitMode::FindStroke,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    println!("{}", "Dexterous Hand Control".bold().cyan());
    println!("{}", "======================".cyan());
    println!();

    match run(cli).await {
        Ok(()) => {
            println!();
            println!("{}", "✅ Operation completed successfully!".green());
        }
        Err(e) => {
            println!();
            eprintln!("{} {}", "❌ Error:".red(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // `validate` only reads the file; no logging or hardware setup.
    if matches!(cli.command, Commands::Validate) {
        return validate::execute(cli.config.as_deref()).await;
    }

    let config = HandsrvConfig::load(cli.config.as_deref())?;
    let _guard = logging::init_logging(&LogConfig {
        verbose: cli.verbose,
        no_color: cli.no_color,
        log_dir: config.service.log_dir.clone(),
    })?;

    let manager = HandManager::connect_all(&config, cli.simulate).await?;
    let result = dispatch(&manager, cli.command).await;
    manager.close_all().await;
    result
}

async fn dispatch(manager: &HandManager, command: Commands) -> Result<()> {
    match command {
        Commands::Validate => unreachable!("handled before connection setup"),

        Commands::Status { hand } => status::execute(manager, hand.as_deref()).await,

        Commands::Init { hand, axis, mode } => {
            init::execute(manager, hand.as_deref(), axis, mode.into()).await
        }

        Commands::Set {
            hand,
            axis,
            position,
            speed,
            force,
        } => motion::set(manager, &hand, axis, position, speed, force).await,

        Commands::SetAll {
            hand,
            positions,
            speeds,
            forces,
        } => {
            motion::set_all(
                manager,
                &hand,
                &positions,
                speeds.as_deref(),
                forces.as_deref(),
            )
            .await
        }

        Commands::Grab { positions, speed } => grab::execute(manager, positions, speed).await,

        Commands::ResetFaults { hand } => {
            maintenance::reset_faults(manager, hand.as_deref()).await
        }

        Commands::Restart { hand } => maintenance::restart(manager, hand.as_deref()).await,

        Commands::Uart {
            hand,
            modbus_id,
            baud_code,
            stop_bits,
            parity_code,
            save,
        } => {
            maintenance::uart(
                manager,
                &hand,
                modbus_id,
                baud_code,
                stop_bits,
                parity_code,
                save,
            )
            .await
        }
    }
}
