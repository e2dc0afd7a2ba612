//! Axis initialization (open / close / find-stroke homing)

use std::sync::Arc;

use colored::Colorize;
use dexhand_modbus::{Axis, InitMode, InitStatus, AXIS_COUNT};

use crate::error::Result;
use crate::manager::{HandManager, HandSession};

pub async fn execute(
    manager: &HandManager,
    hand: Option<&str>,
    axis: Option<u8>,
    mode: InitMode,
) -> Result<()> {
    let axis = axis.map(Axis::new).transpose()?;

    match axis {
        Some(a) => println!("🔧 {} axis {} ({:?})", "Initializing".bold(), a, mode),
        None => println!("🔧 {} all axes ({:?})", "Initializing".bold(), mode),
    }

    match hand {
        Some(name) => {
            let states = run(manager.get(name)?, axis, mode).await?;
            report(name, &states);
        }
        None => {
            for (name, outcome) in manager
                .for_each_joined(move |session| run(session, axis, mode))
                .await
            {
                match outcome {
                    Ok(states) => report(&name, &states),
                    Err(e) => println!("   {} {}: {}", "❌".red(), name, e),
                }
            }
        }
    }
    Ok(())
}

async fn run(
    session: Arc<HandSession>,
    axis: Option<Axis>,
    mode: InitMode,
) -> Result<[InitStatus; AXIS_COUNT]> {
    match axis {
        Some(a) => session.client.initialize_axis(a, mode).await?,
        None => session.client.initialize(mode).await?,
    }
    Ok(session.client.initialization_status().await?)
}

fn report(name: &str, states: &[InitStatus; AXIS_COUNT]) {
    let summary = Axis::all()
        .into_iter()
        .zip(states.iter())
        .map(|(axis, state)| format!("{} {}", axis, state))
        .collect::<Vec<_>>()
        .join(", ");
    println!("   {} {}: {}", "✅".green(), name.cyan(), summary);
}
