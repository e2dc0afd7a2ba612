//! Coordinated grab across every connected hand

use std::sync::Arc;

use anyhow::anyhow;
use colored::Colorize;
use dexhand_modbus::{Axis, AXIS_COUNT};

use crate::error::{HandsrvError, Result};
use crate::manager::{HandManager, HandSession};

/// Factory grip pose: thumb rotated in, fingers curled around an object.
pub const DEFAULT_GRAB_POSE: [u16; AXIS_COUNT] = [30, 1219, 1135, 1156, 1156, 144];

pub async fn execute(manager: &HandManager, positions: Option<Vec<u16>>, speed: u16) -> Result<()> {
    let pose: [u16; AXIS_COUNT] = match positions {
        Some(values) => values.try_into().map_err(|values: Vec<u16>| {
            HandsrvError::config(format!(
                "grab pose needs exactly {} values, got {}",
                AXIS_COUNT,
                values.len()
            ))
        })?,
        None => DEFAULT_GRAB_POSE,
    };

    println!(
        "🤏 {} {} hand(s) at speed {} toward {:?}",
        "Grabbing".bold(),
        manager.len(),
        speed,
        pose
    );

    let results = manager
        .for_each_joined(move |session| grab_one(session, pose, speed))
        .await;

    let mut failures = 0;
    for (name, outcome) in results {
        match outcome {
            Ok(()) => println!("   {} {}", "✅".green(), name.cyan()),
            Err(e) => {
                failures += 1;
                println!("   {} {}: {}", "❌".red(), name, e);
            }
        }
    }
    if failures > 0 {
        return Err(anyhow!("grab failed on {} hand(s)", failures).into());
    }
    Ok(())
}

async fn grab_one(session: Arc<HandSession>, pose: [u16; AXIS_COUNT], speed: u16) -> Result<()> {
    let axes = Axis::all();
    session
        .client
        .set_all_speeds(&axes, &[speed; AXIS_COUNT])
        .await?;
    session.client.set_all_positions(&axes, &pose).await?;
    Ok(())
}
