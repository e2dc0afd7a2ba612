//! Direct motion target commands

use colored::Colorize;
use dexhand_modbus::{Axis, AXIS_COUNT};

use crate::error::{HandsrvError, Result};
use crate::manager::HandManager;

/// Write individual targets for one axis. Speed and force land before the
/// position so the move starts under the new limits.
pub async fn set(
    manager: &HandManager,
    hand: &str,
    axis: u8,
    position: Option<u16>,
    speed: Option<u16>,
    force: Option<u16>,
) -> Result<()> {
    if position.is_none() && speed.is_none() && force.is_none() {
        return Err(HandsrvError::config(
            "nothing to set: pass at least one of --position, --speed, --force",
        ));
    }

    let session = manager.get(hand)?;
    let axis = Axis::new(axis)?;

    if let Some(value) = speed {
        session.client.set_speed(axis, value).await?;
        println!("   {} speed = {}", axis, value);
    }
    if let Some(value) = force {
        session.client.set_force(axis, value).await?;
        println!("   {} force = {}", axis, value);
    }
    if let Some(value) = position {
        session.client.set_position(axis, value).await?;
        println!("   {} position = {}", axis, value);
    }

    println!("{} {} axis {} updated", "✅".green(), hand.cyan(), axis);
    Ok(())
}

/// Write a full six-axis pose in block writes, speeds and forces first.
pub async fn set_all(
    manager: &HandManager,
    hand: &str,
    positions: &[u16],
    speeds: Option<&[u16]>,
    forces: Option<&[u16]>,
) -> Result<()> {
    check_len("positions", positions)?;
    if let Some(speeds) = speeds {
        check_len("speeds", speeds)?;
    }
    if let Some(forces) = forces {
        check_len("forces", forces)?;
    }

    let session = manager.get(hand)?;
    let axes = Axis::all();

    match (speeds, forces) {
        // All three lists: one combined staged write, speed -> force -> position
        (Some(speeds), Some(forces)) => {
            session
                .client
                .set_all(&axes, positions, speeds, forces)
                .await?;
        }
        _ => {
            if let Some(speeds) = speeds {
                session.client.set_all_speeds(&axes, speeds).await?;
            }
            if let Some(forces) = forces {
                session.client.set_all_forces(&axes, forces).await?;
            }
            session.client.set_all_positions(&axes, positions).await?;
        }
    }

    println!("{} {} pose {:?}", "✅".green(), hand.cyan(), positions);
    Ok(())
}

fn check_len(what: &str, values: &[u16]) -> Result<()> {
    if values.len() != AXIS_COUNT {
        return Err(HandsrvError::config(format!(
            "{} needs exactly {} values, got {}",
            what,
            AXIS_COUNT,
            values.len()
        )));
    }
    Ok(())
}
