//! Live telemetry readout for one or all hands

use colored::Colorize;
use dexhand_modbus::Axis;

use crate::error::Result;
use crate::manager::{HandManager, HandSession};

pub async fn execute(manager: &HandManager, hand: Option<&str>) -> Result<()> {
    for session in super::select_hands(manager, hand)? {
        print_hand(&session).await?;
        println!();
    }
    Ok(())
}

async fn print_hand(session: &HandSession) -> Result<()> {
    let client = &session.client;

    let states = client.initialization_status().await?;
    let positions = client.all_positions().await?;
    let speeds = client.all_speeds().await?;
    let currents = client.all_current_draws().await?;
    let faults = client.current_faults().await?;

    println!(
        "🤚 {} (device {})",
        session.name.cyan().bold(),
        client.device_id()
    );
    println!(
        "   {:<5} {:<16} {:>8} {:>6} {:>8}",
        "axis", "state", "position", "speed", "current"
    );
    for (i, axis) in Axis::all().into_iter().enumerate() {
        println!(
            "   {:<5} {:<16} {:>8} {:>6} {:>8}",
            axis.to_string(),
            states[i].to_string(),
            positions[i],
            speeds[i],
            currents[i]
        );
    }

    if faults == 0 {
        println!("   faults: {}", "none".green());
    } else {
        println!("   faults: {}", format!("0x{:04X}", faults).red());
    }
    Ok(())
}
