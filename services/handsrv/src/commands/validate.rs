//! Configuration validation without touching any hardware

use std::path::Path;

use colored::Colorize;

use crate::config::HandsrvConfig;
use crate::error::Result;

pub async fn execute(path: Option<&Path>) -> Result<()> {
    println!("🔍 {} configuration", "Validating".bold());

    let config = HandsrvConfig::load(path)?;

    println!(
        "{} {} hand(s) configured:",
        "✅".green(),
        config.hands.len()
    );
    for hand in &config.hands {
        println!(
            "   • {} on {} (address {}, {} baud, timeout {}ms)",
            hand.name.cyan(),
            hand.serial.device,
            hand.serial.modbus_id,
            hand.serial.baud_rate,
            hand.serial.timeout_ms
        );
    }
    Ok(())
}
