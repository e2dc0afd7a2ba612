//! Fault recovery, restart, and UART provisioning

use colored::Colorize;
use dexhand_modbus::UartConfig;

use crate::error::Result;
use crate::manager::HandManager;

/// Clear latched fault codes, reporting the word before and after.
pub async fn reset_faults(manager: &HandManager, hand: Option<&str>) -> Result<()> {
    for session in super::select_hands(manager, hand)? {
        let before = session.client.current_faults().await?;
        session.client.reset_faults().await?;
        let after = session.client.current_faults().await?;
        println!(
            "🧹 {}: faults 0x{:04X} -> 0x{:04X}",
            session.name.cyan(),
            before,
            after
        );
    }
    Ok(())
}

/// Restart the controller firmware. Axes come back uninitialized.
pub async fn restart(manager: &HandManager, hand: Option<&str>) -> Result<()> {
    for session in super::select_hands(manager, hand)? {
        session.client.restart_system().await?;
        println!("🔄 {} restarted", session.name.cyan());
    }
    println!("{}", "ℹ️  Re-initialize the axes before commanding motion".blue());
    Ok(())
}

/// Rewrite the UART block with the controller's raw codes.
pub async fn uart(
    manager: &HandManager,
    hand: &str,
    modbus_id: u16,
    baud_code: u16,
    stop_bits: u16,
    parity_code: u16,
    save: bool,
) -> Result<()> {
    let session = manager.get(hand)?;
    let config = UartConfig {
        modbus_id,
        baud_code,
        stop_bits,
        parity_code,
    };
    session.client.set_uart_config(config).await?;
    println!(
        "🔧 {}: UART block written (id {}, baud code {}, stop bits {}, parity code {})",
        hand.cyan(),
        modbus_id,
        baud_code,
        stop_bits,
        parity_code
    );

    if save {
        session.client.save_parameters().await?;
        println!("💾 Parameters saved to non-volatile memory");
    }
    println!("{}", "ℹ️  New UART settings apply after the next restart".blue());
    Ok(())
}
