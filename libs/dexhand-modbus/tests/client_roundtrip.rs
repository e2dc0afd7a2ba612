//! End-to-end client tests over the simulated controller
//!
//! Every exchange here runs the real frame path: request encoding, CRC
//! stamping, the simulator's bus-side decoding, and response parsing. Only
//! the serial port is replaced.

#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use dexhand_modbus::registers::{
    CURRENT_FAULTS, HISTORY_FAULTS, TARGET_FORCE_BASE, TARGET_POSITION_BASE, TARGET_SPEED_BASE,
};
use dexhand_modbus::{
    Axis, HandClient, HandError, HandTransport, InitMode, InitStatus, SimulatedHand, UartConfig,
};

fn hand() -> (Arc<SimulatedHand>, HandClient) {
    let sim = Arc::new(SimulatedHand::new(1));
    let client = HandClient::new(sim.clone(), 1).expect("valid device address");
    (sim, client)
}

// ============================================================================
// Motion Target Tests
// ============================================================================

#[tokio::test]
async fn single_axis_targets_land_in_their_registers() {
    let (sim, client) = hand();

    client.set_position(Axis::F1, 1000).await.unwrap();
    client.set_speed(Axis::F2, 500).await.unwrap();
    client.set_force(Axis::F3, 200).await.unwrap();

    assert_eq!(sim.get_register(0x0101), Some(1000));
    assert_eq!(sim.get_register(0x010E), Some(500));
    // Force registers stride by 0x10 per axis
    assert_eq!(sim.get_register(0x0127), Some(200));
}

#[tokio::test]
async fn set_position_reads_back_through_telemetry() {
    let (_sim, client) = hand();

    client.set_position(Axis::F4, 1156).await.unwrap();
    assert_eq!(client.position(Axis::F4).await.unwrap(), 1156);
}

#[tokio::test]
async fn batched_positions_round_trip_all_axes() {
    let (_sim, client) = hand();
    let targets = [30, 1219, 1135, 1156, 1156, 144];

    client
        .set_all_positions(&Axis::all(), &targets)
        .await
        .unwrap();

    assert_eq!(client.all_positions().await.unwrap(), targets);
}

#[tokio::test]
async fn grab_sequence_stages_speeds_before_positions() {
    let (sim, client) = hand();
    let speeds = [30; 6];
    let positions = [30, 1272, 1173, 1128, 1198, 120];

    client.set_all_speeds(&Axis::all(), &speeds).await.unwrap();
    client
        .set_all_positions(&Axis::all(), &positions)
        .await
        .unwrap();

    let writes = sim.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].address, TARGET_SPEED_BASE);
    assert_eq!(writes[1].address, TARGET_POSITION_BASE);
    assert_eq!(client.all_speeds().await.unwrap(), speeds);
    assert_eq!(client.all_positions().await.unwrap(), positions);
}

#[tokio::test]
async fn set_all_writes_speed_force_position_in_order() {
    let (sim, client) = hand();

    client
        .set_all(
            &[Axis::F1, Axis::F2],
            &[100, 200],
            &[10, 20],
            &[5, 5],
        )
        .await
        .unwrap();

    let addresses: Vec<u16> = sim.writes().iter().map(|w| w.address).collect();
    assert_eq!(
        addresses,
        vec![TARGET_SPEED_BASE, TARGET_FORCE_BASE, TARGET_POSITION_BASE]
    );
}

#[tokio::test]
async fn bad_axis_number_never_reaches_the_bus() {
    let (sim, client) = hand();

    let error = Axis::new(7).unwrap_err();
    assert!(matches!(error, HandError::InvalidCommand(_)));

    // A valid call afterwards is the only traffic the bus ever sees
    client.set_position(Axis::F1, 100).await.unwrap();
    assert_eq!(sim.writes().len(), 1);
}

// ============================================================================
// Telemetry Tests
// ============================================================================

#[tokio::test]
async fn current_draw_reads_seeded_noise() {
    let (_sim, client) = hand();

    let draws = client.all_current_draws().await.unwrap();
    assert!(draws.iter().all(|d| (40..90).contains(d)));

    let f1 = client.current_draw(Axis::F1).await.unwrap();
    assert_eq!(f1, draws[0]);
}

#[tokio::test]
async fn staged_telemetry_reads_exactly() {
    let (sim, client) = hand();
    sim.set_register(0x0207, 777);

    assert_eq!(client.position(Axis::F1).await.unwrap(), 777);
}

// ============================================================================
// Initialization Tests
// ============================================================================

#[tokio::test]
async fn initialize_all_reports_every_axis_initialized() {
    let (_sim, client) = hand();

    let before = client.initialization_status().await.unwrap();
    assert!(before.iter().all(|s| *s == InitStatus::NotInitialized));

    client.initialize(InitMode::FindStroke).await.unwrap();

    let after = client.initialization_status().await.unwrap();
    assert!(after.iter().all(|s| *s == InitStatus::Initialized));
}

#[tokio::test]
async fn initialize_single_axis_touches_only_that_axis() {
    let (_sim, client) = hand();

    client.initialize_axis(Axis::F3, InitMode::Open).await.unwrap();

    let status = client.initialization_status().await.unwrap();
    for (i, s) in status.iter().enumerate() {
        if i == 2 {
            assert_eq!(*s, InitStatus::Initialized);
        } else {
            assert_eq!(*s, InitStatus::NotInitialized);
        }
    }
}

#[tokio::test]
async fn restart_loses_initialization() {
    let (_sim, client) = hand();

    client.initialize(InitMode::Close).await.unwrap();
    client.restart_system().await.unwrap();

    let status = client.initialization_status().await.unwrap();
    assert!(status.iter().all(|s| *s == InitStatus::NotInitialized));
}

// ============================================================================
// Fault Tests
// ============================================================================

#[tokio::test]
async fn fault_query_and_reset() {
    let (sim, client) = hand();
    sim.set_register(CURRENT_FAULTS, 0x0012);

    assert_eq!(client.current_faults().await.unwrap(), 0x0012);

    client.reset_faults().await.unwrap();
    assert_eq!(client.current_faults().await.unwrap(), 0);
}

#[tokio::test]
async fn history_faults_reads_the_full_log() {
    let (sim, client) = hand();
    sim.set_register(HISTORY_FAULTS, 0x0003);
    sim.set_register(HISTORY_FAULTS + 0x3E, 0x0009);

    let log = client.history_faults().await.unwrap();
    assert_eq!(log.len(), 0x3F);
    assert_eq!(log[0], 0x0003);
    assert_eq!(log[0x3E], 0x0009);
    assert!(log[1..0x3E].iter().all(|r| *r == 0));
}

// ============================================================================
// UART Reconfiguration Tests
// ============================================================================

#[tokio::test]
async fn uart_reconfig_then_save() {
    let (sim, client) = hand();

    client
        .set_uart_config(UartConfig {
            modbus_id: 3,
            baud_code: 4,
            stop_bits: 1,
            parity_code: 2,
        })
        .await
        .unwrap();
    client.save_parameters().await.unwrap();

    assert_eq!(sim.get_register(0x0302), Some(3));
    assert_eq!(sim.get_register(0x0303), Some(4));
    assert_eq!(sim.get_register(0x0304), Some(1));
    assert_eq!(sim.get_register(0x0305), Some(2));
    assert_eq!(sim.get_register(0x0300), Some(1));
}

// ============================================================================
// Error Path Tests
// ============================================================================

#[tokio::test]
async fn corrupt_reply_crc_is_a_distinct_error() {
    let (sim, client) = hand();

    sim.corrupt_next_crc();
    let error = client.position(Axis::F1).await.unwrap_err();
    assert!(matches!(error, HandError::CrcCheckFailed(_)));
    assert!(error.is_retryable());

    // The line recovers on the next exchange
    assert!(client.position(Axis::F1).await.is_ok());
}

#[tokio::test]
async fn truncated_reply_is_invalid_response() {
    let (sim, client) = hand();

    sim.truncate_next();
    let error = client.position(Axis::F1).await.unwrap_err();
    assert!(matches!(error, HandError::InvalidResponse(_)));
}

#[tokio::test]
async fn silent_device_is_invalid_response() {
    let (sim, client) = hand();

    sim.drop_next();
    let error = client.position(Axis::F1).await.unwrap_err();
    assert!(matches!(error, HandError::InvalidResponse(_)));
}

#[tokio::test]
async fn mismatched_device_address_gets_no_reply() {
    let sim = Arc::new(SimulatedHand::new(1));
    let client = HandClient::new(sim, 2).unwrap();

    let error = client.position(Axis::F1).await.unwrap_err();
    assert!(matches!(error, HandError::InvalidResponse(_)));
}

#[tokio::test]
async fn zero_register_read_fails_before_io() {
    let (sim, client) = hand();

    let error = client.read_holding(0x0207, 0).await.unwrap_err();
    assert!(matches!(error, HandError::InvalidCommand(_)));
    assert!(sim.writes().is_empty());
}

#[tokio::test]
async fn closed_transport_is_connection_failed() {
    let (sim, client) = hand();
    sim.close().await.unwrap();

    let error = client.position(Axis::F1).await.unwrap_err();
    assert!(matches!(error, HandError::ConnectionFailed(_)));
}

// ============================================================================
// Two-Hand Concurrency Tests
// ============================================================================

#[tokio::test]
async fn two_hands_move_concurrently_and_join() {
    let left_sim = Arc::new(SimulatedHand::new(1));
    let right_sim = Arc::new(SimulatedHand::new(1));
    let left = Arc::new(HandClient::new(left_sim.clone(), 1).unwrap());
    let right = Arc::new(HandClient::new(right_sim.clone(), 1).unwrap());

    let left_targets = [30, 1272, 1173, 1128, 1198, 120];
    let right_targets = [30, 1219, 1135, 1156, 1156, 144];

    let l = {
        let left = left.clone();
        tokio::spawn(async move {
            left.set_all_speeds(&Axis::all(), &[30; 6]).await?;
            left.set_all_positions(&Axis::all(), &left_targets).await
        })
    };
    let r = {
        let right = right.clone();
        tokio::spawn(async move {
            right.set_all_speeds(&Axis::all(), &[30; 6]).await?;
            right.set_all_positions(&Axis::all(), &right_targets).await
        })
    };

    l.await.unwrap().unwrap();
    r.await.unwrap().unwrap();

    assert_eq!(left.all_positions().await.unwrap(), left_targets);
    assert_eq!(right.all_positions().await.unwrap(), right_targets);
}
