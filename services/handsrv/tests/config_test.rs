//! Configuration loading against real files and environment overrides

#![allow(clippy::disallowed_methods)]

use std::fs;
use std::path::PathBuf;

use dexhand_modbus::Parity;
use handsrv::config::HandsrvConfig;
use handsrv::error::HandsrvError;
use tempfile::TempDir;

const BENCH_RIG: &str = r"
service:
  name: bench-rig
hands:
  - name: left
    device: /dev/ttyUSB0
    modbus_id: 1
  - name: right
    device: /dev/ttyUSB1
    modbus_id: 1
    baud_rate: 921600
    parity: E
    timeout_ms: 250
";

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("handsrv.yaml");
    fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, BENCH_RIG);

    let config = HandsrvConfig::load(Some(&path)).unwrap();
    assert_eq!(config.hands.len(), 2);

    let left = config.hand("left").unwrap();
    assert_eq!(left.serial.device, "/dev/ttyUSB0");
    assert_eq!(left.serial.baud_rate, 115_200);
    assert_eq!(left.serial.timeout_ms, 1000);

    let right = config.hand("right").unwrap();
    assert_eq!(right.serial.baud_rate, 921_600);
    assert_eq!(right.serial.parity, Parity::Even);
    assert_eq!(right.serial.timeout_ms, 250);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nonexistent.yaml");

    let error = HandsrvConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(error, HandsrvError::Config(_)));
}

#[test]
fn test_load_rejects_invalid_roster() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r"
hands:
  - name: left
    device: /dev/ttyUSB0
  - name: right
    device: /dev/ttyUSB0
",
    );

    let error = HandsrvConfig::load(Some(&path)).unwrap_err();
    assert!(error.to_string().contains("share device"));
}

// ============================================================================
// Environment Override Tests
// ============================================================================

// Single test so the HANDSRV_* variables never race a parallel load.
#[test]
fn test_env_config_path_and_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, BENCH_RIG);

    std::env::set_var("HANDSRV_CONFIG", &path);
    std::env::set_var("HANDSRV_SERVICE_NAME", "env-rig");

    let config = HandsrvConfig::load(None).unwrap();

    std::env::remove_var("HANDSRV_CONFIG");
    std::env::remove_var("HANDSRV_SERVICE_NAME");

    assert_eq!(config.service.name, "env-rig");
    assert_eq!(config.hands.len(), 2);
    assert!(config.hand("right").is_some());
}
