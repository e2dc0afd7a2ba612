//! Service configuration
//!
//! The hand roster comes from a YAML file merged with `HANDSRV_`-prefixed
//! environment overrides. Each roster entry names a hand and carries its
//! full serial settings; the port is the unit of ownership, so two hands
//! may never share a device path.

use std::path::{Path, PathBuf};

use dexhand_modbus::SerialConfig;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{HandsrvError, Result};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/handsrv.yaml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "HANDSRV_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Directory for daily-rolled log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_dir: None,
        }
    }
}

fn default_service_name() -> String {
    "handsrv".to_string()
}

/// One hand on one serial port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandChannelConfig {
    /// Roster name used on the command line, e.g. "left"
    pub name: String,
    #[serde(flatten)]
    pub serial: SerialConfig,
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandsrvConfig {
    #[serde(default)]
    pub service: ServiceSection,
    pub hands: Vec<HandChannelConfig>,
}

impl HandsrvConfig {
    /// Load from an explicit path, `$HANDSRV_CONFIG`, or the default
    /// location, then merge environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let config: HandsrvConfig = Figment::new()
            .merge(Yaml::file(&path))
            .merge(Env::prefixed("HANDSRV_").split("_"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject rosters the manager cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.hands.is_empty() {
            return Err(HandsrvError::config("no hands configured"));
        }

        for (i, hand) in self.hands.iter().enumerate() {
            if hand.name.is_empty() {
                return Err(HandsrvError::config(format!("hand #{i} has no name")));
            }
            hand.serial
                .validate()
                .map_err(|e| HandsrvError::config(format!("hand '{}': {e}", hand.name)))?;
        }

        for (i, a) in self.hands.iter().enumerate() {
            for b in &self.hands[i + 1..] {
                if a.name == b.name {
                    return Err(HandsrvError::config(format!(
                        "duplicate hand name '{}'",
                        a.name
                    )));
                }
                if a.serial.device == b.serial.device {
                    return Err(HandsrvError::config(format!(
                        "hands '{}' and '{}' share device {}",
                        a.name, b.name, a.serial.device
                    )));
                }
            }
        }

        Ok(())
    }

    /// Roster entry by name.
    pub fn hand(&self, name: &str) -> Option<&HandChannelConfig> {
        self.hands.iter().find(|h| h.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn two_hand_yaml() -> &'static str {
        r"
service:
  name: handsrv
hands:
  - name: left
    device: /dev/ttyUSB0
    modbus_id: 1
  - name: right
    device: /dev/ttyUSB1
    modbus_id: 1
    baud_rate: 57600
"
    }

    // ========================================================================
    // Parsing Tests
    // ========================================================================

    #[test]
    fn test_roster_parses_with_serial_defaults() {
        let config: HandsrvConfig = serde_yaml::from_str(two_hand_yaml()).unwrap();
        assert_eq!(config.hands.len(), 2);

        let left = config.hand("left").unwrap();
        assert_eq!(left.serial.device, "/dev/ttyUSB0");
        assert_eq!(left.serial.baud_rate, 115_200);

        let right = config.hand("right").unwrap();
        assert_eq!(right.serial.baud_rate, 57_600);
        assert!(config.hand("middle").is_none());
    }

    #[test]
    fn test_service_section_is_optional() {
        let yaml = r"
hands:
  - name: solo
    device: /dev/ttyUSB0
";
        let config: HandsrvConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.service.name, "handsrv");
        assert!(config.service.log_dir.is_none());
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_accepts_roster() {
        let config: HandsrvConfig = serde_yaml::from_str(two_hand_yaml()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_roster() {
        let config: HandsrvConfig = serde_yaml::from_str("hands: []").unwrap();
        assert!(matches!(
            config.validate(),
            Err(HandsrvError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let yaml = r"
hands:
  - name: left
    device: /dev/ttyUSB0
  - name: left
    device: /dev/ttyUSB1
";
        let config: HandsrvConfig = serde_yaml::from_str(yaml).unwrap();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("duplicate hand name"));
    }

    #[test]
    fn test_validate_rejects_shared_device() {
        let yaml = r"
hands:
  - name: left
    device: /dev/ttyUSB0
  - name: right
    device: /dev/ttyUSB0
";
        let config: HandsrvConfig = serde_yaml::from_str(yaml).unwrap();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("share device"));
    }

    #[test]
    fn test_validate_rejects_bad_serial_settings() {
        let yaml = r"
hands:
  - name: left
    device: /dev/ttyUSB0
    modbus_id: 0
";
        let config: HandsrvConfig = serde_yaml::from_str(yaml).unwrap();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("left"));
    }
}
