/*++

Licensed under the Apache-2.0 license.

File Name:

   config.rs

Abstract:

    File contains utilities for parsing configuration files

--*/

use anyhow::{bail, Context};
use sb_image_types::BootConfig;
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool Configuration
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub boot: BootConfig,
}

/// Load Boot Configuration from file; defaults apply when no file is given
pub(crate) fn load_boot_config(path: Option<&PathBuf>) -> anyhow::Result<BootConfig> {
    let Some(path) = path else {
        return Ok(BootConfig::default());
    };

    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the config file {}", path.display()))?;

    parse_boot_config(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn parse_boot_config(config_str: &str) -> anyhow::Result<BootConfig> {
    let config: AppConfig = toml::from_str(config_str)?;

    if !config.boot.is_valid() {
        bail!(
            "validation_info_alignment {} must be a power of two no larger than validation_search_distance + 1 ({})",
            config.boot.validation_info_alignment,
            config.boot.validation_search_distance
        );
    }

    Ok(config.boot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_boot_config("").unwrap(), BootConfig::default());
        assert_eq!(parse_boot_config("[boot]").unwrap(), BootConfig::default());
    }

    #[test]
    fn test_parse_overrides() {
        let config = parse_boot_config(
            r#"
            [boot]
            hardware_id = 0x53
            firmware_info_offset = 0x200
            validation_search_distance = 16
            validation_info_alignment = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.hardware_id, 0x53);
        assert_eq!(config.firmware_info_offset, 0x200);
        assert_eq!(config.validation_search_distance, 16);
        assert_eq!(config.validation_info_alignment, 16);
        assert_eq!(config.format_version, BootConfig::default().format_version);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_boot_config("[boot]\nvalidation_info_alignment = 8").is_err());
        assert!(parse_boot_config("[boot]\nhardware_id = 300").is_err());
        assert!(parse_boot_config("[boot]\nunknown = [").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_boot_config(Some(&dir.path().join("absent.toml"))).is_err());
        assert_eq!(load_boot_config(None).unwrap(), BootConfig::default());
    }
}
