//! Profile file handling
//!
//! A profile is a [`RawParameters`] set serialized to disk. Values stay
//! raw: a profile may hold entries that would fail validation, so an
//! operator can save work-in-progress settings. Supports JSON and TOML,
//! dispatched on the file extension.

use std::path::{Path, PathBuf};
use towercal_core::{Error, Result};
use towercal_generator::RawParameters;

/// Default profile location under the platform config directory.
pub fn default_profile_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("towercal")
        .join("profile.toml")
}

/// Load a profile from file (JSON or TOML).
///
/// Missing keys fall back to the stock defaults, so profiles written by
/// older versions keep loading.
pub fn load_profile(path: &Path) -> Result<RawParameters> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::other(format!("Failed to read profile file: {}", e)))?;

    let profile: RawParameters = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .map_err(|e| Error::other(format!("Invalid JSON profile: {}", e)))?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)
            .map_err(|e| Error::other(format!("Invalid TOML profile: {}", e)))?
    } else {
        return Err(Error::other(
            "Profile file must be .json or .toml".to_string(),
        ));
    };

    tracing::debug!(path = %path.display(), "profile loaded");
    Ok(profile)
}

/// Save a profile to file (JSON or TOML), creating parent directories.
pub fn save_profile(profile: &RawParameters, path: &Path) -> Result<()> {
    let content = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_string_pretty(profile)
            .map_err(|e| Error::other(format!("Failed to serialize profile: {}", e)))?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::to_string_pretty(profile)
            .map_err(|e| Error::other(format!("Failed to serialize profile: {}", e)))?
    } else {
        return Err(Error::other(
            "Profile file must be .json or .toml".to_string(),
        ));
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::other(format!("Failed to create profile directory: {}", e)))?;
    }
    std::fs::write(path, content)
        .map_err(|e| Error::other(format!("Failed to write profile file: {}", e)))?;

    tracing::debug!(path = %path.display(), "profile saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");

        let mut profile = RawParameters::default();
        profile.bed_size_x = "235".to_string();
        profile.firmware_marlin = false;
        profile.firmware_klipper = true;

        save_profile(&profile, &path).unwrap();
        let loaded = load_profile(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_round_trip_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let profile = RawParameters::default();
        save_profile(&profile, &path).unwrap();
        assert_eq!(load_profile(&path).unwrap(), profile);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        assert!(save_profile(&RawParameters::default(), &path).is_err());
        assert!(load_profile(&path).is_err());
    }

    #[test]
    fn test_partial_profile_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "bed_size_x = \"300\"\nhardmode = true\n").unwrap();

        let loaded = load_profile(&path).unwrap();
        assert_eq!(loaded.bed_size_x, "300");
        assert!(loaded.hardmode);
        assert_eq!(loaded.bed_size_y, RawParameters::default().bed_size_y);
    }

    #[test]
    fn test_raw_values_persist_without_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wip.toml");

        // An out-of-range value saves and loads untouched.
        let mut profile = RawParameters::default();
        profile.bed_size_x = "5".to_string();
        save_profile(&profile, &path).unwrap();
        assert_eq!(load_profile(&path).unwrap().bed_size_x, "5");
    }

    #[test]
    fn test_default_profile_path_is_namespaced() {
        let path = default_profile_path();
        assert!(path.ends_with("towercal/profile.toml"));
    }
}
