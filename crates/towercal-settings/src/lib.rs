//! # Towercal Settings
//!
//! Persists the raw calibration field values between sessions.
//! Profiles are stored as JSON or TOML files in the platform config
//! directory and hold the values exactly as entered; validation only
//! happens when a profile is fed to the generator.

pub mod profile;

pub use profile::{default_profile_path, load_profile, save_profile};
