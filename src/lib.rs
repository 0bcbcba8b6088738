//! # Towercal
//!
//! Retraction calibration tower G-code generator for Marlin, Klipper,
//! and RepRapFirmware 3D printers. Prints a pair of towers whose
//! retraction length and speed step through a configured sweep from
//! bottom to top, so the best settings can be read off the finished
//! part.
//!
//! ## Architecture
//!
//! Towercal is organized as a workspace with multiple crates:
//!
//! 1. **towercal-core** - Field identifiers, firmware selection, units,
//!    error taxonomy
//! 2. **towercal-generator** - Validation, retraction scheduling,
//!    placeholder expansion, and the tower toolpath engine
//! 3. **towercal-settings** - Profile persistence (raw field values)
//! 4. **towercal** - Main binary that integrates all crates

pub use towercal_core::{
    format_value, parse_count, parse_decimal, EngineError, Error, Field, Firmware, Point, Result,
    ScheduleError, ValidationError,
};

pub use towercal_generator::{
    format_summary, interpolate, linear_advance_command, submit, substitute, suggested_file_name,
    validate, GenerationRequest, Parameters, RawParameters, Segment, ToolpathEngine, TowerEngine,
};

pub use towercal_settings::{default_profile_path, load_profile, save_profile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr (stdout stays reserved for reports)
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
