//! # Towercal Core
//!
//! Core types, units, and error taxonomy for towercal.
//! Provides the fundamental abstractions shared by the generator and
//! settings crates: field identifiers, the firmware selection, numeric
//! parsing/rendering helpers, and the structured error types.

pub mod error;
pub mod types;
pub mod units;

pub use error::{EngineError, Error, Result, ScheduleError, ValidationError};
pub use types::{Field, Firmware, Point};
pub use units::{format_value, parse_count, parse_decimal, round_to};
