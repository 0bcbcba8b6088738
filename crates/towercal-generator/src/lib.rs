//! # Towercal Generator
//!
//! Turns raw calibration form input into a retraction calibration tower
//! G-code program:
//!
//! 1. **Validation** — raw field values are checked against
//!    physically-motivated bounds and narrowed to an immutable
//!    [`Parameters`] set ([`params`]).
//! 2. **Scheduling** — the per-segment retraction pairs are linearly
//!    interpolated between the configured endpoints ([`schedule`]).
//! 3. **Placeholder expansion** — user script fragments get their
//!    firmware tokens expanded ([`placeholders`]).
//! 4. **Generation** — the assembled request is handed to a
//!    [`ToolpathEngine`]; the built-in [`TowerEngine`] prints two square
//!    towers on zig-zag rafts ([`tower`]).

pub mod engine;
pub mod params;
pub mod placeholders;
pub mod schedule;
pub mod tower;

pub use engine::{submit, GenerationRequest, ToolpathEngine};
pub use params::{validate, Parameters, RawParameters};
pub use placeholders::{linear_advance_command, substitute};
pub use schedule::{format_summary, interpolate, Segment};
pub use tower::{suggested_file_name, TowerEngine};
