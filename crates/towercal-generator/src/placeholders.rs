//! Placeholder expansion for user-supplied script fragments
//!
//! Start/end G-code fragments may carry firmware-agnostic tokens that
//! are expanded against the validated parameter set before the fragment
//! is emitted. Expansion is textual and single-pass: replacement text is
//! never rescanned, and unrecognized tokens pass through unchanged so
//! fragments can be authored freely.

use crate::params::Parameters;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use towercal_core::{format_value, Firmware};

/// `$LA`, `$BEDTEMP`, `$HOTTEMP`, `$G29`, `$FLOW`.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:LA|BEDTEMP|HOTTEMP|G29|FLOW)").expect("token pattern is valid")
    })
}

/// The full firmware-specific command setting the Linear/Pressure
/// Advance coefficient.
pub fn linear_advance_command(firmware: Firmware, k_factor: f64) -> String {
    let k = format_value(k_factor, 3);
    match firmware {
        Firmware::Marlin => format!("M900 K{}", k),
        Firmware::Klipper => format!("SET_PRESSURE_ADVANCE ADVANCE={}", k),
        Firmware::Rrf => format!("M572 D0 S{}", k),
    }
}

/// Expand recognized tokens in `template` against `params`.
///
/// Temperatures and flow substitute as bare numbers (templates embed
/// them in their own commands, e.g. `M140 S$BEDTEMP`); `$LA` expands to
/// the complete advance command; `$G29` expands to `G29` only when bed
/// auto-calibration is enabled, otherwise to the empty string.
pub fn substitute(template: &str, params: &Parameters) -> String {
    token_pattern()
        .replace_all(template, |caps: &Captures| match &caps[0] {
            "$LA" => linear_advance_command(params.firmware, params.k_factor),
            "$BEDTEMP" => params.bed_temperature.to_string(),
            "$HOTTEMP" => params.hotend_temperature.to_string(),
            "$G29" => if params.bed_auto_calibrate {
                "G29".to_string()
            } else {
                String::new()
            },
            "$FLOW" => params.flow.to_string(),
            other => other.to_string(),
        })
        .into_owned()
}
