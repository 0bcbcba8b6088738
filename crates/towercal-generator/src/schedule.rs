//! Retraction schedule derivation
//!
//! Derives the ordered per-segment (retract length, retract speed)
//! schedule from a validated parameter set and renders it as the
//! human-readable summary block.

use crate::params::Parameters;
use serde::Serialize;
use towercal_core::{format_value, ScheduleError};

/// One vertical section of the calibration towers, printed at a fixed
/// retraction pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// 1-based segment number, counted from the bed.
    pub index: u32,
    /// Retraction length for this segment (mm).
    pub retract_length: f64,
    /// Retraction speed for this segment (mm/s).
    pub retract_speed: f64,
}

/// Derive the segment schedule from a validated parameter set.
///
/// Segment 1 carries exactly the init pair and the last segment exactly
/// the end pair; intermediate segments are linearly interpolated.
/// Deterministic and pure: identical inputs yield identical schedules.
pub fn interpolate(params: &Parameters) -> Result<Vec<Segment>, ScheduleError> {
    let n = params.num_segments;
    if n < 2 {
        // Unreachable through `validate`; a violation here is a
        // validator bug, not a user error.
        return Err(ScheduleError::InvariantViolation {
            reason: format!("segment count {} < 2", n),
        });
    }

    let mut segments = Vec::with_capacity(n as usize);
    for i in 1..=n {
        let (retract_length, retract_speed) = if i == n {
            (params.end_retract_length, params.end_retract_speed)
        } else {
            let t = f64::from(i - 1) / f64::from(n - 1);
            (
                params.init_retract_length
                    + t * (params.end_retract_length - params.init_retract_length),
                params.init_retract_speed
                    + t * (params.end_retract_speed - params.init_retract_speed),
            )
        };
        segments.push(Segment {
            index: i,
            retract_length,
            retract_speed,
        });
    }

    Ok(segments)
}

/// Render the schedule as the multi-line summary block.
///
/// One line per segment, values at 2-decimal precision with trailing
/// zeros dropped. Locale-invariant.
pub fn format_summary(segments: &[Segment]) -> String {
    let mut summary = String::new();
    for segment in segments {
        summary.push_str(&format!(
            ";Segment {}:   {}mm @ {}mm/s\n",
            segment.index,
            format_value(segment.retract_length, 2),
            format_value(segment.retract_speed, 2),
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{validate, RawParameters};

    fn params_with(
        num_segments: &str,
        init_len: &str,
        end_len: &str,
        init_spd: &str,
        end_spd: &str,
    ) -> Parameters {
        let raw = RawParameters {
            num_segments: num_segments.to_string(),
            init_retract_length: init_len.to_string(),
            end_retract_length: end_len.to_string(),
            init_retract_speed: init_spd.to_string(),
            end_retract_speed: end_spd.to_string(),
            ..Default::default()
        };
        validate(&raw).unwrap()
    }

    #[test]
    fn test_linear_interpolation() {
        let params = params_with("5", "2", "6", "30", "70");
        let segments = interpolate(&params).unwrap();
        let pairs: Vec<(f64, f64)> = segments
            .iter()
            .map(|s| (s.retract_length, s.retract_speed))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (2.0, 30.0),
                (3.0, 40.0),
                (4.0, 50.0),
                (5.0, 60.0),
                (6.0, 70.0)
            ]
        );
    }

    #[test]
    fn test_endpoints_are_exact() {
        let params = params_with("7", "0.1", "0.3", "35", "95");
        let segments = interpolate(&params).unwrap();
        assert_eq!(segments.len(), 7);
        assert_eq!(segments[0].retract_length, 0.1);
        assert_eq!(segments[0].retract_speed, 35.0);
        assert_eq!(segments[6].retract_length, 0.3);
        assert_eq!(segments[6].retract_speed, 95.0);
    }

    #[test]
    fn test_descending_schedule() {
        let params = params_with("3", "8", "2", "60", "20");
        let segments = interpolate(&params).unwrap();
        assert_eq!(segments[1].retract_length, 5.0);
        assert_eq!(segments[1].retract_speed, 40.0);
    }

    #[test]
    fn test_interpolation_is_deterministic() {
        let params = params_with("13", "0.8", "6.4", "25", "120");
        let first = interpolate(&params).unwrap();
        let second = interpolate(&params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invariant_violation_on_degenerate_count() {
        let mut params = params_with("5", "2", "6", "30", "70");
        params.num_segments = 1;
        assert!(matches!(
            interpolate(&params),
            Err(ScheduleError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_summary_format() {
        let params = params_with("5", "2", "6", "30", "70");
        let segments = interpolate(&params).unwrap();
        let summary = format_summary(&segments);
        assert_eq!(
            summary,
            ";Segment 1:   2mm @ 30mm/s\n\
             ;Segment 2:   3mm @ 40mm/s\n\
             ;Segment 3:   4mm @ 50mm/s\n\
             ;Segment 4:   5mm @ 60mm/s\n\
             ;Segment 5:   6mm @ 70mm/s\n"
        );
    }

    #[test]
    fn test_summary_round_trips() {
        let params = params_with("3", "1.25", "4.75", "30", "45");
        let segments = interpolate(&params).unwrap();
        let summary = format_summary(&segments);

        let mut recovered = Vec::new();
        for line in summary.lines() {
            let rest = line.strip_prefix(";Segment ").unwrap();
            let (index, rest) = rest.split_once(":   ").unwrap();
            let (length, rest) = rest.split_once("mm @ ").unwrap();
            let speed = rest.strip_suffix("mm/s").unwrap();
            recovered.push((
                index.parse::<u32>().unwrap(),
                length.parse::<f64>().unwrap(),
                speed.parse::<f64>().unwrap(),
            ));
        }

        let expected: Vec<(u32, f64, f64)> = segments
            .iter()
            .map(|s| (s.index, s.retract_length, s.retract_speed))
            .collect();
        assert_eq!(recovered, expected);
    }
}
