//! End-to-end pipeline tests: raw input through validation, scheduling,
//! request assembly, and the built-in tower engine.

use towercal_core::{Field, Firmware, ValidationError};
use towercal_generator::{
    format_summary, interpolate, submit, suggested_file_name, validate, GenerationRequest,
    RawParameters, TowerEngine,
};

fn sweep_input() -> RawParameters {
    RawParameters {
        num_segments: "5".to_string(),
        init_retract_length: "2".to_string(),
        end_retract_length: "6".to_string(),
        init_retract_speed: "30".to_string(),
        end_retract_speed: "70".to_string(),
        firmware_marlin: false,
        firmware_klipper: true,
        ..Default::default()
    }
}

#[test]
fn validation_is_total() {
    // Every input yields either a parameter set or exactly one failure.
    let ok = validate(&sweep_input());
    assert!(ok.is_ok());

    let bad = RawParameters {
        travel_speed: "fast".to_string(),
        ..sweep_input()
    };
    let err = validate(&bad).unwrap_err();
    assert_eq!(
        err,
        ValidationError::Format {
            field: Field::TravelSpeed
        }
    );
}

#[test]
fn schedule_matches_configured_sweep() {
    let params = validate(&sweep_input()).unwrap();
    assert_eq!(params.firmware, Firmware::Klipper);

    let segments = interpolate(&params).unwrap();
    assert_eq!(segments.len(), params.num_segments as usize);
    assert_eq!(
        (segments[0].retract_length, segments[0].retract_speed),
        (2.0, 30.0)
    );
    assert_eq!(
        (segments[4].retract_length, segments[4].retract_speed),
        (6.0, 70.0)
    );

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

#[tokio::test]
async fn generated_program_carries_schedule_and_fragments() {
    let raw = RawParameters {
        start_gcode: "$LA\nM221 S$FLOW".to_string(),
        end_gcode: "M84".to_string(),
        ..sweep_input()
    };
    let params = validate(&raw).unwrap();
    let segments = interpolate(&params).unwrap();
    let request = GenerationRequest::assemble(params.clone(), segments);
    let gcode = submit(&TowerEngine, &request).await.unwrap();

    // Header block carries the whole schedule.
    for line in format_summary(&request.segments).lines() {
        assert!(gcode.contains(line));
    }

    // Klipper advance command, expanded flow, end fragment.
    assert!(gcode.contains("SET_PRESSURE_ADVANCE ADVANCE=0\n"));
    assert!(gcode.contains("M221 S100\n"));
    assert!(gcode.ends_with(";end gcode\nM84"));

    assert_eq!(suggested_file_name(&params), "RCT_H240-B60_2-6mm_30-70mms.gcode");
}

#[tokio::test]
async fn failed_validation_stops_the_pipeline() {
    let raw = RawParameters {
        bed_size_x: "50".to_string(),
        ..sweep_input()
    };
    // No segments, no request, no engine call: the failure is all the
    // caller gets.
    let err = validate(&raw).unwrap_err();
    assert_eq!(err.field(), Field::BedSizeX);
}
