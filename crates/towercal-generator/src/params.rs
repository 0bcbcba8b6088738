//! Calibration input validation
//!
//! Maps raw, presentation-supplied field values to a validated
//! [`Parameters`] set. Validation is a pure function over its input:
//! either every check passes and a complete, immutable set is produced,
//! or the first failing field (in the fixed check order) is reported and
//! nothing is constructed.

use serde::{Deserialize, Serialize};
use towercal_core::{parse_count, parse_decimal, Field, Firmware, ValidationError};

/// Raw field values as gathered and persisted by the presentation layer.
///
/// Numeric fields stay textual here; toggles are booleans. The firmware
/// choice arrives as three independent toggles and is narrowed to
/// [`Firmware`] during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParameters {
    pub bed_size_x: String,
    pub bed_size_y: String,
    pub origin_at_center: bool,
    pub bed_auto_calibrate: bool,
    pub hotend_temperature: String,
    pub bed_temperature: String,
    pub fan_speed: String,
    pub line_width: String,
    pub first_layer_line_width: String,
    pub layer_height: String,
    pub print_speed: String,
    pub first_layer_print_speed: String,
    pub travel_speed: String,
    pub num_segments: String,
    pub init_retract_length: String,
    pub end_retract_length: String,
    pub init_retract_speed: String,
    pub end_retract_speed: String,
    pub segment_height: String,
    pub tower_spacing: String,
    pub z_offset: String,
    pub flow: String,
    pub k_factor: String,
    pub firmware_marlin: bool,
    pub firmware_klipper: bool,
    pub firmware_rrf: bool,
    pub hardmode: bool,
    pub start_gcode: String,
    pub end_gcode: String,
}

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            bed_size_x: "220".to_string(),
            bed_size_y: "220".to_string(),
            origin_at_center: false,
            bed_auto_calibrate: false,
            hotend_temperature: "240".to_string(),
            bed_temperature: "60".to_string(),
            fan_speed: "100".to_string(),
            line_width: "0.4".to_string(),
            first_layer_line_width: "0.4".to_string(),
            layer_height: "0.2".to_string(),
            print_speed: "60".to_string(),
            first_layer_print_speed: "20".to_string(),
            travel_speed: "150".to_string(),
            num_segments: "10".to_string(),
            init_retract_length: "8".to_string(),
            end_retract_length: "0.5".to_string(),
            init_retract_speed: "45".to_string(),
            end_retract_speed: "45".to_string(),
            segment_height: "3".to_string(),
            tower_spacing: "100".to_string(),
            z_offset: "0".to_string(),
            flow: "100".to_string(),
            k_factor: "0".to_string(),
            firmware_marlin: true,
            firmware_klipper: false,
            firmware_rrf: false,
            hardmode: false,
            start_gcode: "M140 S$BEDTEMP\nM190 S$BEDTEMP\nM104 S$HOTTEMP\nM109 S$HOTTEMP\nG28\n$G29\n$LA\nM221 S$FLOW\nG92 E0"
                .to_string(),
            end_gcode: "M104 S0\nM140 S0\nG91\nG1 E-3 F1800\nG1 Z10 F450\nG90\nM84".to_string(),
        }
    }
}

impl RawParameters {
    /// Set one field from its raw textual value, keyed by identifier.
    ///
    /// Toggles accept `true`/`false` (and the usual spellings); the
    /// `firmware` key accepts a firmware name and resets all three
    /// firmware toggles at once.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), ValidationError> {
        fn toggle(field: Field, value: &str) -> Result<bool, ValidationError> {
            match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ValidationError::Format { field }),
            }
        }

        match field {
            Field::BedSizeX => self.bed_size_x = value.to_string(),
            Field::BedSizeY => self.bed_size_y = value.to_string(),
            Field::OriginAtCenter => self.origin_at_center = toggle(field, value)?,
            Field::BedAutoCalibrate => self.bed_auto_calibrate = toggle(field, value)?,
            Field::HotendTemperature => self.hotend_temperature = value.to_string(),
            Field::BedTemperature => self.bed_temperature = value.to_string(),
            Field::FanSpeed => self.fan_speed = value.to_string(),
            Field::LineWidth => self.line_width = value.to_string(),
            Field::FirstLayerLineWidth => self.first_layer_line_width = value.to_string(),
            Field::LayerHeight => self.layer_height = value.to_string(),
            Field::PrintSpeed => self.print_speed = value.to_string(),
            Field::FirstLayerPrintSpeed => self.first_layer_print_speed = value.to_string(),
            Field::TravelSpeed => self.travel_speed = value.to_string(),
            Field::NumSegments => self.num_segments = value.to_string(),
            Field::InitRetractLength => self.init_retract_length = value.to_string(),
            Field::EndRetractLength => self.end_retract_length = value.to_string(),
            Field::InitRetractSpeed => self.init_retract_speed = value.to_string(),
            Field::EndRetractSpeed => self.end_retract_speed = value.to_string(),
            Field::SegmentHeight => self.segment_height = value.to_string(),
            Field::TowerSpacing => self.tower_spacing = value.to_string(),
            Field::ZOffset => self.z_offset = value.to_string(),
            Field::Flow => self.flow = value.to_string(),
            Field::KFactor => self.k_factor = value.to_string(),
            Field::Firmware => {
                let firmware: Firmware = value
                    .parse()
                    .map_err(|_| ValidationError::Format { field })?;
                self.firmware_marlin = firmware == Firmware::Marlin;
                self.firmware_klipper = firmware == Firmware::Klipper;
                self.firmware_rrf = firmware == Firmware::Rrf;
            }
            Field::Hardmode => self.hardmode = toggle(field, value)?,
            Field::StartGcode => self.start_gcode = value.to_string(),
            Field::EndGcode => self.end_gcode = value.to_string(),
        }
        Ok(())
    }
}

/// A fully validated, immutable calibration parameter set.
///
/// Constructed only by [`validate`]; no partially-valid instance is
/// observable. Deliberately not `Deserialize` so deserialization cannot
/// bypass validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub bed_size_x: f64,
    pub bed_size_y: f64,
    pub origin_at_center: bool,
    pub bed_auto_calibrate: bool,
    pub hotend_temperature: i32,
    pub bed_temperature: i32,
    /// Part-cooling fan duty, percent, clamped to 0..=100.
    pub fan_speed: u8,
    pub line_width: f64,
    pub first_layer_line_width: f64,
    pub layer_height: f64,
    pub print_speed: f64,
    pub first_layer_print_speed: f64,
    pub travel_speed: f64,
    pub num_segments: u32,
    pub init_retract_length: f64,
    pub end_retract_length: f64,
    pub init_retract_speed: f64,
    pub end_retract_speed: f64,
    pub segment_height: f64,
    pub tower_spacing: f64,
    pub z_offset: f64,
    pub flow: i32,
    pub k_factor: f64,
    pub firmware: Firmware,
    pub hardmode: bool,
    pub start_gcode: String,
    pub end_gcode: String,
}

fn decimal(field: Field, raw: &str) -> Result<f64, ValidationError> {
    parse_decimal(raw).ok_or(ValidationError::Format { field })
}

fn integer(field: Field, raw: &str) -> Result<i64, ValidationError> {
    parse_count(raw).ok_or(ValidationError::Format { field })
}

fn in_range(field: Field, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn bounded(field: Field, raw: &str, min: f64, max: f64) -> Result<f64, ValidationError> {
    in_range(field, decimal(field, raw)?, min, max)
}

/// Validate a raw field set into a [`Parameters`] instance.
///
/// Checks run per-field first (format, range), then cross-field at the
/// dependent field's slot: layer height against line width, tower
/// spacing against bed width, z-offset against layer height. The first
/// failure in the fixed field order is returned.
pub fn validate(raw: &RawParameters) -> Result<Parameters, ValidationError> {
    let bed_size_x = bounded(Field::BedSizeX, &raw.bed_size_x, 100.0, 1000.0)?;
    let bed_size_y = bounded(Field::BedSizeY, &raw.bed_size_y, 100.0, 1000.0)?;

    let hotend_temperature = integer(Field::HotendTemperature, &raw.hotend_temperature)?;
    let hotend_temperature =
        in_range(Field::HotendTemperature, hotend_temperature as f64, 150.0, 350.0)? as i32;

    // The heated bed is only bounded from above; unheated beds print at 0.
    let bed_temperature = integer(Field::BedTemperature, &raw.bed_temperature)?;
    if bed_temperature > 150 {
        return Err(ValidationError::OutOfRange {
            field: Field::BedTemperature,
            value: bed_temperature as f64,
            min: 0.0,
            max: 150.0,
        });
    }
    let bed_temperature = bed_temperature as i32;

    // Fan duty is clamped rather than rejected.
    let fan_speed = integer(Field::FanSpeed, &raw.fan_speed)?.clamp(0, 100) as u8;

    let line_width = bounded(Field::LineWidth, &raw.line_width, 0.1, 2.0)?;
    let first_layer_line_width =
        bounded(Field::FirstLayerLineWidth, &raw.first_layer_line_width, 0.1, 2.0)?;
    let layer_height = bounded(
        Field::LayerHeight,
        &raw.layer_height,
        0.05,
        line_width * 0.75,
    )?;

    let print_speed = bounded(Field::PrintSpeed, &raw.print_speed, 10.0, 1000.0)?;
    let first_layer_print_speed = bounded(
        Field::FirstLayerPrintSpeed,
        &raw.first_layer_print_speed,
        10.0,
        1000.0,
    )?;
    let travel_speed = bounded(Field::TravelSpeed, &raw.travel_speed, 10.0, 1000.0)?;

    let num_segments = integer(Field::NumSegments, &raw.num_segments)?;
    let num_segments =
        in_range(Field::NumSegments, num_segments as f64, 2.0, 100.0)? as u32;

    let init_retract_length =
        bounded(Field::InitRetractLength, &raw.init_retract_length, 0.0, 20.0)?;
    let end_retract_length =
        bounded(Field::EndRetractLength, &raw.end_retract_length, 0.0, 20.0)?;
    let init_retract_speed =
        bounded(Field::InitRetractSpeed, &raw.init_retract_speed, 5.0, 150.0)?;
    let end_retract_speed =
        bounded(Field::EndRetractSpeed, &raw.end_retract_speed, 5.0, 150.0)?;

    let segment_height = bounded(Field::SegmentHeight, &raw.segment_height, 0.5, 20.0)?;
    let tower_spacing = bounded(
        Field::TowerSpacing,
        &raw.tower_spacing,
        40.0,
        bed_size_x - 40.0,
    )?;
    let z_offset = in_range(
        Field::ZOffset,
        decimal(Field::ZOffset, &raw.z_offset)?,
        -layer_height,
        layer_height,
    )?;

    let flow = integer(Field::Flow, &raw.flow)?;
    let flow = in_range(Field::Flow, flow as f64, 50.0, 150.0)? as i32;

    let k_factor = bounded(Field::KFactor, &raw.k_factor, 0.0, 2.0)?;

    let firmware = match (raw.firmware_marlin, raw.firmware_klipper, raw.firmware_rrf) {
        (true, false, false) => Firmware::Marlin,
        (false, true, false) => Firmware::Klipper,
        (false, false, true) => Firmware::Rrf,
        _ => {
            return Err(ValidationError::MissingSelection {
                field: Field::Firmware,
            })
        }
    };

    let parameters = Parameters {
        bed_size_x,
        bed_size_y,
        origin_at_center: raw.origin_at_center,
        bed_auto_calibrate: raw.bed_auto_calibrate,
        hotend_temperature,
        bed_temperature,
        fan_speed,
        line_width,
        first_layer_line_width,
        layer_height,
        print_speed,
        first_layer_print_speed,
        travel_speed,
        num_segments,
        init_retract_length,
        end_retract_length,
        init_retract_speed,
        end_retract_speed,
        segment_height,
        tower_spacing,
        z_offset,
        flow,
        k_factor,
        firmware,
        hardmode: raw.hardmode,
        start_gcode: raw.start_gcode.clone(),
        end_gcode: raw.end_gcode.clone(),
    };

    tracing::debug!(
        firmware = %parameters.firmware,
        segments = parameters.num_segments,
        "parameters validated"
    );

    Ok(parameters)
}
