//! Shared data types
//!
//! Field identifiers for the calibration inputs, the firmware selection,
//! and the toolpath coordinate type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a calibration input field.
///
/// The `Display` form is the stable identifier the presentation layer keys
/// localized messages and persisted values on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    BedSizeX,
    BedSizeY,
    OriginAtCenter,
    BedAutoCalibrate,
    HotendTemperature,
    BedTemperature,
    FanSpeed,
    LineWidth,
    FirstLayerLineWidth,
    LayerHeight,
    PrintSpeed,
    FirstLayerPrintSpeed,
    TravelSpeed,
    NumSegments,
    InitRetractLength,
    EndRetractLength,
    InitRetractSpeed,
    EndRetractSpeed,
    SegmentHeight,
    TowerSpacing,
    ZOffset,
    Flow,
    KFactor,
    Firmware,
    Hardmode,
    StartGcode,
    EndGcode,
}

impl Field {
    /// Stable snake_case identifier of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BedSizeX => "bed_size_x",
            Self::BedSizeY => "bed_size_y",
            Self::OriginAtCenter => "origin_at_center",
            Self::BedAutoCalibrate => "bed_auto_calibrate",
            Self::HotendTemperature => "hotend_temperature",
            Self::BedTemperature => "bed_temperature",
            Self::FanSpeed => "fan_speed",
            Self::LineWidth => "line_width",
            Self::FirstLayerLineWidth => "first_layer_line_width",
            Self::LayerHeight => "layer_height",
            Self::PrintSpeed => "print_speed",
            Self::FirstLayerPrintSpeed => "first_layer_print_speed",
            Self::TravelSpeed => "travel_speed",
            Self::NumSegments => "num_segments",
            Self::InitRetractLength => "init_retract_length",
            Self::EndRetractLength => "end_retract_length",
            Self::InitRetractSpeed => "init_retract_speed",
            Self::EndRetractSpeed => "end_retract_speed",
            Self::SegmentHeight => "segment_height",
            Self::TowerSpacing => "tower_spacing",
            Self::ZOffset => "z_offset",
            Self::Flow => "flow",
            Self::KFactor => "k_factor",
            Self::Firmware => "firmware",
            Self::Hardmode => "hardmode",
            Self::StartGcode => "start_gcode",
            Self::EndGcode => "end_gcode",
        }
    }

    /// All input fields, in the order the validator checks them.
    pub fn all() -> &'static [Field] {
        &[
            Self::BedSizeX,
            Self::BedSizeY,
            Self::OriginAtCenter,
            Self::BedAutoCalibrate,
            Self::HotendTemperature,
            Self::BedTemperature,
            Self::FanSpeed,
            Self::LineWidth,
            Self::FirstLayerLineWidth,
            Self::LayerHeight,
            Self::PrintSpeed,
            Self::FirstLayerPrintSpeed,
            Self::TravelSpeed,
            Self::NumSegments,
            Self::InitRetractLength,
            Self::EndRetractLength,
            Self::InitRetractSpeed,
            Self::EndRetractSpeed,
            Self::SegmentHeight,
            Self::TowerSpacing,
            Self::ZOffset,
            Self::Flow,
            Self::KFactor,
            Self::Firmware,
            Self::Hardmode,
            Self::StartGcode,
            Self::EndGcode,
        ]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::all()
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// Target firmware for placeholder expansion.
///
/// Exactly one firmware is selected per parameter set; the validator
/// enforces the exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Firmware {
    /// Marlin (`M900` Linear Advance)
    Marlin,
    /// Klipper (`SET_PRESSURE_ADVANCE`)
    Klipper,
    /// RepRapFirmware (`M572` Pressure Advance)
    Rrf,
}

impl fmt::Display for Firmware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marlin => write!(f, "marlin"),
            Self::Klipper => write!(f, "klipper"),
            Self::Rrf => write!(f, "rrf"),
        }
    }
}

impl FromStr for Firmware {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marlin" => Ok(Self::Marlin),
            "klipper" => Ok(Self::Klipper),
            "rrf" | "reprap" | "reprapfirmware" => Ok(Self::Rrf),
            _ => Err(format!("Unknown firmware: {}", s)),
        }
    }
}

/// A nozzle position in machine coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance to `other` projected on the XY plane.
    pub fn xy_distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_identifier_round_trip() {
        for field in Field::all() {
            let parsed: Field = field.as_str().parse().unwrap();
            assert_eq!(parsed, *field);
        }
    }

    #[test]
    fn test_field_unknown() {
        assert!("nozzle_diameter".parse::<Field>().is_err());
    }

    #[test]
    fn test_firmware_from_str() {
        assert_eq!("marlin".parse::<Firmware>().unwrap(), Firmware::Marlin);
        assert_eq!("Klipper".parse::<Firmware>().unwrap(), Firmware::Klipper);
        assert_eq!(
            "reprapfirmware".parse::<Firmware>().unwrap(),
            Firmware::Rrf
        );
        assert!("smoothieware".parse::<Firmware>().is_err());
    }

    #[test]
    fn test_xy_distance_ignores_z() {
        let a = Point::new(0.0, 0.0, 1.0);
        let b = Point::new(3.0, 4.0, 7.0);
        assert_eq!(a.xy_distance_to(&b), 5.0);
    }
}
