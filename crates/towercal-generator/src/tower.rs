//! Default calibration tower toolpath engine
//!
//! Prints two square towers on zig-zag rafts, joined by a purge line
//! along the front of the bed. Each tower is sliced into vertical
//! segments; every travel move between perimeters retracts and
//! deretracts at the active segment's retraction pair, so each segment
//! of the finished print shows the stringing behavior of one schedule
//! entry. Output is bit-exact reproducible for a given request.

use crate::engine::{GenerationRequest, ToolpathEngine};
use crate::params::Parameters;
use crate::schedule::Segment;
use async_trait::async_trait;
use std::f64::consts::PI;
use towercal_core::{format_value, EngineError, Point};

const FILAMENT_DIAMETER: f64 = 1.75;
const RAFT_WIDTH: f64 = 30.0;
const TOWER_WIDTH: f64 = 15.0;

/// The built-in [`ToolpathEngine`].
#[derive(Debug, Default)]
pub struct TowerEngine;

#[async_trait]
impl ToolpathEngine for TowerEngine {
    fn name(&self) -> &str {
        "tower"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        TowerPrinter::new(request)?.generate()
    }
}

/// Suggested output file name encoding the calibration sweep.
pub fn suggested_file_name(params: &Parameters) -> String {
    format!(
        "RCT_H{}-B{}_{}-{}mm_{}-{}mms.gcode",
        params.hotend_temperature,
        params.bed_temperature,
        format_value(params.init_retract_length, 2),
        format_value(params.end_retract_length, 2),
        format_value(params.init_retract_speed, 0),
        format_value(params.end_retract_speed, 2),
    )
}

/// Emission state for one request: current position, extruder axis,
/// active feed rate, and the retraction pair of the segment being
/// printed.
struct TowerPrinter<'a> {
    params: &'a Parameters,
    segments: &'a [Segment],
    start_gcode: &'a str,
    end_gcode: &'a str,
    layers_per_segment: u32,
    gcode: String,
    current: Point,
    current_e: f64,
    current_speed: f64,
    retracted: bool,
    retract_length: f64,
    retract_speed: f64,
    /// Raft line width; recomputed from the zig-zag point spacing.
    first_layer_line_width: f64,
}

impl<'a> TowerPrinter<'a> {
    fn new(request: &'a GenerationRequest) -> Result<Self, EngineError> {
        let params = &request.parameters;

        if request.segments.len() < 2 {
            return Err(EngineError::Rejected {
                reason: format!(
                    "schedule has {} segment(s), need at least 2",
                    request.segments.len()
                ),
            });
        }

        let layers_per_segment = (params.segment_height / params.layer_height) as u32;
        if layers_per_segment < 1 {
            return Err(EngineError::Infeasible {
                reason: format!(
                    "segment height {}mm is below layer height {}mm",
                    format_value(params.segment_height, 2),
                    format_value(params.layer_height, 2),
                ),
            });
        }

        Ok(Self {
            params,
            segments: &request.segments,
            start_gcode: &request.start_gcode,
            end_gcode: &request.end_gcode,
            layers_per_segment,
            gcode: String::new(),
            current: Point::default(),
            current_e: 0.0,
            current_speed: params.first_layer_print_speed,
            retracted: false,
            retract_length: request.segments[0].retract_length,
            retract_speed: request.segments[0].retract_speed,
            first_layer_line_width: params.first_layer_line_width,
        })
    }

    fn generate(mut self) -> Result<String, EngineError> {
        let p = self.params;
        tracing::debug!(
            segments = self.segments.len(),
            layers_per_segment = self.layers_per_segment,
            hardmode = p.hardmode,
            "generating tower toolpath"
        );

        self.emit_header();

        self.gcode.push_str(self.start_gcode);
        self.gcode.push('\n');

        let fan_pwm = (f64::from(p.fan_speed) * 2.55) as i32;
        self.gcode.push_str("M82\n");
        self.gcode.push_str(&format!("M106 S{}\n", fan_pwm / 3));

        let bed_center = if p.origin_at_center {
            Point::new(0.0, 0.0, p.layer_height)
        } else {
            Point::new(p.bed_size_x / 2.0, p.bed_size_y / 2.0, p.layer_height)
        };
        let left_tower = Point::new(bed_center.x - p.tower_spacing / 2.0, bed_center.y, bed_center.z);
        let right_tower = Point::new(bed_center.x + p.tower_spacing / 2.0, bed_center.y, bed_center.z);

        // First layer feed until the Z lift below overrides it.
        self.current_e = 0.0;
        self.current_speed = p.first_layer_print_speed;
        self.current = Point::default();

        // Purge line along the front, widthwise across both towers.
        let purge_start = Point::new(left_tower.x - 15.0, left_tower.y - 25.0, p.layer_height);
        let mut purge_two = purge_start;
        purge_two.x = right_tower.x + 15.0;
        let mut purge_three = purge_two;
        purge_three.y += self.first_layer_line_width;
        let mut purge_end = purge_three;
        purge_end.x = purge_start.x;

        // Lift to the first layer, then tell the printer it sits at the
        // nominal layer height so the z-offset stays invisible downstream.
        self.gcode.push_str(&format!(
            "G1 Z{} F450\n",
            format_value(p.layer_height + p.z_offset, 2)
        ));
        self.current_speed = 450.0 / 60.0;
        self.gcode
            .push_str(&format!("G92 Z{}\n", format_value(p.layer_height, 2)));
        self.current.z = p.layer_height;

        self.move_to(purge_start, 0.0);
        self.move_to(purge_two, self.first_layer_line_width);
        self.move_to(purge_three, self.first_layer_line_width);
        self.move_to(purge_end, self.first_layer_line_width);

        // Rafts under both towers.
        let mut raft = self.zigzag_trajectory(left_tower);
        self.move_to(raft[0], 0.0);
        for i in 1..raft.len() {
            self.move_to(raft[i], self.first_layer_line_width);
        }
        for point in &mut raft {
            point.x += p.tower_spacing;
        }
        self.move_to(raft[0], 0.0);
        for i in 1..raft.len() {
            self.move_to(raft[i], self.first_layer_line_width);
        }

        // Tower walls, one segment of the schedule at a time.
        let total_layers = self.segments.len() as u32 * self.layers_per_segment;
        let mut segment_index = 0usize;
        for layer in 1..total_layers {
            self.current.z += p.layer_height;
            self.gcode.push_str(&format!(
                ";layer #{}\n",
                format_value(self.current.z / p.layer_height, 0)
            ));

            // Fan ramps over the first tower layers.
            if layer == 1 {
                self.gcode.push_str(&format!("M106 S{}\n", fan_pwm * 2 / 3));
            } else if layer == 2 {
                self.gcode.push_str(&format!("M106 S{}\n", fan_pwm));
            }

            // Segment boundaries print a marginally wider wall, leaving a
            // visible notch between segments.
            let tower_width = if layer % self.layers_per_segment == 0 {
                segment_index = (segment_index + 1).min(self.segments.len() - 1);
                self.retract_length = self.segments[segment_index].retract_length.max(0.1);
                self.retract_speed = self.segments[segment_index].retract_speed.max(5.0);
                TOWER_WIDTH + p.line_width / 2.0
            } else {
                TOWER_WIDTH
            };

            let first_is_right = if p.hardmode { true } else { layer % 2 != 0 };
            let (first_center, second_center) = if first_is_right {
                (right_tower, left_tower)
            } else {
                (left_tower, right_tower)
            };

            let trajectory = self.tower_trajectory(first_center, tower_width, first_is_right);
            self.move_to(trajectory[0], 0.0);

            self.gcode.push_str(&format!(
                "G1 Z{} F300\n",
                format_value(self.current.z, 2)
            ));
            self.current_speed = 300.0 / 60.0;

            for point in &trajectory[1..] {
                self.move_to(*point, p.line_width);
            }

            let trajectory = self.tower_trajectory(second_center, tower_width, !first_is_right);
            self.move_to(trajectory[0], 0.0);
            for point in &trajectory[1..] {
                self.move_to(*point, p.line_width);
            }
        }

        self.gcode.push_str(";end gcode\n");
        self.gcode.push_str(self.end_gcode);

        Ok(self.gcode)
    }

    fn emit_header(&mut self) {
        let p = self.params;
        let step = (p.end_retract_length - p.init_retract_length)
            / (self.segments.len() as f64 - 1.0);
        self.gcode.push_str(&format!(
            "; generated by towercal retraction calibration towers v{}\n",
            env!("CARGO_PKG_VERSION")
        ));
        self.gcode.push_str(&format!(
            ";Bedsize: {}:{}\n",
            format_value(p.bed_size_x, 2),
            format_value(p.bed_size_y, 2)
        ));
        self.gcode.push_str(&format!(
            ";Temp: {}/{}\n",
            p.hotend_temperature, p.bed_temperature
        ));
        self.gcode.push_str(&format!(
            ";Width: {}-{}\n",
            format_value(p.line_width, 2),
            format_value(p.first_layer_line_width, 2)
        ));
        self.gcode.push_str(&format!(
            ";Layer height: {}\n",
            format_value(p.layer_height, 2)
        ));
        self.gcode.push_str(&format!(
            ";Retract length: {}, {}/segment\n",
            format_value(p.init_retract_length, 2),
            format_value(step, 2)
        ));
        self.gcode.push_str(&format!(
            ";Segments: {}x{} mm\n",
            self.segments.len(),
            format_value(p.segment_height, 2)
        ));
        self.gcode.push_str(&crate::schedule::format_summary(self.segments));
    }

    /// Emit one move. `width > 0` extrudes a line of that width; width 0
    /// is a travel, wrapped in retraction/deretraction unless it only
    /// changes Z.
    fn move_to(&mut self, target: Point, width: f64) {
        let extrude = width > 0.0;
        let only_z = self.current.x == target.x && self.current.y == target.y;

        if !extrude && !only_z {
            self.retract();
        }

        let mut command = String::from("G1");

        if target.x != self.current.x {
            command.push_str(&format!(" X{}", format_value(target.x, 2)));
        }
        if target.y != self.current.y {
            command.push_str(&format!(" Y{}", format_value(target.y, 2)));
        }

        // Z moves never extrude; XY extrusions below the minimum line
        // length carry no E word either.
        if target.z != self.current.z {
            command.push_str(&format!(" Z{}", format_value(target.z, 2)));
        } else if extrude && self.current.xy_distance_to(&target) > 0.8 {
            let e = self.current_e + self.extrusion(target, width);
            command.push_str(&format!(" E{}", format_value(e, 4)));
            self.current_e = e;
        }

        if extrude {
            if self.current.z < self.params.layer_height * 2.0 {
                command.push_str(&format!(
                    " F{}",
                    format_value(self.params.first_layer_print_speed * 60.0, 0)
                ));
                self.current_speed = self.params.first_layer_print_speed;
            } else if self.current_speed != self.params.print_speed {
                command.push_str(&format!(
                    " F{}",
                    format_value(self.params.print_speed * 60.0, 0)
                ));
                self.current_speed = self.params.print_speed;
            }
        } else if self.current_speed != self.params.travel_speed {
            command.push_str(&format!(
                " F{}",
                format_value(self.params.travel_speed * 60.0, 0)
            ));
            self.current_speed = self.params.travel_speed;
        }

        command.push('\n');
        self.gcode.push_str(&command);
        self.current = target;

        if !extrude && !only_z {
            self.deretract();
        }
    }

    fn extrusion(&self, target: Point, width: f64) -> f64 {
        let line_length = self.current.xy_distance_to(&target);
        width * self.params.layer_height * line_length * 4.0 / PI / FILAMENT_DIAMETER.powi(2)
    }

    fn retract(&mut self) {
        if self.retracted {
            tracing::warn!("retraction requested while already retracted");
            return;
        }
        self.retracted = true;
        self.current_speed = self.retract_speed;
        self.gcode.push_str(&format!(
            "G1 E{} F{}\n",
            format_value(self.current_e - self.retract_length, 2),
            format_value(self.retract_speed * 60.0, 0)
        ));
    }

    fn deretract(&mut self) {
        if !self.retracted {
            tracing::warn!("deretraction requested while not retracted");
            return;
        }
        self.retracted = false;
        self.current_speed = self.retract_speed;
        self.gcode.push_str(&format!(
            "G1 E{} F{}\n",
            format_value(self.current_e, 2),
            format_value(self.retract_speed * 60.0, 0)
        ));
    }

    /// Zig-zag raft infill across a square footprint centered under a
    /// tower. Point spacing is quantized to an odd per-side count so the
    /// path closes; the effective raft line width follows the spacing.
    fn zigzag_trajectory(&mut self, tower_center: Point) -> Vec<Point> {
        let side_length = RAFT_WIDTH - self.first_layer_line_width;
        let mut points_on_side =
            (side_length / (self.first_layer_line_width * 2f64.sqrt())) as usize;
        points_on_side -= (points_on_side - 1) % 2;
        let point_spacing = side_length / (points_on_side - 1) as f64;
        self.first_layer_line_width = point_spacing / 2f64.sqrt();

        let total_points = points_on_side * 4 - 4;
        let mut ring = vec![Point::default(); total_points];

        let min_x = tower_center.x - side_length / 2.0;
        let min_y = tower_center.y - side_length / 2.0;
        let max_x = tower_center.x + side_length / 2.0;
        let max_y = tower_center.y + side_length / 2.0;

        // Perimeter points, clockwise from the top-left corner.
        for i in 0..points_on_side {
            ring[i].x = min_x + point_spacing * i as f64;
            ring[i].y = max_y;
        }
        for i in 1..points_on_side {
            ring[points_on_side + i - 1].x = max_x;
            ring[points_on_side + i - 1].y = max_y - point_spacing * i as f64;
        }
        for i in 1..points_on_side {
            ring[points_on_side * 2 + i - 2].x = max_x - point_spacing * i as f64;
            ring[points_on_side * 2 + i - 2].y = min_y;
        }
        for i in 1..points_on_side - 1 {
            ring[points_on_side * 3 + i - 3].x = min_x;
            ring[points_on_side * 3 + i - 3].y = min_y + point_spacing * i as f64;
        }

        // Reorder the ring so consecutive points cross the footprint.
        let mut trajectory = vec![Point::default(); total_points];
        trajectory[0] = ring[0];
        trajectory[1] = ring[total_points - 1];
        trajectory[2] = ring[1];
        trajectory[3] = ring[2];
        let mut i = 4;
        while i < total_points {
            let j = i / 2;
            trajectory[i] = ring[total_points - j];
            trajectory[i + 1] = ring[total_points - j - 1];
            trajectory[i + 2] = ring[j + 1];
            trajectory[i + 3] = ring[j + 2];
            i += 4;
        }

        for point in &mut trajectory {
            point.z = self.current.z;
        }
        trajectory
    }

    /// Two concentric square perimeters for one tower layer. Right-hand
    /// towers are entered rotated a quarter turn so their seam sits on a
    /// different corner than the left tower's.
    fn tower_trajectory(&self, center: Point, tower_width: f64, rotate: bool) -> Vec<Point> {
        let mut trajectory =
            self.square_trajectory(center, tower_width - 2.3 * self.params.line_width);
        trajectory.extend(self.square_trajectory(center, tower_width - 0.5 * self.params.line_width));
        if rotate {
            trajectory = rotate_square_cw(&trajectory);
        }
        trajectory
    }

    fn square_trajectory(&self, center: Point, size: f64) -> Vec<Point> {
        // 2----3
        // |    |
        // 1---0,4
        let z = self.current.z;
        let east = center.x + size / 2.0;
        let west = center.x - size / 2.0;
        let north = center.y + size / 2.0;
        let south = center.y - size / 2.0;
        vec![
            Point::new(east, south, z),
            Point::new(west, south, z),
            Point::new(west, north, z),
            Point::new(east, north, z),
            Point::new(east, south, z),
        ]
    }
}

/// Shift every loop of five square corners one corner forward, turning
/// the print direction a quarter turn.
fn rotate_square_cw(trajectory: &[Point]) -> Vec<Point> {
    let mut rotated = vec![Point::default(); trajectory.len()];
    for i in 0..trajectory.len() {
        if (i + 1) % 5 == 0 {
            rotated[i] = trajectory[i - 3];
        } else {
            rotated[i] = trajectory[i + 1];
        }
    }
    rotated
}
