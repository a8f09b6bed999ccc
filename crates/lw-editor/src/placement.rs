//! Collision-avoiding placement for dropped nodes.
//!
//! Starts at the grid-snapped drop point and walks outward on a spiral
//! until the candidate is at least `min_spacing` from every existing node
//! position, or the attempt budget runs out (then the last candidate wins).

use crate::config::EditorConfig;
use kurbo::Point;
use lw_core::geometry::{snap_to_grid, too_close};
use std::f64::consts::TAU;

pub fn find_free_position(raw: Point, existing: &[Point], config: &EditorConfig) -> Point {
    let grid = config.grid_size;
    let mut candidate = snap_to_grid(raw, grid);
    let mut attempts = 0;

    while too_close(candidate, existing, config.min_spacing) && attempts < config.spiral_attempts {
        let angle = attempts as f64 / config.spiral_attempts as f64 * TAU;
        let radius = config.spiral_base_radius + attempts as f64 * config.spiral_radius_step;
        candidate = snap_to_grid(
            Point::new(raw.x + angle.cos() * radius, raw.y + angle.sin() * radius),
            grid,
        );
        attempts += 1;
    }

    if attempts > 0 {
        log::debug!(
            "placement: moved drop ({}, {}) to ({}, {}) after {attempts} attempts",
            raw.x,
            raw.y,
            candidate.x,
            candidate.y
        );
    }
    candidate
}
