//! Editor tuning knobs.
//!
//! Every field has a default, so a host may pass a partial JSON object
//! (or nothing at all).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snap grid in graph units.
    pub grid_size: f64,

    // ── Placement ──
    /// Minimum distance between a dropped node and any existing node.
    pub min_spacing: f64,
    pub spiral_attempts: u32,
    pub spiral_base_radius: f64,
    pub spiral_radius_step: f64,

    // ── Canvas bounds ──
    pub canvas_padding: f64,
    pub edge_margin: f64,

    // ── Viewport ──
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Zoom-in factor; zoom-out uses `2 - zoom_step` (1.1 → 0.9).
    pub zoom_step: f64,
    pub pan_step: f64,
    pub pan_step_fast: f64,

    // ── Gestures ──
    /// Pointer travel (surface px) before a press on a port becomes a drag.
    pub drag_threshold: f64,
    /// Edge pick distance in surface px.
    pub edge_tolerance: f64,

    // ── Composites ──
    pub frame_padding: f64,
    pub fade_out_ms: f64,
    pub fade_in_ms: f64,
    pub fade_stagger_ms: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            min_spacing: 50.0,
            spiral_attempts: 20,
            spiral_base_radius: 50.0,
            spiral_radius_step: 20.0,
            canvas_padding: 50.0,
            edge_margin: 20.0,
            zoom_min: 0.1,
            zoom_max: 3.0,
            zoom_step: 1.1,
            pan_step: 10.0,
            pan_step_fast: 50.0,
            drag_threshold: 4.0,
            edge_tolerance: 6.0,
            frame_padding: 20.0,
            fade_out_ms: 200.0,
            fade_in_ms: 300.0,
            fade_stagger_ms: 30.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn zoom_out_step(&self) -> f64 {
        2.0 - self.zoom_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"grid_size": 25, "zoom_max": 4}"#).unwrap();
        assert_eq!(config.grid_size, 25.0);
        assert_eq!(config.zoom_max, 4.0);
        assert_eq!(config.min_spacing, 50.0);
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn zoom_out_mirrors_zoom_in() {
        assert!((EditorConfig::default().zoom_out_step() - 0.9).abs() < 1e-12);
    }
}
