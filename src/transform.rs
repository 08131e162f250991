//! Coordinate transformation logic for pan/zoom on the board canvas
//!
//! This module contains pure coordinate transformation logic that can be
//! easily unit tested without a running egui context. Every operation takes
//! a `TransformState` by value and returns a new one.

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum zoom level (10%)
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom level (500%)
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom delta per wheel unit (DOM convention: positive = scroll down = zoom out)
pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.001;

/// Zoom delta applied by the +/- buttons and keyboard shortcuts
pub const ZOOM_STEP: f32 = 0.1;

/// View transformation state for the infinite canvas
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Zoom level: 1.0 = actual size, always within `MIN_ZOOM..=MAX_ZOOM`
    pub zoom: f32,
    /// Pan offset in screen coordinates (pixels), unconstrained
    pub pan: Vec2,
    /// Whether a pan gesture is in progress
    pub is_panning: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            is_panning: false,
        }
    }
}

impl TransformState {
    /// Create a new transform at actual size with no pan
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the default view. The panning flag is cleared as well.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Check if transform is at default state (for showing/hiding reset button)
    pub fn is_default(&self) -> bool {
        (self.zoom - 1.0).abs() < 0.001 && self.pan.length() < 0.5
    }

    /// Zoom by `delta` around `center` (element-local screen coordinates).
    ///
    /// The pan delta from [`apply_zoom`] is added onto the current pan and the
    /// panning flag is carried over unchanged.
    #[must_use]
    pub fn zoom_at(self, delta: f32, center: Pos2) -> Self {
        let step = apply_zoom(self.zoom, delta, center);
        Self {
            zoom: step.zoom,
            pan: self.pan + step.pan,
            is_panning: self.is_panning,
        }
    }

    /// Apply a pan delta (in screen coordinates). Non-finite deltas are ignored.
    #[must_use]
    pub fn pan_by(self, delta: Vec2) -> Self {
        if !delta.is_finite() {
            return self;
        }
        Self {
            pan: self.pan + delta,
            ..self
        }
    }

    /// Set or clear the panning flag
    #[must_use]
    pub fn with_panning(self, is_panning: bool) -> Self {
        Self { is_panning, ..self }
    }
}

/// Convert a screen position to canvas coordinates.
///
/// `element_origin` is the on-screen top-left corner of the canvas element;
/// it is removed first, then pan and zoom are undone.
pub fn screen_to_canvas(screen: Pos2, element_origin: Pos2, state: &TransformState) -> Pos2 {
    let rel = screen - element_origin;
    Pos2::new(
        (rel.x - state.pan.x) / state.zoom,
        (rel.y - state.pan.y) / state.zoom,
    )
}

/// Convert a canvas position to element-local screen coordinates.
///
/// The element origin is not added here; the renderer applies it as an
/// outer translation.
pub fn canvas_to_screen(canvas: Pos2, state: &TransformState) -> Pos2 {
    Pos2::new(
        canvas.x * state.zoom + state.pan.x,
        canvas.y * state.zoom + state.pan.y,
    )
}

/// Compute the zoom produced by a gesture of `delta` centered on `center`.
///
/// The returned `pan` is a delta to add onto the existing pan, not an
/// absolute offset. When clamping leaves the zoom unchanged the delta is zero.
/// `is_panning` in the result is always false; callers keep their own flag.
/// A non-finite `delta` or `center` is a no-op as well.
///
/// The math: with `f = new_zoom / current_zoom` the delta is `c - c * f`, which
/// keeps `c` fixed exactly when the current pan is zero. With a non-zero pan
/// the anchor drifts by `pan * (f - 1)`; see `DESIGN.md`.
pub fn apply_zoom(current_zoom: f32, delta: f32, center: Pos2) -> TransformState {
    let new_zoom = (current_zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

    if !delta.is_finite() || !center.is_finite() || new_zoom == current_zoom {
        return TransformState {
            zoom: current_zoom,
            pan: Vec2::ZERO,
            is_panning: false,
        };
    }

    let zoom_factor = new_zoom / current_zoom;
    let c = center.to_vec2();

    TransformState {
        zoom: new_zoom,
        pan: c - c * zoom_factor,
        is_panning: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(zoom: f32, pan_x: f32, pan_y: f32) -> TransformState {
        TransformState {
            zoom,
            pan: Vec2::new(pan_x, pan_y),
            is_panning: false,
        }
    }

    fn assert_pos_near(actual: Pos2, expected: Pos2) {
        assert!(
            (actual.x - expected.x).abs() < 0.001 && (actual.y - expected.y).abs() < 0.001,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_default_transform() {
        let t = TransformState::new();
        assert!((t.zoom - 1.0).abs() < 0.001);
        assert!(t.pan.length() < 0.001);
        assert!(!t.is_panning);
        assert!(t.is_default());
    }

    #[test]
    fn test_reset() {
        let t = state(2.5, 100.0, 50.0).with_panning(true);
        assert!(!t.is_default());

        let t = t.reset();
        assert!(t.is_default());
        assert!(!t.is_panning);
    }

    #[test]
    fn test_screen_to_canvas_identity() {
        let t = state(1.0, 0.0, 0.0);
        let p = screen_to_canvas(Pos2::new(100.0, 150.0), Pos2::ZERO, &t);
        assert_pos_near(p, Pos2::new(100.0, 150.0));
    }

    #[test]
    fn test_screen_to_canvas_zoom_and_pan() {
        assert_pos_near(
            screen_to_canvas(Pos2::new(100.0, 150.0), Pos2::ZERO, &state(2.0, 0.0, 0.0)),
            Pos2::new(50.0, 75.0),
        );
        assert_pos_near(
            screen_to_canvas(Pos2::new(100.0, 150.0), Pos2::ZERO, &state(1.0, 50.0, 75.0)),
            Pos2::new(50.0, 75.0),
        );
        assert_pos_near(
            screen_to_canvas(Pos2::new(100.0, 150.0), Pos2::ZERO, &state(2.0, 50.0, 75.0)),
            Pos2::new(25.0, 37.5),
        );
        assert_pos_near(
            screen_to_canvas(Pos2::new(100.0, 150.0), Pos2::ZERO, &state(0.5, 0.0, 0.0)),
            Pos2::new(200.0, 300.0),
        );
    }

    #[test]
    fn test_screen_to_canvas_subtracts_element_origin() {
        let t = state(2.0, 10.0, 20.0);
        let origin = Pos2::new(30.0, 40.0);
        // (130 - 30 - 10) / 2, (160 - 40 - 20) / 2
        let p = screen_to_canvas(Pos2::new(130.0, 160.0), origin, &t);
        assert_pos_near(p, Pos2::new(45.0, 50.0));
    }

    #[test]
    fn test_canvas_to_screen() {
        assert_pos_near(
            canvas_to_screen(Pos2::new(100.0, 150.0), &state(1.0, 0.0, 0.0)),
            Pos2::new(100.0, 150.0),
        );
        assert_pos_near(
            canvas_to_screen(Pos2::new(100.0, 150.0), &state(2.0, 0.0, 0.0)),
            Pos2::new(200.0, 300.0),
        );
        assert_pos_near(
            canvas_to_screen(Pos2::new(100.0, 150.0), &state(1.0, 50.0, 75.0)),
            Pos2::new(150.0, 225.0),
        );
        assert_pos_near(
            canvas_to_screen(Pos2::new(100.0, 150.0), &state(2.0, 50.0, 75.0)),
            Pos2::new(250.0, 375.0),
        );
    }

    /// Screen -> canvas -> screen recovers the element-relative point
    #[test]
    fn test_round_trip() {
        let origin = Pos2::new(12.0, 34.0);
        let states = [
            state(1.0, 0.0, 0.0),
            state(0.1, -300.0, 45.5),
            state(2.75, 120.0, -80.0),
            state(5.0, 1.0e4, -1.0e4),
        ];
        let points = [
            Pos2::new(0.0, 0.0),
            Pos2::new(400.0, 300.0),
            Pos2::new(-250.0, 1234.5),
        ];

        for t in &states {
            for &screen in &points {
                let canvas = screen_to_canvas(screen, origin, t);
                let back = canvas_to_screen(canvas, t);
                let expected = screen - origin.to_vec2();
                let tolerance = 0.01 * (1.0 + expected.x.abs().max(expected.y.abs()) / 100.0);
                assert!(
                    (back.x - expected.x).abs() < tolerance && (back.y - expected.y).abs() < tolerance,
                    "round trip of {:?} under {:?} gave {:?}",
                    screen,
                    t,
                    back
                );
            }
        }
    }

    #[test]
    fn test_apply_zoom_in_from_point() {
        let result = apply_zoom(1.0, 0.1, Pos2::new(400.0, 300.0));
        assert!((result.zoom - 1.1).abs() < 0.0001);
        assert!((result.pan.x - -40.0).abs() < 0.01);
        assert!((result.pan.y - -30.0).abs() < 0.01);
        assert!(!result.is_panning);
    }

    #[test]
    fn test_apply_zoom_out_from_point() {
        let result = apply_zoom(1.0, -0.1, Pos2::new(400.0, 300.0));
        assert!((result.zoom - 0.9).abs() < 0.0001);
        assert!((result.pan.x - 40.0).abs() < 0.01);
        assert!((result.pan.y - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_apply_zoom_clamps() {
        let result = apply_zoom(0.1, -0.2, Pos2::new(400.0, 300.0));
        assert_eq!(result.zoom, MIN_ZOOM);
        assert_eq!(result.pan, Vec2::ZERO);

        let result = apply_zoom(5.0, 1.0, Pos2::new(400.0, 300.0));
        assert_eq!(result.zoom, MAX_ZOOM);
        assert_eq!(result.pan, Vec2::ZERO);
    }

    #[test]
    fn test_apply_zoom_clamping_property() {
        let deltas = [-100.0, -5.0, -1.0, -0.25, -0.001, 0.0, 0.001, 0.3, 2.0, 4.9, 100.0];
        let mut zoom = MIN_ZOOM;
        while zoom <= MAX_ZOOM {
            for &delta in &deltas {
                let result = apply_zoom(zoom, delta, Pos2::new(123.0, 456.0));
                assert!(
                    (MIN_ZOOM..=MAX_ZOOM).contains(&result.zoom),
                    "zoom {} + {} escaped to {}",
                    zoom,
                    delta,
                    result.zoom
                );
            }
            zoom += 0.07;
        }
    }

    #[test]
    fn test_apply_zoom_zero_delta_is_noop() {
        for &z in &[MIN_ZOOM, 0.5, 1.0, 3.3, MAX_ZOOM] {
            let result = apply_zoom(z, 0.0, Pos2::new(400.0, 300.0));
            assert_eq!(result.zoom, z);
            assert_eq!(result.pan, Vec2::ZERO);
        }
    }

    /// The canvas point under the cursor stays under the cursor
    #[test]
    fn test_zoom_at_keeps_focal_point_fixed() {
        let before = state(1.3, 0.0, 0.0);
        let cursor = Pos2::new(320.0, 210.0);
        let anchor = screen_to_canvas(cursor, Pos2::ZERO, &before);

        let after = before.zoom_at(0.4, cursor);
        let anchor_after = screen_to_canvas(cursor, Pos2::ZERO, &after);

        assert!((after.zoom - 1.7).abs() < 0.0001);
        assert_pos_near(anchor_after, anchor);
    }

    #[test]
    fn test_zoom_at_adds_delta_to_existing_pan() {
        let t = state(1.0, 100.0, -20.0).zoom_at(0.1, Pos2::new(400.0, 300.0));
        assert!((t.pan.x - 60.0).abs() < 0.01);
        assert!((t.pan.y - -50.0).abs() < 0.01);
    }

    #[test]
    fn test_zoom_at_preserves_panning_flag() {
        let t = state(1.0, 0.0, 0.0).with_panning(true);
        let t = t.zoom_at(0.1, Pos2::new(400.0, 300.0));
        assert!(t.is_panning);
    }

    #[test]
    fn test_zoom_at_boundary_leaves_pan_alone() {
        let t = state(MAX_ZOOM, 15.0, 25.0);
        let t = t.zoom_at(1.0, Pos2::new(400.0, 300.0));
        assert_eq!(t.zoom, MAX_ZOOM);
        assert_eq!(t.pan, Vec2::new(15.0, 25.0));
    }

    #[test]
    fn test_pan_by() {
        let t = TransformState::new().pan_by(Vec2::new(10.0, 20.0));
        assert!((t.pan.x - 10.0).abs() < 0.001);
        assert!((t.pan.y - 20.0).abs() < 0.001);

        let t = t.pan_by(Vec2::new(-5.0, -10.0));
        assert!((t.pan.x - 5.0).abs() < 0.001);
        assert!((t.pan.y - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_is_default_tracks_pan_and_zoom() {
        let t = TransformState::new();
        assert!(t.is_default(), "Fresh transform should be default");
        assert!(!t.pan_by(Vec2::new(10.0, 0.0)).is_default(), "Panned transform should not be default");
        assert!(!t.zoom_at(0.5, Pos2::ZERO).is_default(), "Zoomed transform should not be default");
    }

    #[test]
    fn test_non_finite_zoom_is_ignored() {
        for delta in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let step = apply_zoom(1.0, delta, Pos2::new(10.0, 10.0));
            assert_eq!(step.zoom, 1.0);
            assert_eq!(step.pan, Vec2::ZERO);
        }

        let step = apply_zoom(1.0, 0.5, Pos2::new(f32::NAN, 0.0));
        assert_eq!(step.zoom, 1.0);
        assert_eq!(step.pan, Vec2::ZERO);

        let state = TransformState::new().zoom_at(f32::NAN, Pos2::ZERO);
        assert!(state.is_default());
    }

    #[test]
    fn test_non_finite_pan_is_ignored() {
        let state = TransformState::new()
            .pan_by(Vec2::new(3.0, 4.0))
            .pan_by(Vec2::new(f32::NAN, 1.0))
            .pan_by(Vec2::new(0.0, f32::INFINITY));
        assert_eq!(state.pan, Vec2::new(3.0, 4.0));
    }
}
