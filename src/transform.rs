//! View transform of the displayed result image.
//!
//! The image is rendered as `scale(S)` followed by `translate(Tx, Ty)` with the
//! transform origin pinned to the image's top-left corner. Translation lives in
//! the pre-scale coordinate space, so a screen point `p` of the untransformed
//! image ends up at `origin + S * (p + T)`.

use crate::geometry::clamp;

/// Minimum zoom level.
pub const SCALE_MIN: f32 = 0.5;

/// Maximum zoom level.
pub const SCALE_MAX: f32 = 5.0;

/// Zoom multiplier for one zoom-in step (wheel tick up, zoom-in button).
pub const ZOOM_IN_FACTOR: f32 = 1.2;

/// Zoom multiplier for one zoom-out step.
pub const ZOOM_OUT_FACTOR: f32 = 0.8;

/// Scale, pan offset and drag state of the current result image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    scale: f32,
    translate_x: f32,
    translate_y: f32,
    is_dragging: bool,
    drag_anchor_x: f32,
    drag_anchor_y: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            is_dragging: false,
            drag_anchor_x: 0.0,
            drag_anchor_y: 0.0,
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translation(&self) -> [f32; 2] {
        [self.translate_x, self.translate_y]
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Whether the image is magnified past its fitted size (panning allowed).
    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }

    /// Restores the identity transform and ends any drag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Multiplies the scale by `factor`, clamped to [`SCALE_MIN`, `SCALE_MAX`].
    ///
    /// Non-positive or non-finite factors are ignored.
    pub fn apply_zoom(&mut self, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            log::debug!("Ignoring invalid zoom factor {factor}");
            return;
        }
        self.scale = clamp(self.scale * factor, SCALE_MIN, SCALE_MAX);
    }

    /// Starts panning at the given pointer position. Has no effect unless zoomed in.
    ///
    /// Returns whether a drag is now active.
    pub fn begin_drag(&mut self, pointer_x: f32, pointer_y: f32) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        self.is_dragging = true;
        self.drag_anchor_x = pointer_x - self.translate_x;
        self.drag_anchor_y = pointer_y - self.translate_y;
        true
    }

    /// Moves the pan offset so the anchor follows the pointer. No-op when idle.
    pub fn update_drag(&mut self, pointer_x: f32, pointer_y: f32) -> bool {
        if !self.is_dragging {
            return false;
        }
        self.translate_x = pointer_x - self.drag_anchor_x;
        self.translate_y = pointer_y - self.drag_anchor_y;
        true
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    /// Zoom readout value, `round(scale * 100)`.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom_percent())
    }

    pub fn render(&self) -> RenderTransform {
        RenderTransform {
            scale: self.scale,
            translate: [self.translate_x, self.translate_y],
        }
    }
}

/// The combined `scale(S) translate(T)` applied to the image, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub scale: f32,
    pub translate: [f32; 2],
}

impl RenderTransform {
    /// Maps a point in the untransformed image layout to the transformed layout.
    pub fn map_point(&self, origin: [f32; 2], point: [f32; 2]) -> [f32; 2] {
        [
            origin[0] + self.scale * (point[0] - origin[0] + self.translate[0]),
            origin[1] + self.scale * (point[1] - origin[1] + self.translate[1]),
        ]
    }

    /// Returns `(min, size)` of an image laid out at `origin` with `size` once
    /// the transform is applied.
    pub fn apply_to_rect(&self, origin: [f32; 2], size: [f32; 2]) -> ([f32; 2], [f32; 2]) {
        let min = self.map_point(origin, origin);
        (min, [size[0] * self.scale, size[1] * self.scale])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_identity() {
        let state = TransformState::new();
        assert_eq!(state.scale(), 1.0);
        assert_eq!(state.translation(), [0.0, 0.0]);
        assert!(!state.is_dragging());
        assert_eq!(state.zoom_label(), "100%");
    }

    #[test]
    fn zoom_compounds_multiplicatively() {
        let mut state = TransformState::new();
        for _ in 0..3 {
            state.apply_zoom(ZOOM_IN_FACTOR);
        }
        assert_relative_eq!(state.scale(), 1.728, epsilon = 1e-5);
        assert_eq!(state.zoom_label(), "173%");
    }

    #[test]
    fn zoom_out_floors_at_minimum() {
        let mut state = TransformState::new();
        state.apply_zoom(4.0);
        for _ in 0..20 {
            state.apply_zoom(ZOOM_OUT_FACTOR);
            assert!(state.scale() >= SCALE_MIN);
        }
        assert_eq!(state.scale(), SCALE_MIN);
    }

    #[test]
    fn zoom_in_caps_at_maximum() {
        let mut state = TransformState::new();
        state.apply_zoom(100.0);
        assert_eq!(state.scale(), SCALE_MAX);
        assert_eq!(state.zoom_label(), "500%");
    }

    #[test]
    fn invalid_factors_are_ignored() {
        let mut state = TransformState::new();
        state.apply_zoom(2.0);
        for factor in [0.0, -1.5, f32::NAN, f32::INFINITY] {
            state.apply_zoom(factor);
            assert_eq!(state.scale(), 2.0);
        }
    }

    #[test]
    fn drag_requires_zoom() {
        let mut state = TransformState::new();
        assert!(!state.begin_drag(10.0, 10.0));
        assert!(!state.is_dragging());

        state.apply_zoom(0.8);
        assert!(!state.begin_drag(10.0, 10.0));
        assert!(!state.is_dragging());
    }

    #[test]
    fn drag_tracks_pointer_one_to_one() {
        let mut state = TransformState::new();
        state.apply_zoom(2.0);
        assert!(state.begin_drag(100.0, 50.0));
        state.update_drag(130.0, 20.0);
        assert_eq!(state.translation(), [30.0, -30.0]);

        // A second drag continues from the current offset without jumping.
        state.end_drag();
        assert!(state.begin_drag(0.0, 0.0));
        state.update_drag(5.0, 5.0);
        assert_eq!(state.translation(), [35.0, -25.0]);
    }

    #[test]
    fn update_after_end_is_ignored() {
        let mut state = TransformState::new();
        state.apply_zoom(1.5);
        state.begin_drag(0.0, 0.0);
        state.update_drag(10.0, 10.0);
        state.end_drag();
        state.end_drag();
        assert!(!state.update_drag(99.0, 99.0));
        assert_eq!(state.translation(), [10.0, 10.0]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = TransformState::new();
        state.apply_zoom(3.0);
        state.begin_drag(1.0, 1.0);
        state.update_drag(40.0, -12.0);
        state.reset();
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn render_scales_then_translates_from_top_left() {
        let mut state = TransformState::new();
        state.apply_zoom(2.0);
        state.begin_drag(0.0, 0.0);
        state.update_drag(10.0, 5.0);

        let (min, size) = state.render().apply_to_rect([100.0, 200.0], [300.0, 150.0]);
        assert_eq!(min, [120.0, 210.0]);
        assert_eq!(size, [600.0, 300.0]);
    }

    #[test]
    fn identity_render_leaves_rect_untouched() {
        let render = TransformState::new().render();
        let (min, size) = render.apply_to_rect([4.0, 8.0], [64.0, 32.0]);
        assert_eq!(min, [4.0, 8.0]);
        assert_eq!(size, [64.0, 32.0]);
    }
}
