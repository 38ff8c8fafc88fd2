//! Small math helpers shared by the viewer.

/// Distance between two touch points in screen pixels.
pub fn touch_distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Clamps `value` into `[min, max]`. NaN collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}
