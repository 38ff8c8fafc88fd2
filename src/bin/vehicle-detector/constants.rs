use std::time::Duration;

/// Width of the upload/settings sidebar in pixels.
pub const SIDEBAR_WIDTH: f32 = 260.0;

/// Width of the statistics/breakdown panel in pixels.
pub const RESULTS_PANEL_WIDTH: f32 = 300.0;

/// Maximum height of the upload preview thumbnail.
pub const PREVIEW_MAX_HEIGHT: f32 = 180.0;

/// How long an unconfirmed fullscreen request may stay pending.
pub const FULLSCREEN_CONFIRM_TIMEOUT: Duration = Duration::from_secs(2);

/// Extensions offered by the file picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];
