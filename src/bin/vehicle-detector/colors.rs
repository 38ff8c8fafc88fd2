//! Color constants for the results view.

use eframe::egui::Color32;

// Viewer
pub const VIEWER_BACKGROUND: Color32 = Color32::from_gray(24);

// Upload drop zone
pub const DROP_ZONE_IDLE: Color32 = Color32::from_gray(110);
pub const DROP_ZONE_ACTIVE: Color32 = Color32::from_rgb(65, 105, 225);

// Confidence badges
pub const CONFIDENCE_HIGH: Color32 = Color32::from_rgb(50, 205, 50);
pub const CONFIDENCE_MEDIUM: Color32 = Color32::from_rgb(255, 165, 0);
pub const CONFIDENCE_LOW: Color32 = Color32::from_rgb(220, 60, 60);

pub const WARNING_TEXT: Color32 = Color32::from_rgb(255, 190, 60);
