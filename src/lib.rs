use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DefaultOnNull, DisplayFromStr, PickFirst, serde_as};

pub mod api;
pub mod error;
pub mod geometry;
pub mod presenter;
pub mod response;
pub mod settings;
pub mod transform;
pub mod viewport;

pub use error::{DetectionError, Result};

/// The first output block of the detection workflow.
///
/// Every field is optional on the wire; malformed sub-objects are dropped
/// instead of failing the whole response.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    /// Number of objects counted by the workflow (number or numeric string)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub count_objects: Option<u64>,
    /// Annotated image rendered by the service
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_image: Option<OutputImage>,
    /// Raw model predictions
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PredictionSet>,
}

/// Base64 image block returned by the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputImage {
    /// Encoding tag, usually "base64"
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Base64 payload without a data-URL prefix
    #[serde(default)]
    pub value: String,
}

/// The prediction block: the analysed image size and the detections.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    /// Dimensions of the image the model ran on
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSize>,
    /// Detected objects; `None` when the field is missing or not a list
    #[serde_as(as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Detection>>,
}

/// Pixel dimensions reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// A single recognized object instance.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "car", "truck")
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub class: String,
    /// Confidence in [0, 1]
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub confidence: f32,
    /// Box center x in image pixels
    #[serde(default)]
    pub x: f32,
    /// Box center y in image pixels
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Service-assigned identifier
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub detection_id: String,
}
