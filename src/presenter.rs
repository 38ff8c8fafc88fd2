//! Turns a resolved detection response into what the results view shows.

use crate::Detection;
use crate::response::DetectionResponse;
use std::time::Duration;

/// Shown in place of the breakdown when the response carries no predictions.
pub const NO_PREDICTIONS_MESSAGE: &str = "No detailed prediction data available";

/// Label used for detections without a class.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// Which image the viewer should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplaySource {
    /// Annotated JPEG returned by the service (base64, no data-URL prefix).
    Annotated(String),
    /// The image the user uploaded.
    Original,
}

/// Count of detections for one class label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
    pub class: String,
    pub count: usize,
}

/// Everything the results panel renders for one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub display: DisplaySource,
    pub count: u64,
    /// `None` when the response had no prediction list.
    pub average_confidence: Option<f32>,
    /// Class counts in first-seen order; `None` when the response had no
    /// prediction list.
    pub breakdown: Option<Vec<ClassCount>>,
    /// Detections sorted by confidence, highest first.
    pub detections: Vec<Detection>,
    /// Image size the service reported, if any.
    pub reported_size: Option<[u32; 2]>,
    pub processing_time: Duration,
}

impl Presentation {
    pub fn from_response(response: &DetectionResponse, processing_time: Duration) -> Self {
        let Some(output) = response.output() else {
            return Self {
                display: DisplaySource::Original,
                count: 0,
                average_confidence: None,
                breakdown: None,
                detections: Vec::new(),
                reported_size: None,
                processing_time,
            };
        };

        let display = match &output.output_image {
            Some(image) if !image.value.is_empty() => DisplaySource::Annotated(image.value.clone()),
            _ => DisplaySource::Original,
        };

        // Only an annotated image is guaranteed to match the size the model saw.
        let reported_size = match (&display, &output.predictions) {
            (DisplaySource::Annotated(_), Some(predictions)) => predictions
                .image
                .map(|size| [size.width, size.height]),
            _ => None,
        };

        let predictions = output
            .predictions
            .as_ref()
            .and_then(|set| set.predictions.as_ref());

        let (average_confidence, breakdown, detections) = match predictions {
            Some(list) => {
                let mut sorted = list.clone();
                sorted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                (
                    Some(average_confidence(list)),
                    Some(group_by_class(list)),
                    sorted,
                )
            }
            None => (None, None, Vec::new()),
        };

        Self {
            display,
            count: output.count_objects.unwrap_or(0),
            average_confidence,
            breakdown,
            detections,
            reported_size,
            processing_time,
        }
    }

    pub fn count_label(&self) -> String {
        self.count.to_string()
    }

    pub fn average_confidence_label(&self) -> String {
        match self.average_confidence {
            Some(average) => format_percent(average),
            None => "N/A".to_owned(),
        }
    }

    pub fn processing_time_label(&self) -> String {
        format!("{:.2}s", self.processing_time.as_secs_f64())
    }

    /// Total number of detections across all classes in the breakdown.
    pub fn breakdown_total(&self) -> usize {
        self.breakdown
            .as_ref()
            .map_or(0, |classes| classes.iter().map(|c| c.count).sum())
    }

    /// Size label, preferring the service-reported size over the decoded one.
    pub fn size_label(&self, natural_size: [u32; 2]) -> String {
        let [width, height] = self.reported_size.unwrap_or(natural_size);
        format!("{width} × {height}px")
    }

    /// Switches to the original upload after the annotated image turned out
    /// to be unusable. The service-reported size no longer applies.
    pub fn fall_back_to_original(&mut self) {
        self.display = DisplaySource::Original;
        self.reported_size = None;
    }
}

/// Mean confidence, `0.0` for an empty list.
pub fn average_confidence(detections: &[Detection]) -> f32 {
    if detections.is_empty() {
        return 0.0;
    }
    let sum: f32 = detections.iter().map(|d| d.confidence).sum();
    sum / detections.len() as f32
}

/// Groups detections by class label, keeping the order classes first appear in.
pub fn group_by_class(detections: &[Detection]) -> Vec<ClassCount> {
    let mut groups: Vec<ClassCount> = Vec::new();
    for detection in detections {
        let class = class_label(detection);
        match groups.iter_mut().find(|group| group.class == class) {
            Some(group) => group.count += 1,
            None => groups.push(ClassCount {
                class: class.to_owned(),
                count: 1,
            }),
        }
    }
    groups
}

pub fn class_label(detection: &Detection) -> &str {
    if detection.class.is_empty() {
        UNKNOWN_CLASS
    } else {
        &detection.class
    }
}

/// Uppercases the first character: "car" -> "Car".
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Confidence as a percentage with one decimal: 0.8734 -> "87.3%".
pub fn format_percent(confidence: f32) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// First eight characters of an identifier followed by an ellipsis.
pub fn short_id(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("{prefix}...")
}

/// Confidence buckets used to colour individual detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence: f32) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Icon glyph for a vehicle class; unknown labels fall back to the car icon.
pub fn class_icon(class: &str) -> &'static str {
    match class.to_lowercase().as_str() {
        "car" => "🚗",
        "truck" => "🚚",
        "bus" => "🚌",
        "motorcycle" => "🏍",
        "bicycle" => "🚲",
        "van" => "🚐",
        "train" => "🚆",
        "boat" => "🚢",
        "person" => "👤",
        "unknown" => "❓",
        _ => "🚗",
    }
}
