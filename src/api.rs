//! Client for the hosted detection workflow.

use crate::error::{DetectionError, Result};
use crate::response::DetectionResponse;
use crate::settings::Settings;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("vehicle-detector/", env!("CARGO_PKG_VERSION"));

/// Files above this size get a "processing may take longer" warning.
pub const LARGE_FILE_BYTES: usize = 10 * 1024 * 1024;

/// An uploaded image whose bytes have been checked to be a known image format.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub format: ImageFormat,
}

impl ImagePayload {
    /// Wraps raw bytes, rejecting anything that doesn't sniff as an image.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let bytes = bytes.into();
        let format =
            image::guess_format(&bytes).map_err(|_| DetectionError::NotAnImage { name: name.clone() })?;
        Ok(Self {
            name,
            bytes,
            format,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Warning text for large uploads, `None` for normal sizes.
    pub fn size_warning(&self) -> Option<String> {
        (self.len() > LARGE_FILE_BYTES).then(|| {
            let mb = self.len() as f64 / (1024.0 * 1024.0);
            format!("Large file ({mb:.1}MB) - Processing may take longer")
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Aborts early when detection is triggered without an image.
pub fn require_image(selection: Option<&ImagePayload>) -> Result<&ImagePayload> {
    selection.ok_or(DetectionError::NoImageSelected)
}

#[derive(Debug, Serialize)]
pub struct DetectionRequest<'a> {
    pub api_key: &'a str,
    pub inputs: WorkflowInputs,
}

#[derive(Debug, Serialize)]
pub struct WorkflowInputs {
    pub image: InlineImage,
    pub confidence: f32,
    pub overlap: f32,
}

#[derive(Debug, Serialize)]
pub struct InlineImage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
}

impl<'a> DetectionRequest<'a> {
    pub fn new(settings: &'a Settings, image: &ImagePayload) -> Self {
        Self {
            api_key: settings.api_key.trim(),
            inputs: WorkflowInputs {
                image: InlineImage {
                    kind: "base64",
                    value: image.to_base64(),
                },
                confidence: settings.confidence_threshold,
                overlap: settings.overlap_threshold,
            },
        }
    }
}

/// Response plus round-trip time.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub response: DetectionResponse,
    pub elapsed: Duration,
}

/// Thin wrapper around a `reqwest::Client` configured from [`Settings`].
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    settings: Settings,
}

impl DetectionClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Submits one image and resolves the response shape.
    pub async fn detect(&self, image: &ImagePayload) -> Result<DetectionOutcome> {
        let started = Instant::now();
        let body = DetectionRequest::new(&self.settings, image);

        log::info!(
            "Submitting '{}' ({} bytes) to {}",
            image.name,
            image.len(),
            self.settings.api_url
        );

        let response = self
            .http
            .post(&self.settings.api_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Detection request failed with status {status}");
            return Err(DetectionError::Status { status });
        }

        let bytes = response.bytes().await?;
        let response = DetectionResponse::from_slice(&bytes)?;
        let elapsed = started.elapsed();

        log::info!(
            "Detection finished in {:.2}s ({} response)",
            elapsed.as_secs_f64(),
            response.shape()
        );

        Ok(DetectionOutcome { response, elapsed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG signature + IHDR start is enough for format sniffing.
    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[test]
    fn sniffs_image_format() {
        let payload = ImagePayload::from_bytes("a.png", PNG_HEADER.to_vec()).unwrap();
        assert_eq!(payload.format, ImageFormat::Png);
        assert_eq!(payload.size_warning(), None);
    }

    #[test]
    fn rejects_non_images() {
        let err = ImagePayload::from_bytes("notes.txt", b"hello world".to_vec()).unwrap_err();
        assert!(matches!(err, DetectionError::NotAnImage { ref name } if name == "notes.txt"));
    }

    #[test]
    fn require_image_reports_missing_selection() {
        let err = require_image(None).unwrap_err();
        assert_eq!(err.to_string(), "Please select an image first");
    }

    #[test]
    fn large_files_warn() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(LARGE_FILE_BYTES + 512 * 1024, 0);
        let payload = ImagePayload::from_bytes("big.png", bytes).unwrap();
        assert_eq!(
            payload.size_warning().as_deref(),
            Some("Large file (10.5MB) - Processing may take longer")
        );
    }

    #[test]
    fn client_keeps_its_settings() {
        let settings = Settings {
            api_url: "http://localhost:9/workflow".to_owned(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let client = DetectionClient::new(settings.clone()).unwrap();

        assert_eq!(client.settings(), &settings);
        assert_eq!(client.settings().timeout().as_secs(), 5);
    }

    #[test]
    fn request_body_matches_workflow_shape() {
        let settings = Settings {
            api_key: " key ".to_owned(),
            ..Default::default()
        };
        let payload = ImagePayload::from_bytes("a.png", PNG_HEADER.to_vec()).unwrap();
        let body = serde_json::to_value(DetectionRequest::new(&settings, &payload)).unwrap();

        assert_eq!(body["api_key"], "key");
        assert_eq!(body["inputs"]["image"]["type"], "base64");
        assert_eq!(body["inputs"]["image"]["value"], STANDARD.encode(PNG_HEADER));
        assert!(body["inputs"]["confidence"].is_number());
        assert!(body["inputs"]["overlap"].is_number());
    }
}
