//! User-adjustable configuration shared by the GUI and the CLI.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hosted vehicle detection workflow.
pub const DEFAULT_API_URL: &str =
    "https://serverless.roboflow.com/vehical-detection-and-counts/workflows/detect-count-and-visualize-2";

/// Key under which the GUI persists [`Settings`].
pub const STORAGE_KEY: &str = "settings";

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "ROBOFLOW_API_KEY";

pub const DEFAULT_CONFIDENCE: f32 = 0.4;
pub const DEFAULT_OVERLAP: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Detection settings. The API key is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    #[serde(skip)]
    pub api_key: String,
    /// Minimum confidence the workflow should report, 0..=1
    pub confidence_threshold: f32,
    /// Box overlap (NMS) threshold, 0..=1
    pub overlap_threshold: f32,
    /// Whole-request timeout handed to the HTTP client
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_key: String::new(),
            confidence_threshold: DEFAULT_CONFIDENCE,
            overlap_threshold: DEFAULT_OVERLAP,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Pulls out-of-range values back into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.confidence_threshold = unit_or(self.confidence_threshold, DEFAULT_CONFIDENCE);
        self.overlap_threshold = unit_or(self.overlap_threshold, DEFAULT_OVERLAP);
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.api_url.trim().is_empty() {
            self.api_url = DEFAULT_API_URL.to_owned();
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn unit_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Command-line/environment overrides accepted by both binaries.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsOverrides {
    /// Detection workflow endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// API key for the detection service
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Confidence threshold (0-1)
    #[arg(long)]
    pub confidence: Option<f32>,

    /// Overlap threshold (0-1)
    #[arg(long)]
    pub overlap: Option<f32>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: Settings) -> Settings {
        let mut settings = settings;
        if let Some(url) = &self.api_url {
            settings.api_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            settings.api_key = key.trim().to_owned();
        }
        if let Some(confidence) = self.confidence {
            settings.confidence_threshold = confidence;
        }
        if let Some(overlap) = self.overlap {
            settings.overlap_threshold = overlap;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        settings.sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_not_persisted() {
        let settings = Settings {
            api_key: "secret".to_owned(),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));

        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert!(restored.api_key.is_empty());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let restored: Settings = serde_json::from_str(r#"{"overlap_threshold":0.6}"#).unwrap();
        assert_eq!(restored.api_url, DEFAULT_API_URL);
        assert_eq!(restored.confidence_threshold, DEFAULT_CONFIDENCE);
        assert_eq!(restored.overlap_threshold, 0.6);
    }

    #[test]
    fn sanitize_clamps_thresholds() {
        let settings = Settings {
            confidence_threshold: 1.7,
            overlap_threshold: f32::NAN,
            request_timeout_secs: 0,
            api_url: "  ".to_owned(),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.confidence_threshold, 1.0);
        assert_eq!(settings.overlap_threshold, DEFAULT_OVERLAP);
        assert_eq!(settings.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn overrides_win() {
        let overrides = SettingsOverrides {
            api_key: Some("  key  ".to_owned()),
            confidence: Some(0.25),
            timeout: Some(5),
            ..Default::default()
        };
        let settings = overrides.apply(Settings::default());
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.confidence_threshold, 0.25);
        assert_eq!(settings.overlap_threshold, DEFAULT_OVERLAP);
        assert_eq!(settings.request_timeout_secs, 5);
    }
}
