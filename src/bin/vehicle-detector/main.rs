#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod colors;
mod constants;
mod detection_task;
mod images;
mod ui;
mod viewer;

use clap::Parser;
use detection_task::DetectionTask;
use eframe::egui::{self, TextureHandle};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use images::{LoadedUpload, Pending, ResultFrame, UploadSource};
use vehicle_detector::api::{self, ImagePayload};
use vehicle_detector::presenter::Presentation;
use vehicle_detector::settings::{STORAGE_KEY, Settings, SettingsOverrides};
use viewer::ResultViewer;

/// Desktop client for the hosted vehicle detection workflow.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    overrides: SettingsOverrides,
}

/// An image picked by the user, ready to submit.
pub struct Upload {
    payload: ImagePayload,
    preview: TextureHandle,
    size_warning: Option<String>,
}

pub enum ResultImage {
    Loading(Pending<ResultFrame>),
    Ready(ResultViewer),
    Error(String),
}

/// Output of the last completed detection run.
pub struct DetectionResults {
    presentation: Presentation,
    image: ResultImage,
    show_details: bool,
}

/// Main application state for the vehicle detector.
pub struct VehicleDetectorApp {
    settings: Settings,
    show_api_key: bool,
    upload: Option<Upload>,
    /// Replacement upload still being read and decoded.
    incoming_upload: Option<Pending<LoadedUpload>>,
    detection: Option<DetectionTask>,
    results: Option<DetectionResults>,
    /// Bumped for every loaded result image so each gets fresh widget ids.
    viewer_generation: u64,
    toasts: Toasts,
    runtime: tokio::runtime::Runtime,
}

impl VehicleDetectorApp {
    fn new(cc: &eframe::CreationContext<'_>, overrides: &SettingsOverrides) -> Self {
        let toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let stored: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, STORAGE_KEY))
            .unwrap_or_default();
        let settings = overrides.apply(stored);
        log::info!("Using detection endpoint {}", settings.api_url);

        let runtime = tokio::runtime::Runtime::new().expect("create tokio runtime");

        Self {
            settings,
            show_api_key: false,
            upload: None,
            incoming_upload: None,
            detection: None,
            results: None,
            viewer_generation: 0,
            toasts,
            runtime,
        }
    }

    fn notify(&mut self, kind: ToastKind, text: impl Into<String>, seconds: f64) {
        let text: String = text.into();
        self.toasts.add(Toast {
            kind,
            text: text.into(),
            options: ToastOptions::default()
                .duration_in_seconds(seconds)
                .show_icon(true),
            ..Default::default()
        });
    }

    fn is_busy(&self) -> bool {
        self.detection.is_some()
    }

    fn selected_payload(&self) -> Option<&ImagePayload> {
        self.upload.as_ref().map(|upload| &upload.payload)
    }

    /// Starts loading a new upload. The current one stays until the new one
    /// has been validated and decoded.
    pub fn select_image(&mut self, ctx: &egui::Context, source: UploadSource) {
        self.incoming_upload = Some(images::spawn_upload(ctx, source));
    }

    /// Drops the selection together with any results and viewer state.
    pub fn clear_image(&mut self) {
        self.upload = None;
        self.incoming_upload = None;
        self.results = None;
    }

    /// Validates the selection and submits it to the detection service.
    pub fn start_detection(&mut self, ctx: &egui::Context) {
        if self.is_busy() {
            log::debug!("Detection already in flight, ignoring request");
            return;
        }

        let payload = match api::require_image(self.selected_payload()) {
            Ok(payload) => payload.clone(),
            Err(err) => {
                self.notify(ToastKind::Warning, err.to_string(), 5.0);
                return;
            }
        };

        // A new run discards the previous result and its viewer.
        self.results = None;
        self.detection = Some(DetectionTask::spawn(
            &self.runtime,
            ctx.clone(),
            self.settings.clone(),
            payload,
        ));
    }

    fn poll_upload(&mut self, ctx: &egui::Context) {
        let Some(result) = self.incoming_upload.as_ref().and_then(images::poll) else {
            return;
        };
        self.incoming_upload = None;

        match result {
            Ok(LoadedUpload { payload, preview }) => {
                log::info!("Selected '{}' ({} bytes)", payload.name, payload.len());
                let preview = preview.into_texture(ctx, &format!("preview:{}", payload.name));
                self.upload = Some(Upload {
                    size_warning: payload.size_warning(),
                    payload,
                    preview,
                });
            }
            Err(err) => {
                log::warn!("Rejected upload: {err}");
                self.notify(ToastKind::Error, err.to_string(), 8.0);
            }
        }
    }

    fn poll_detection(&mut self, ctx: &egui::Context) {
        let Some(result) = self.detection.as_ref().and_then(|task| task.poll()) else {
            return;
        };
        // Busy state ends here on both success and failure.
        let Some(task) = self.detection.take() else {
            return;
        };

        match result {
            Ok(outcome) => {
                let presentation = Presentation::from_response(&outcome.response, outcome.elapsed);
                let pending =
                    images::spawn_result(ctx, presentation.display.clone(), task.payload().clone());
                self.results = Some(DetectionResults {
                    presentation,
                    image: ResultImage::Loading(pending),
                    show_details: false,
                });
            }
            Err(err) => {
                log::error!("Detection error: {err}");
                self.notify(
                    ToastKind::Error,
                    format!("Error detecting vehicles: {err}"),
                    10.0,
                );
            }
        }
    }

    fn poll_result_image(&mut self, ctx: &egui::Context) {
        let Some(results) = &mut self.results else {
            return;
        };
        let ResultImage::Loading(rx) = &results.image else {
            return;
        };
        let Some(result) = images::poll(rx) else {
            return;
        };

        results.image = match result {
            Ok(ResultFrame { image: decoded, annotated }) => {
                if !annotated {
                    results.presentation.fall_back_to_original();
                }
                self.viewer_generation += 1;
                let id = egui::Id::new("result_viewer").with(self.viewer_generation);
                let natural_size = decoded.natural_size();
                let texture = decoded.into_texture(ctx, &format!("result:{}", self.viewer_generation));
                ResultImage::Ready(ResultViewer::new(id, texture, natural_size))
            }
            Err(err) => {
                log::error!("Failed to load result image: {err}");
                ResultImage::Error(err.to_string())
            }
        };
    }

    fn viewer_fullscreen(&self) -> bool {
        matches!(
            &self.results,
            Some(DetectionResults {
                image: ResultImage::Ready(viewer),
                ..
            }) if viewer.fullscreen_active()
        )
    }
}

impl eframe::App for VehicleDetectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_upload(ctx);
        self.poll_detection(ctx);
        self.poll_result_image(ctx);
        self.handle_dropped_files(ctx);

        if !self.viewer_fullscreen() {
            self.show_status_bar(ctx);
            self.show_sidebar(ctx);
            self.show_results_panel(ctx);
        }
        self.show_central_panel(ctx);

        self.toasts.show(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, STORAGE_KEY, &self.settings);
        log::debug!("Saved settings");
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vehicle Detector",
        options,
        Box::new(move |cc| Ok(Box::new(VehicleDetectorApp::new(cc, &args.overrides)))),
    )
}
