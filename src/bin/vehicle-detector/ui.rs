//! UI rendering methods for the vehicle detector.

use crate::colors;
use crate::constants::{IMAGE_EXTENSIONS, PREVIEW_MAX_HEIGHT, RESULTS_PANEL_WIDTH, SIDEBAR_WIDTH};
use crate::images::UploadSource;
use crate::{DetectionResults, ResultImage, VehicleDetectorApp};
use eframe::egui;
use vehicle_detector::presenter::{
    self, ConfidenceTier, NO_PREDICTIONS_MESSAGE, Presentation, capitalize, class_icon,
    format_percent, short_id,
};

impl VehicleDetectorApp {
    /// Accepts the first file dropped anywhere on the window.
    pub fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let Some(file) = ctx.input(|i| i.raw.dropped_files.first().cloned()) else {
            return;
        };

        if !file.mime.is_empty() && !file.mime.starts_with("image/") {
            log::warn!("Ignoring dropped file '{}' ({})", file.name, file.mime);
            return;
        }

        let source = if let Some(bytes) = file.bytes {
            UploadSource::Bytes {
                name: file.name,
                bytes,
            }
        } else if let Some(path) = file.path {
            UploadSource::Path(path)
        } else {
            log::warn!("Dropped file '{}' has no path or contents", file.name);
            return;
        };

        self.select_image(ctx, source);
    }

    /// Renders the bottom status bar with the controls hint.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Scroll: Zoom | Drag: Pan (zoomed) | +/-: Zoom | 0: Reset | F11: Fullscreen");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.is_busy() {
                        ui.spinner();
                        ui.label("Processing…");
                    }
                });
            });
        });
    }

    /// Renders the left sidebar panel.
    pub fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_sidebar_content(ui);
                });
            });
    }

    /// Renders the sidebar content: upload area, detection settings and the
    /// detect button.
    fn show_sidebar_content(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);

        ui.strong("Image");
        ui.separator();
        self.show_upload_area(ui);

        ui.add_space(12.0);

        ui.strong("Detection Settings");
        ui.separator();

        ui.add(
            egui::Slider::new(&mut self.settings.confidence_threshold, 0.0..=1.0)
                .step_by(0.05)
                .text("Confidence"),
        );
        ui.add(
            egui::Slider::new(&mut self.settings.overlap_threshold, 0.0..=1.0)
                .step_by(0.05)
                .text("Overlap"),
        );

        ui.add_space(8.0);
        ui.label("API key");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.api_key)
                    .password(!self.show_api_key)
                    .hint_text("Enter API key")
                    .desired_width(SIDEBAR_WIDTH - 60.0),
            );
            let (icon, hint) = if self.show_api_key {
                ("🙈", "Hide API key")
            } else {
                ("👁", "Show API key")
            };
            if ui.button(icon).on_hover_text(hint).clicked() {
                self.show_api_key = !self.show_api_key;
            }
        });

        ui.add_space(12.0);

        let busy = self.is_busy();
        let label = if busy { "Detecting…" } else { "🔍 Detect Vehicles" };
        let detect = ui.add_enabled(
            !busy,
            egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 32.0)),
        );
        if detect.clicked() {
            let ctx = ui.ctx().clone();
            self.start_detection(&ctx);
        }
    }

    /// Drop zone with file picker, or the preview of the current upload.
    fn show_upload_area(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();

        if self.incoming_upload.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading image…");
            });
        }

        if let Some(upload) = &self.upload {
            let mut clear = false;
            let mut change = false;

            let size = upload.preview.size_vec2();
            let scale = (ui.available_width() / size.x)
                .min(PREVIEW_MAX_HEIGHT / size.y)
                .min(1.0);
            ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                upload.preview.id(),
                size * scale,
            )));

            ui.label(&upload.payload.name);
            if let Some(warning) = &upload.size_warning {
                ui.colored_label(colors::WARNING_TEXT, format!("⚠ {warning}"));
            }

            ui.horizontal(|ui| {
                change = ui.button("📂 Change…").clicked();
                clear = ui.button("✖ Clear").clicked();
            });

            if clear {
                self.clear_image();
            } else if change && let Some(path) = pick_image_file() {
                self.select_image(&ctx, UploadSource::Path(path));
            }
            return;
        }

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let stroke_color = if hovering {
            colors::DROP_ZONE_ACTIVE
        } else {
            colors::DROP_ZONE_IDLE
        };

        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.5, stroke_color))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("🖼").size(32.0));
                    ui.label("Drag & drop an image here");
                    ui.label("or");
                    if ui.button("📂 Select Image").clicked()
                        && let Some(path) = pick_image_file()
                    {
                        self.select_image(&ctx, UploadSource::Path(path));
                    }
                });
            });
    }

    /// Renders the right panel with statistics and the class breakdown.
    pub fn show_results_panel(&mut self, ctx: &egui::Context) {
        let busy = self.is_busy();

        egui::SidePanel::right("results")
            .exact_width(RESULTS_PANEL_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.strong("Results");
                ui.separator();

                if busy {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Processing image…");
                    });
                    return;
                }

                let Some(results) = &mut self.results else {
                    ui.label("Select an image and run detection to see results.");
                    return;
                };

                show_statistics(ui, results);
                ui.add_space(12.0);

                egui::ScrollArea::vertical().show(ui, |ui| {
                    show_breakdown(ui, &results.presentation, &mut results.show_details);
                });
            });
    }

    /// Renders the central panel containing the result viewer.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        let busy = self.is_busy();

        egui::CentralPanel::default().show(ctx, |ui| {
            if busy {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }

            let Some(results) = &mut self.results else {
                ui.centered_and_justified(|ui| {
                    ui.label("Upload an image and press Detect Vehicles.");
                });
                return;
            };

            match &mut results.image {
                ResultImage::Loading(_) => {
                    ui.centered_and_justified(|ui| ui.spinner());
                }
                ResultImage::Error(msg) => {
                    ui.centered_and_justified(|ui| {
                        ui.label(format!("Failed to load result image: {msg}"));
                    });
                }
                ResultImage::Ready(viewer) => viewer.show(ui),
            }
        });
    }
}

fn pick_image_file() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file()
}

fn show_statistics(ui: &mut egui::Ui, results: &DetectionResults) {
    let presentation = &results.presentation;
    let size = match &results.image {
        ResultImage::Ready(viewer) => presentation.size_label(viewer.natural_size()),
        _ => presentation
            .reported_size
            .map(|size| presentation.size_label(size))
            .unwrap_or_default(),
    };

    egui::Grid::new("statistics")
        .num_columns(2)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            ui.label("Total Vehicles");
            ui.strong(presentation.count_label());
            ui.end_row();

            ui.label("Avg Confidence");
            ui.strong(presentation.average_confidence_label());
            ui.end_row();

            ui.label("Processing Time");
            ui.strong(presentation.processing_time_label());
            ui.end_row();

            ui.label("Image Size");
            ui.strong(size);
            ui.end_row();
        });
}

fn show_breakdown(ui: &mut egui::Ui, presentation: &Presentation, show_details: &mut bool) {
    let Some(classes) = &presentation.breakdown else {
        ui.weak(NO_PREDICTIONS_MESSAGE);
        return;
    };

    ui.horizontal(|ui| {
        ui.strong(format!("Detected Vehicles ({})", presentation.breakdown_total()));
        if !presentation.detections.is_empty() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if *show_details {
                    "⏶ Hide Details"
                } else {
                    "⏷ Show Details"
                };
                if ui.small_button(label).clicked() {
                    *show_details = !*show_details;
                }
            });
        }
    });
    ui.separator();

    for class in classes {
        ui.horizontal(|ui| {
            ui.label(class_icon(&class.class));
            ui.label(capitalize(&class.class));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.strong(class.count.to_string());
            });
        });
    }

    if !*show_details || presentation.detections.is_empty() {
        return;
    }

    ui.add_space(8.0);
    ui.strong("🔎 Individual Detections");

    for (index, detection) in presentation.detections.iter().enumerate() {
        let class = presenter::class_label(detection);
        let tier_color = match ConfidenceTier::of(detection.confidence) {
            ConfidenceTier::High => colors::CONFIDENCE_HIGH,
            ConfidenceTier::Medium => colors::CONFIDENCE_MEDIUM,
            ConfidenceTier::Low => colors::CONFIDENCE_LOW,
        };

        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} {} #{}",
                    class_icon(class),
                    capitalize(class),
                    index + 1
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.colored_label(tier_color, format_percent(detection.confidence));
                });
            });
            ui.small(format!("Position: ({:.0}, {:.0})", detection.x, detection.y));
            ui.small(format!("Size: {}×{}", detection.width, detection.height));
            ui.small(format!("Confidence: {}", format_percent(detection.confidence)));
            ui.small(format!("ID: {}", short_id(&detection.detection_id)));
        });
    }
}
