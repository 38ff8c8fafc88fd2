//! egui binding of the result image viewer.
//!
//! Translates raw egui input into [`ViewerEvent`]s, paints the image with the
//! current transform and renders the zoom/reset/fullscreen controls.

use crate::colors;
use crate::constants::FULLSCREEN_CONFIRM_TIMEOUT;
use eframe::egui::{self, TextureHandle};
use std::time::{Duration, Instant};
use vehicle_detector::viewport::{
    Cursor, PlatformRequest, ViewerEvent, ViewportState, WheelTicks, WheelUnit,
};

/// One viewer per loaded result image. Dropping it drops its input bindings.
pub struct ResultViewer {
    id: egui::Id,
    texture: TextureHandle,
    state: ViewportState,
    wheel: WheelTicks,
    fullscreen_requested_at: Option<Instant>,
}

impl ResultViewer {
    /// Binds a freshly loaded image. `id` must be unique per image so the
    /// floating controls are rebuilt instead of reused.
    pub fn new(id: egui::Id, texture: TextureHandle, natural_size: [u32; 2]) -> Self {
        Self {
            id,
            texture,
            state: ViewportState::attach(natural_size),
            wheel: WheelTicks::default(),
            fullscreen_requested_at: None,
        }
    }

    pub fn natural_size(&self) -> [u32; 2] {
        self.state.natural_size()
    }

    pub fn fullscreen_active(&self) -> bool {
        self.state.fullscreen_active()
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: ViewerEvent) {
        let transition = std::mem::take(&mut self.state).handle(event);
        self.state = transition.state;

        if let Some(request) = transition.request {
            let fullscreen = matches!(request, PlatformRequest::EnterFullscreen);
            log::debug!("Requesting fullscreen={fullscreen}");
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
            self.fullscreen_requested_at = Some(Instant::now());
        }
    }

    /// Mirrors the window's fullscreen status and expires unconfirmed requests.
    fn sync_fullscreen(&mut self, ctx: &egui::Context) {
        let platform = ctx.input(|i| i.viewport().fullscreen);

        if let Some(active) = platform
            && active != self.state.fullscreen_active()
        {
            self.fullscreen_requested_at = None;
            self.dispatch(ctx, ViewerEvent::FullscreenChanged { active });
            return;
        }

        let Some(requested_at) = self.fullscreen_requested_at else {
            return;
        };

        if self.state.fullscreen_pending().is_none() {
            self.fullscreen_requested_at = None;
        } else if requested_at.elapsed() >= FULLSCREEN_CONFIRM_TIMEOUT {
            self.fullscreen_requested_at = None;
            self.dispatch(
                ctx,
                ViewerEvent::FullscreenFailed {
                    reason: "request was not confirmed by the window system".to_owned(),
                },
            );
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let fullscreen_active = self.state.fullscreen_active();
        let events = ctx.input(|i| {
            let mut events = Vec::new();
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                events.push(ViewerEvent::ZoomIn);
            }
            if i.key_pressed(egui::Key::Minus) {
                events.push(ViewerEvent::ZoomOut);
            }
            if i.key_pressed(egui::Key::Num0) {
                events.push(ViewerEvent::ResetView);
            }
            if i.key_pressed(egui::Key::F11)
                || (fullscreen_active && i.key_pressed(egui::Key::Escape))
            {
                events.push(ViewerEvent::ToggleFullscreen);
            }
            events
        });

        for event in events {
            self.dispatch(ctx, event);
        }
    }

    fn handle_pointer_input(&mut self, ctx: &egui::Context, rect: egui::Rect, response: &egui::Response) {
        if response.hovered() {
            let wheel = &mut self.wheel;
            let ticks: i32 = ctx.input(|i| {
                i.events
                    .iter()
                    .filter_map(|event| match event {
                        egui::Event::MouseWheel { unit, delta, .. } => {
                            let unit = match unit {
                                egui::MouseWheelUnit::Point => WheelUnit::Point,
                                egui::MouseWheelUnit::Line => WheelUnit::Line,
                                egui::MouseWheelUnit::Page => WheelUnit::Page,
                            };
                            Some(wheel.feed(delta.y, unit))
                        }
                        _ => None,
                    })
                    .sum()
            });
            for event in WheelTicks::events(ticks) {
                self.dispatch(ctx, event);
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(origin) = ctx.input(|i| i.pointer.press_origin())
        {
            self.dispatch(
                ctx,
                ViewerEvent::PointerDown {
                    x: origin.x,
                    y: origin.y,
                },
            );
        }

        if self.state.transform().is_dragging() {
            if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
                self.dispatch(ctx, ViewerEvent::PointerMove { x: pos.x, y: pos.y });
            }
            // Read from global pointer state: releasing outside the image must end the drag.
            if !ctx.input(|i| i.pointer.primary_down()) {
                self.dispatch(ctx, ViewerEvent::PointerUp);
            }
        }

        let touch_events: Vec<ViewerEvent> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { id, phase, pos, .. } => match phase {
                        egui::TouchPhase::Start if rect.contains(*pos) => {
                            Some(ViewerEvent::TouchStart {
                                id: id.0,
                                x: pos.x,
                                y: pos.y,
                            })
                        }
                        egui::TouchPhase::Start => None,
                        egui::TouchPhase::Move => Some(ViewerEvent::TouchMove {
                            id: id.0,
                            x: pos.x,
                            y: pos.y,
                        }),
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            Some(ViewerEvent::TouchEnd { id: id.0 })
                        }
                    },
                    _ => None,
                })
                .collect()
        });

        for event in touch_events {
            self.dispatch(ctx, event);
        }
    }

    /// Renders the viewer into all remaining space of `ui`.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();

        self.sync_fullscreen(&ctx);
        self.handle_keyboard_input(&ctx);

        let (viewport_rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.handle_pointer_input(&ctx, viewport_rect, &response);

        let view = self.state.view();

        // Fit the natural size into the viewport; this is the scale=1 layout.
        let [width, height] = self.state.natural_size();
        let natural = egui::vec2(width.max(1) as f32, height.max(1) as f32);
        let fit_scale = (viewport_rect.width() / natural.x).min(viewport_rect.height() / natural.y);
        let base_size = natural * fit_scale;
        let origin = viewport_rect.center() - base_size / 2.0;

        let (min, size) = view
            .transform
            .apply_to_rect([origin.x, origin.y], [base_size.x, base_size.y]);
        let image_rect =
            egui::Rect::from_min_size(egui::pos2(min[0], min[1]), egui::vec2(size[0], size[1]));

        let painter = ui.painter_at(viewport_rect);
        painter.rect_filled(viewport_rect, 0.0, colors::VIEWER_BACKGROUND);
        painter.image(
            self.texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if response.hovered() || self.state.transform().is_dragging() {
            ctx.set_cursor_icon(match view.cursor {
                Cursor::Default => egui::CursorIcon::Default,
                Cursor::Grab => egui::CursorIcon::Grab,
                Cursor::Grabbing => egui::CursorIcon::Grabbing,
            });
        }

        self.show_controls(&ctx, viewport_rect, &view.zoom_label, view.fullscreen_label);
    }

    /// Renders the floating zoom controls panel.
    fn show_controls(
        &mut self,
        ctx: &egui::Context,
        viewport_rect: egui::Rect,
        zoom_label: &str,
        fullscreen_label: &str,
    ) {
        let margin = 12.0;
        let mut clicked = Vec::new();

        egui::Area::new(self.id.with("zoom_controls"))
            .fixed_pos(viewport_rect.left_top() + egui::vec2(margin, margin))
            .order(egui::Order::Foreground)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("➖").on_hover_text("Zoom Out (-)").clicked() {
                                clicked.push(ViewerEvent::ZoomOut);
                            }
                            if ui.button("➕").on_hover_text("Zoom In (+)").clicked() {
                                clicked.push(ViewerEvent::ZoomIn);
                            }
                            ui.monospace(zoom_label);
                            ui.separator();
                            if ui.button("⟲ Reset View").on_hover_text("Reset view (0)").clicked() {
                                clicked.push(ViewerEvent::ResetView);
                            }
                            if ui
                                .button(format!("⛶ {fullscreen_label}"))
                                .on_hover_text("Toggle fullscreen (F11)")
                                .clicked()
                            {
                                clicked.push(ViewerEvent::ToggleFullscreen);
                            }
                        });
                    });
            });

        for event in clicked {
            self.dispatch(ctx, event);
        }
    }
}
