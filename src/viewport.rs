//! Input-to-transform state machine for the result image viewer.
//!
//! Every input is a [`ViewerEvent`]; [`ViewportState::handle`] consumes the
//! current state and returns the next one together with any request the
//! platform must carry out (entering or leaving fullscreen). Rendering is a
//! separate step, [`ViewportState::view`], so the whole controller can be
//! exercised without a UI toolkit.

use crate::geometry::touch_distance;
use crate::transform::{RenderTransform, TransformState, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// A single input sample delivered to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// One wheel tick over the image. Positive `delta_y` scrolls up (zoom in).
    Wheel { delta_y: f32 },
    ZoomIn,
    ZoomOut,
    /// Restore the identity transform and leave fullscreen.
    ResetView,
    /// Primary button pressed on the image.
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    /// Primary button released anywhere.
    PointerUp,
    TouchStart { id: u64, x: f32, y: f32 },
    TouchMove { id: u64, x: f32, y: f32 },
    TouchEnd { id: u64 },
    ToggleFullscreen,
    /// The platform reported its current fullscreen status.
    FullscreenChanged { active: bool },
    /// The platform refused or never confirmed a fullscreen request.
    FullscreenFailed { reason: String },
}

/// Work the platform has to perform on behalf of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformRequest {
    EnterFullscreen,
    ExitFullscreen,
}

/// Pointer affordance over the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
    Grabbing,
}

/// Unit of a raw scroll delta as reported by the windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelUnit {
    /// Smooth scrolling (trackpads, high resolution wheels), in points.
    Point,
    /// Lines; one notch of a classic wheel is one line.
    Line,
    Page,
}

/// Scroll distance in points that counts as one wheel tick.
pub const POINTS_PER_TICK: f32 = 40.0;

/// Turns raw scroll deltas into whole wheel ticks, carrying the remainder
/// over to the next delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelTicks {
    remainder: f32,
}

impl WheelTicks {
    /// Adds a vertical delta and returns the number of complete ticks, positive
    /// when scrolling up.
    pub fn feed(&mut self, delta_y: f32, unit: WheelUnit) -> i32 {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return 0;
        }
        let ticks = match unit {
            WheelUnit::Point => delta_y / POINTS_PER_TICK,
            WheelUnit::Line | WheelUnit::Page => delta_y,
        };

        // Reversing direction drops whatever was left over the other way.
        if self.remainder != 0.0 && self.remainder.signum() != ticks.signum() {
            self.remainder = 0.0;
        }
        self.remainder += ticks;

        let whole = self.remainder.trunc();
        self.remainder -= whole;
        whole as i32
    }

    /// Converts whole ticks into viewer events.
    pub fn events(ticks: i32) -> impl Iterator<Item = ViewerEvent> {
        let delta_y = ticks.signum() as f32;
        (0..ticks.unsigned_abs()).map(move |_| ViewerEvent::Wheel { delta_y })
    }
}

/// Result of feeding one event to the viewer.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ViewportState,
    pub request: Option<PlatformRequest>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FullscreenState {
    /// Last status confirmed by the platform.
    active: bool,
    /// Request sent but not yet confirmed.
    pending: Option<PlatformRequest>,
}

/// Everything the viewer knows about the currently displayed image.
///
/// One value exists per loaded result image; a new image gets a fresh state
/// via [`ViewportState::attach`].
#[derive(Debug, Clone, Default)]
pub struct ViewportState {
    transform: TransformState,
    natural_size: [u32; 2],
    touches: Vec<(u64, [f32; 2])>,
    pinch_distance: Option<f32>,
    fullscreen: FullscreenState,
}

/// Render output derived from a [`ViewportState`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub transform: RenderTransform,
    pub cursor: Cursor,
    pub zoom_label: String,
    pub zoomed: bool,
    pub fullscreen_active: bool,
    pub fullscreen_label: &'static str,
}

impl ViewportState {
    /// Creates the state for a freshly loaded image with its natural pixel size.
    pub fn attach(natural_size: [u32; 2]) -> Self {
        Self {
            natural_size,
            ..Self::default()
        }
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn natural_size(&self) -> [u32; 2] {
        self.natural_size
    }

    pub fn fullscreen_active(&self) -> bool {
        self.fullscreen.active
    }

    pub fn fullscreen_pending(&self) -> Option<PlatformRequest> {
        self.fullscreen.pending
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    /// Applies one event and returns the next state.
    pub fn handle(mut self, event: ViewerEvent) -> Transition {
        let mut request = None;

        match event {
            ViewerEvent::Wheel { delta_y } => {
                if delta_y > 0.0 {
                    self.transform.apply_zoom(ZOOM_IN_FACTOR);
                } else if delta_y < 0.0 {
                    self.transform.apply_zoom(ZOOM_OUT_FACTOR);
                }
            }
            ViewerEvent::ZoomIn => self.transform.apply_zoom(ZOOM_IN_FACTOR),
            ViewerEvent::ZoomOut => self.transform.apply_zoom(ZOOM_OUT_FACTOR),
            ViewerEvent::ResetView => {
                self.transform.reset();
                // An unconfirmed enter counts as fullscreen: it may still land.
                let exit = match self.fullscreen.pending {
                    Some(PlatformRequest::EnterFullscreen) => true,
                    Some(PlatformRequest::ExitFullscreen) => false,
                    None => self.fullscreen.active,
                };
                if exit {
                    request = Some(PlatformRequest::ExitFullscreen);
                    self.fullscreen.pending = request;
                }
            }
            ViewerEvent::PointerDown { x, y } => {
                // A two-finger gesture owns the image until it ends.
                if !self.is_pinching() {
                    self.transform.begin_drag(x, y);
                }
            }
            ViewerEvent::PointerMove { x, y } => {
                self.transform.update_drag(x, y);
            }
            ViewerEvent::PointerUp => self.transform.end_drag(),
            ViewerEvent::TouchStart { id, x, y } => {
                match self.touch_index(id) {
                    Some(index) => self.touches[index].1 = [x, y],
                    None => self.touches.push((id, [x, y])),
                }
                self.pinch_distance = self.two_finger_distance();
                if self.pinch_distance.is_some() {
                    self.transform.end_drag();
                }
            }
            ViewerEvent::TouchMove { id, x, y } => {
                if let Some(index) = self.touch_index(id) {
                    self.touches[index].1 = [x, y];

                    if let Some(current) = self.two_finger_distance() {
                        if let Some(previous) = self.pinch_distance.filter(|d| *d > 0.0) {
                            self.transform.apply_zoom(current / previous);
                        }
                        self.pinch_distance = Some(current);
                    }
                }
            }
            ViewerEvent::TouchEnd { id } => {
                self.touches.retain(|(touch, _)| *touch != id);
                self.pinch_distance = self.two_finger_distance();
            }
            ViewerEvent::ToggleFullscreen => {
                if self.fullscreen.pending.is_none() {
                    let next = if self.fullscreen.active {
                        PlatformRequest::ExitFullscreen
                    } else {
                        PlatformRequest::EnterFullscreen
                    };
                    self.fullscreen.pending = Some(next);
                    request = Some(next);
                }
            }
            ViewerEvent::FullscreenChanged { active } => {
                self.fullscreen.active = active;
                self.fullscreen.pending = None;
            }
            ViewerEvent::FullscreenFailed { reason } => {
                log::warn!("Fullscreen error: {reason}");
                self.fullscreen.pending = None;
            }
        }

        Transition {
            state: self,
            request,
        }
    }

    /// Render step: what the UI should draw for the current state.
    pub fn view(&self) -> ViewModel {
        let cursor = if self.transform.is_dragging() {
            Cursor::Grabbing
        } else if self.transform.is_zoomed() {
            Cursor::Grab
        } else {
            Cursor::Default
        };

        ViewModel {
            transform: self.transform.render(),
            cursor,
            zoom_label: self.transform.zoom_label(),
            zoomed: self.transform.is_zoomed(),
            fullscreen_active: self.fullscreen.active,
            fullscreen_label: if self.fullscreen.active {
                "Exit Fullscreen"
            } else {
                "Fullscreen"
            },
        }
    }

    fn touch_index(&self, id: u64) -> Option<usize> {
        self.touches.iter().position(|(touch, _)| *touch == id)
    }

    fn two_finger_distance(&self) -> Option<f32> {
        match self.touches.as_slice() {
            [(_, a), (_, b)] => Some(touch_distance(*a, *b)),
            _ => None,
        }
    }
}
