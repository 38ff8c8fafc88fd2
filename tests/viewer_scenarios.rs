use approx::assert_relative_eq;

use vehicle_detector::transform::{SCALE_MAX, SCALE_MIN, TransformState};
use vehicle_detector::viewport::{
    Cursor, PlatformRequest, ViewerEvent, ViewportState, WheelTicks, WheelUnit,
};

fn run(state: ViewportState, events: impl IntoIterator<Item = ViewerEvent>) -> ViewportState {
    events
        .into_iter()
        .fold(state, |state, event| state.handle(event).state)
}

#[test]
fn scale_stays_within_bounds_for_any_factor() {
    let factors = [
        0.01, 0.1, 0.5, 0.8, 0.99, 1.0, 1.01, 1.2, 2.0, 10.0, 1000.0,
    ];

    let mut transform = TransformState::new();
    for round in 0..50 {
        let factor = factors[round % factors.len()];
        transform.apply_zoom(factor);
        assert!(
            (SCALE_MIN..=SCALE_MAX).contains(&transform.scale()),
            "scale {} out of bounds after factor {factor}",
            transform.scale()
        );
    }
}

#[test]
fn inverse_zoom_returns_to_previous_scale_inside_bounds() {
    for factor in [0.8_f32, 1.2, 1.5, 2.0, 3.0] {
        let mut transform = TransformState::new();
        transform.apply_zoom(1.5);
        let before = transform.scale();

        transform.apply_zoom(factor);
        transform.apply_zoom(1.0 / factor);

        assert_relative_eq!(transform.scale(), before, epsilon = 1e-4);
    }
}

#[test]
fn three_zoom_steps_show_173_percent() {
    let state = run(
        ViewportState::attach([800, 600]),
        [ViewerEvent::ZoomIn, ViewerEvent::ZoomIn, ViewerEvent::ZoomIn],
    );

    assert_relative_eq!(state.transform().scale(), 1.728, epsilon = 1e-4);
    assert_eq!(state.view().zoom_label, "173%");
}

#[test]
fn zooming_out_from_four_floors_at_half_size() {
    let mut transform = TransformState::new();
    transform.apply_zoom(4.0);

    let mut steps = 0;
    while transform.scale() > SCALE_MIN && steps < 100 {
        transform.apply_zoom(0.8);
        assert!(transform.scale() >= SCALE_MIN);
        steps += 1;
    }

    assert_eq!(transform.scale(), SCALE_MIN);
    assert_eq!(transform.zoom_label(), "50%");

    let state = run(
        ViewportState::attach([800, 600]),
        std::iter::repeat_n(ViewerEvent::ZoomOut, 10),
    );
    assert_relative_eq!(state.transform().scale(), SCALE_MIN);
}

#[test]
fn wheel_direction_selects_zoom_factor() {
    let state = run(
        ViewportState::attach([800, 600]),
        [ViewerEvent::Wheel { delta_y: 40.0 }],
    );
    assert_relative_eq!(state.transform().scale(), 1.2);

    let state = run(state, [ViewerEvent::Wheel { delta_y: -40.0 }]);
    assert_relative_eq!(state.transform().scale(), 0.96, epsilon = 1e-5);

    let state = run(state, [ViewerEvent::Wheel { delta_y: 0.0 }]);
    assert_relative_eq!(state.transform().scale(), 0.96, epsilon = 1e-5);
}

#[test]
fn trackpad_scroll_zooms_per_accumulated_tick() {
    let mut wheel = WheelTicks::default();
    let mut state = ViewportState::attach([800, 600]);

    // Twenty frames of small smooth-scroll deltas add up to 100 points.
    for _ in 0..20 {
        let ticks = wheel.feed(5.0, WheelUnit::Point);
        state = run(state, WheelTicks::events(ticks));
    }

    assert_relative_eq!(state.transform().scale(), 1.44, epsilon = 1e-4);
}

#[test]
fn wheel_notches_in_one_frame_each_count() {
    let mut wheel = WheelTicks::default();
    let ticks = wheel.feed(-2.0, WheelUnit::Line);
    let state = run(ViewportState::attach([800, 600]), WheelTicks::events(ticks));

    assert_relative_eq!(state.transform().scale(), 0.64, epsilon = 1e-5);
}

#[test]
fn drag_is_ignored_at_natural_size() {
    let state = run(
        ViewportState::attach([800, 600]),
        [
            ViewerEvent::PointerDown { x: 10.0, y: 10.0 },
            ViewerEvent::PointerMove { x: 90.0, y: 40.0 },
        ],
    );

    assert!(!state.transform().is_dragging());
    assert_eq!(state.transform().translation(), [0.0, 0.0]);
    assert_eq!(state.view().cursor, Cursor::Default);
}

#[test]
fn drag_tracks_pointer_one_to_one_when_zoomed() {
    let state = run(
        ViewportState::attach([800, 600]),
        [
            ViewerEvent::ZoomIn,
            ViewerEvent::PointerDown { x: 100.0, y: 100.0 },
        ],
    );
    assert_eq!(state.view().cursor, Cursor::Grabbing);

    let state = run(state, [ViewerEvent::PointerMove { x: 125.0, y: 90.0 }]);
    let [tx, ty] = state.transform().translation();
    assert_relative_eq!(tx, 25.0);
    assert_relative_eq!(ty, -10.0);

    let state = run(
        state,
        [
            ViewerEvent::PointerUp,
            ViewerEvent::PointerMove { x: 500.0, y: 500.0 },
        ],
    );
    assert_eq!(state.transform().translation(), [25.0, -10.0]);
    assert_eq!(state.view().cursor, Cursor::Grab);
}

#[test]
fn reset_restores_identity() {
    let state = run(
        ViewportState::attach([800, 600]),
        [
            ViewerEvent::ZoomIn,
            ViewerEvent::ZoomIn,
            ViewerEvent::PointerDown { x: 0.0, y: 0.0 },
            ViewerEvent::PointerMove { x: 30.0, y: 30.0 },
            ViewerEvent::ResetView,
        ],
    );

    assert_eq!(state.transform().scale(), 1.0);
    assert_eq!(state.transform().translation(), [0.0, 0.0]);
    assert!(!state.transform().is_dragging());
    assert_eq!(state.view().zoom_label, "100%");
}

#[test]
fn pinch_scales_by_ratio_of_successive_distances() {
    let state = run(
        ViewportState::attach([800, 600]),
        [
            ViewerEvent::TouchStart { id: 1, x: 0.0, y: 0.0 },
            ViewerEvent::TouchStart { id: 2, x: 100.0, y: 0.0 },
            ViewerEvent::TouchMove { id: 2, x: 150.0, y: 0.0 },
        ],
    );
    assert!(state.is_pinching());
    assert_relative_eq!(state.transform().scale(), 1.5, epsilon = 1e-5);

    let state = run(state, [ViewerEvent::TouchMove { id: 2, x: 120.0, y: 0.0 }]);
    assert_relative_eq!(state.transform().scale(), 1.2, epsilon = 1e-5);

    let state = run(state, [ViewerEvent::TouchEnd { id: 1 }]);
    assert!(!state.is_pinching());
}

#[test]
fn fullscreen_round_trip() {
    let transition = ViewportState::attach([800, 600]).handle(ViewerEvent::ToggleFullscreen);
    assert_eq!(transition.request, Some(PlatformRequest::EnterFullscreen));

    let state = run(
        transition.state,
        [ViewerEvent::FullscreenChanged { active: true }],
    );
    assert_eq!(state.view().fullscreen_label, "Exit Fullscreen");

    let transition = state.handle(ViewerEvent::ResetView);
    assert_eq!(transition.request, Some(PlatformRequest::ExitFullscreen));

    let state = run(
        transition.state,
        [ViewerEvent::FullscreenChanged { active: false }],
    );
    assert!(!state.fullscreen_active());
    assert_eq!(state.view().fullscreen_label, "Fullscreen");
}

#[test]
fn reset_before_fullscreen_is_confirmed_still_exits() {
    let transition = ViewportState::attach([800, 600]).handle(ViewerEvent::ToggleFullscreen);
    assert_eq!(transition.request, Some(PlatformRequest::EnterFullscreen));

    let transition = transition.state.handle(ViewerEvent::ResetView);
    assert_eq!(transition.request, Some(PlatformRequest::ExitFullscreen));

    // The late enter confirmation is followed by the exit confirmation.
    let state = run(
        transition.state,
        [
            ViewerEvent::FullscreenChanged { active: true },
            ViewerEvent::FullscreenChanged { active: false },
        ],
    );
    assert!(!state.fullscreen_active());
    assert_eq!(state.fullscreen_pending(), None);
}

#[test]
fn refused_fullscreen_leaves_state_usable() {
    let state = run(
        ViewportState::attach([800, 600]),
        [
            ViewerEvent::ToggleFullscreen,
            ViewerEvent::FullscreenFailed {
                reason: "denied".to_owned(),
            },
        ],
    );
    assert!(!state.fullscreen_active());
    assert_eq!(state.fullscreen_pending(), None);

    let transition = state.handle(ViewerEvent::ToggleFullscreen);
    assert_eq!(transition.request, Some(PlatformRequest::EnterFullscreen));
}
