use ar_measure::geometry::{Ray, Side, Vector3};
use ar_measure::interaction::{GesturePhase, InteractionMode, InteractionStateMachine};
use ar_measure::oriented_box::{Measurement, OrientedBox};
use ar_measure::tracking::{PlaneAnchor, TrackingFrame};
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn floor_frame() -> TrackingFrame {
    TrackingFrame::new(
        vec![],
        vec![PlaneAnchor::horizontal(
            1,
            Vector3::ZERO,
            Vector3::ZERO,
            Vector3::new(4.0, 0.0, 4.0),
        )],
    )
}

fn ray_down_at(x: f64, z: f64) -> Ray {
    Ray::new(Vector3::new(x, 1.0, z), Vector3::new(0.0, -1.0, 0.0))
}

/// Ray from a fixed vantage point toward an arbitrary target.
fn ray_toward(origin: Vector3, target: Vector3) -> Ray {
    Ray::new(origin, target - origin)
}

#[test]
fn full_box_drawing_workflow() {
    init_logging();
    let mut sm = InteractionStateMachine::new();
    let mut bbox = OrientedBox::new();
    let frame = floor_frame();
    let seen: Rc<RefCell<Option<Option<Measurement>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    bbox.on_measurement(Box::new(move |m| {
        *sink.borrow_mut() = Some(m);
    }));

    // First touch resolves against the floor plane and places the box.
    sm.handle_pan(GesturePhase::Began, ray_down_at(0.0, 0.0), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::DraggingInitialWidth);
    assert_eq!(bbox.position(), Vector3::ZERO);
    assert_eq!(sm.plane_reference(), Some(1));

    // Dragging a meter along +X sets the width and the yaw.
    sm.handle_pan(GesturePhase::Changed, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    assert!((bbox.extent().x - 1.0).abs() < 1e-9);
    // The drawn line runs along +X, so the box's local X must still map to
    // world X (yaw is a full turn here, i.e. effectively identity).
    let x_world = bbox.rotation().rotate_vector(Vector3::new(1.0, 0.0, 0.0));
    assert!((x_world.x - 1.0).abs() < 1e-9);
    assert!(x_world.z.abs() < 1e-9);

    // Ending above the minimum drag distance advances to the length drag.
    sm.handle_pan(GesturePhase::Ended, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::DraggingInitialLength);

    // Dragging toward +Z sets the length; the back face stays at zero.
    sm.handle_pan(GesturePhase::Changed, ray_down_at(0.5, 0.7), &frame, &mut bbox);
    assert!((bbox.extent().z - 0.7).abs() < 1e-6);
    assert!(bbox.bounds().min.z.abs() < 1e-6);
    sm.handle_pan(GesturePhase::Ended, ray_down_at(0.5, 0.7), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForFaceDrag);
    assert!(sm.floor_visible());
    assert!(sm.plane_visualization_enabled());

    // Grab the top face with an oblique ray and pull it up half a meter.
    let vantage = Vector3::new(0.5, 1.0, -1.0);
    let grab = ray_toward(vantage, Vector3::new(0.5, 0.0, 0.35));
    sm.handle_pan(GesturePhase::Began, grab, &frame, &mut bbox);
    match sm.mode() {
        InteractionMode::DraggingFace { side, .. } => assert_eq!(side, Side::Top),
        other => panic!("expected a face drag, got {other:?}"),
    }
    assert_eq!(bbox.highlighted_side(), Some(Side::Top));
    assert!(!sm.plane_visualization_enabled());

    let pull = ray_toward(vantage, Vector3::new(0.5, 0.5, 0.35));
    sm.handle_pan(GesturePhase::Changed, pull, &frame, &mut bbox);
    assert!((bbox.extent().y - 0.5).abs() < 1e-6);

    sm.handle_pan(GesturePhase::Ended, pull, &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForFaceDrag);
    assert_eq!(bbox.highlighted_side(), None);

    // The callback saw the final, complete measurement.
    let m = seen.borrow().unwrap().unwrap();
    assert!((m.width - 1.0).abs() < 1e-6);
    assert!((m.length - 0.7).abs() < 1e-6);
    assert!((m.height - 0.5).abs() < 1e-6);
}

#[test]
fn face_drag_cannot_invert_the_box() {
    init_logging();
    let mut sm = InteractionStateMachine::new();
    let mut bbox = OrientedBox::new();
    let frame = floor_frame();
    sm.handle_pan(GesturePhase::Began, ray_down_at(0.0, 0.0), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Changed, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Ended, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Changed, ray_down_at(0.5, 0.7), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Ended, ray_down_at(0.5, 0.7), &frame, &mut bbox);

    // Give the box some height first.
    let top_vantage = Vector3::new(0.5, 1.0, -1.0);
    sm.handle_pan(
        GesturePhase::Began,
        ray_toward(top_vantage, Vector3::new(0.5, 0.0, 0.35)),
        &frame,
        &mut bbox,
    );
    sm.handle_pan(
        GesturePhase::Changed,
        ray_toward(top_vantage, Vector3::new(0.5, 0.5, 0.35)),
        &frame,
        &mut bbox,
    );
    sm.handle_pan(
        GesturePhase::Ended,
        ray_toward(top_vantage, Vector3::new(0.5, 0.5, 0.35)),
        &frame,
        &mut bbox,
    );
    assert!((bbox.extent().y - 0.5).abs() < 1e-6);

    // Grab the front face and push it far past the back face.
    let vantage = Vector3::new(0.5, 1.5, 2.0);
    let grab = ray_toward(vantage, Vector3::new(0.5, 0.25, 0.7));
    sm.handle_pan(GesturePhase::Began, grab, &frame, &mut bbox);
    match sm.mode() {
        InteractionMode::DraggingFace { side, .. } => assert_eq!(side, Side::Front),
        other => panic!("expected a front-face drag, got {other:?}"),
    }
    let push = ray_toward(vantage, Vector3::new(0.5, 0.25, -5.0));
    sm.handle_pan(GesturePhase::Changed, push, &frame, &mut bbox);
    let b = bbox.bounds();
    assert!(b.min.z <= b.max.z);
    assert!(b.max.z.abs() < 1e-6);
}

#[test]
fn gesture_phases_are_total_in_every_state() {
    init_logging();
    let frame = floor_frame();
    let empty = TrackingFrame::default();
    // Points away from everything, including the infinite helper plane.
    let miss = Ray::new(Vector3::new(50.0, 1.0, 50.0), Vector3::new(0.0, 1.0, 0.0));
    let phases = [
        GesturePhase::Began,
        GesturePhase::Changed,
        GesturePhase::Ended,
        GesturePhase::Cancelled,
    ];

    // Walk the machine through each reachable state; at every stop, a miss
    // ray with any phase, a tap, and a rotation must leave it in a defined
    // state without panicking.
    let mut sm = InteractionStateMachine::new();
    let mut bbox = OrientedBox::new();
    let poke = |sm: &mut InteractionStateMachine, bbox: &mut OrientedBox| {
        let before = sm.mode();
        for phase in phases {
            sm.handle_pan(phase, miss, &empty, bbox);
            sm.handle_rotation(phase, 0.1, bbox);
        }
        sm.handle_tap(miss, &empty, bbox);
        (before, sm.mode())
    };

    // WaitingForLocation: misses change nothing.
    let (_, after) = poke(&mut sm, &mut bbox);
    assert_eq!(after, InteractionMode::WaitingForLocation);

    // DraggingInitialWidth: a miss pan-ended with zero width reverts.
    sm.handle_pan(GesturePhase::Began, ray_down_at(0.0, 0.0), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::DraggingInitialWidth);
    poke(&mut sm, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForLocation);

    // Rebuild up to the face-drag states and poke each.
    sm.handle_pan(GesturePhase::Began, ray_down_at(0.0, 0.0), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Changed, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Ended, ray_down_at(1.0, 0.0), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::DraggingInitialLength);
    poke(&mut sm, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::DraggingInitialLength);

    sm.handle_pan(GesturePhase::Changed, ray_down_at(0.5, 0.7), &frame, &mut bbox);
    sm.handle_pan(GesturePhase::Ended, ray_down_at(0.5, 0.7), &frame, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForFaceDrag);
    poke(&mut sm, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForFaceDrag);

    let grab = ray_toward(Vector3::new(0.5, 1.0, -1.0), Vector3::new(0.5, 0.0, 0.35));
    sm.handle_pan(GesturePhase::Began, grab, &frame, &mut bbox);
    assert!(matches!(sm.mode(), InteractionMode::DraggingFace { .. }));
    // A miss pan-ended drops back to waiting; everything else is a no-op.
    poke(&mut sm, &mut bbox);
    assert_eq!(sm.mode(), InteractionMode::WaitingForFaceDrag);
}
