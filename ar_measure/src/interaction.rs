//! The box-drawing gesture workflow.
//!
//! Raw touch events arrive as rays plus gesture phases; the state machine
//! interprets them against the current mode, mutates the box, and keeps the
//! renderer-facing visibility flags consistent.

use crate::geometry::{Plane, Quaternion, Ray, Side, Vector3};
use crate::hit_test::HitTestRouter;
use crate::oriented_box::OrientedBox;
use crate::tracking::TrackingFrame;
use std::f64::consts::PI;

/// Phase of a continuous gesture as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// The box-drawing workflow state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    WaitingForLocation,
    DraggingInitialWidth,
    DraggingInitialLength,
    WaitingForFaceDrag,
    DraggingFace {
        side: Side,
        /// Box-local point where the drag grabbed the face.
        drag_start: Vector3,
    },
}

/// Turns gestures and hit-test results into box mutations and helper-node
/// visibility. All mutations happen on the host's render thread.
pub struct InteractionStateMachine {
    mode: InteractionMode,
    pub router: HitTestRouter,
    /// Minimum usable drag distance before an initial width or length
    /// counts, meters.
    pub min_drag_distance: f64,
    plane_reference: Option<u64>,
    helper_plane: Option<Plane>,
    floor_visible: bool,
    plane_visualization_enabled: bool,
    rotation_enabled: bool,
    tap_mode: bool,
    last_rotation_angle: f64,
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionStateMachine {
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::WaitingForLocation,
            router: HitTestRouter::new(),
            min_drag_distance: 0.05,
            plane_reference: None,
            helper_plane: None,
            floor_visible: false,
            plane_visualization_enabled: true,
            rotation_enabled: false,
            tap_mode: false,
            last_rotation_angle: 0.0,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// The anchor the box was placed on, when placement hit a tracked plane.
    pub fn plane_reference(&self) -> Option<u64> {
        self.plane_reference
    }

    /// Pose of the infinite hit-test helper plane; `None` while hidden.
    pub fn helper_plane(&self) -> Option<Plane> {
        self.helper_plane
    }

    /// Whether the floor-reflection surface under the box is shown.
    pub fn floor_visible(&self) -> bool {
        self.floor_visible
    }

    /// Whether detected-plane visualization is shown. Hidden during any
    /// active drag so planes don't visually compete with the box.
    pub fn plane_visualization_enabled(&self) -> bool {
        self.plane_visualization_enabled
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn tap_mode(&self) -> bool {
        self.tap_mode
    }

    /// Toggles the low-precision tap placement path and its auxiliary
    /// visual markers.
    pub fn set_tap_mode(&mut self, enabled: bool) {
        self.tap_mode = enabled;
    }

    /// Handles one pan gesture event. A hit-test miss is a no-op.
    pub fn handle_pan(
        &mut self,
        phase: GesturePhase,
        ray: Ray,
        frame: &TrackingFrame,
        bbox: &mut OrientedBox,
    ) {
        match (self.mode, phase) {
            (InteractionMode::WaitingForLocation, GesturePhase::Began)
            | (InteractionMode::WaitingForLocation, GesturePhase::Changed) => {
                self.place_box(ray, frame, bbox);
            }
            (InteractionMode::DraggingInitialWidth, GesturePhase::Began)
            | (InteractionMode::DraggingInitialWidth, GesturePhase::Changed) => {
                self.drag_initial_width(ray, bbox);
            }
            (InteractionMode::DraggingInitialWidth, GesturePhase::Ended)
            | (InteractionMode::DraggingInitialWidth, GesturePhase::Cancelled) => {
                if bbox.extent().x >= self.min_drag_distance {
                    self.set_mode(InteractionMode::DraggingInitialLength, bbox, Some(ray));
                } else {
                    // Too short to measure: silently revert and let the user
                    // start over.
                    bbox.reset();
                    self.set_mode(InteractionMode::WaitingForLocation, bbox, None);
                }
            }
            (InteractionMode::DraggingInitialLength, GesturePhase::Began)
            | (InteractionMode::DraggingInitialLength, GesturePhase::Changed) => {
                self.drag_initial_length(ray, bbox);
            }
            (InteractionMode::DraggingInitialLength, GesturePhase::Ended)
            | (InteractionMode::DraggingInitialLength, GesturePhase::Cancelled) => {
                if bbox.extent().z >= self.min_drag_distance {
                    self.set_mode(InteractionMode::WaitingForFaceDrag, bbox, Some(ray));
                }
                // Otherwise stay; the next drag keeps refining the length.
            }
            (InteractionMode::WaitingForFaceDrag, GesturePhase::Began)
            | (InteractionMode::WaitingForFaceDrag, GesturePhase::Changed) => {
                if let Some((side, drag_start)) = bbox.hit_test_face(ray) {
                    bbox.highlight(side);
                    self.set_mode(
                        InteractionMode::DraggingFace { side, drag_start },
                        bbox,
                        Some(ray),
                    );
                }
            }
            (InteractionMode::DraggingFace { side, .. }, GesturePhase::Began)
            | (InteractionMode::DraggingFace { side, .. }, GesturePhase::Changed) => {
                self.drag_face(side, ray, bbox);
            }
            (InteractionMode::DraggingFace { .. }, GesturePhase::Ended)
            | (InteractionMode::DraggingFace { .. }, GesturePhase::Cancelled) => {
                bbox.clear_highlights();
                self.set_mode(InteractionMode::WaitingForFaceDrag, bbox, Some(ray));
            }
            // Ended/cancelled without an active drag changes nothing.
            _ => {}
        }
    }

    /// Handles a discrete tap: the low-precision alternate path through the
    /// two initial placement transitions.
    pub fn handle_tap(&mut self, ray: Ray, frame: &TrackingFrame, bbox: &mut OrientedBox) {
        match self.mode {
            InteractionMode::WaitingForLocation => {
                self.place_box(ray, frame, bbox);
            }
            InteractionMode::DraggingInitialWidth => {
                self.drag_initial_width(ray, bbox);
                if bbox.extent().x >= self.min_drag_distance {
                    self.set_mode(InteractionMode::DraggingInitialLength, bbox, Some(ray));
                }
            }
            InteractionMode::DraggingInitialLength => {
                self.drag_initial_length(ray, bbox);
                if bbox.extent().z >= self.min_drag_distance {
                    self.set_mode(InteractionMode::WaitingForFaceDrag, bbox, Some(ray));
                }
            }
            _ => {}
        }
    }

    /// Unconditional reset from any state.
    pub fn handle_double_tap(&mut self, bbox: &mut OrientedBox) {
        bbox.reset();
        self.set_mode(InteractionMode::WaitingForLocation, bbox, None);
    }

    /// Handles the twist gesture; `angle` is the recognizer's cumulative
    /// rotation. Inactive while waiting for a location.
    pub fn handle_rotation(&mut self, phase: GesturePhase, angle: f64, bbox: &mut OrientedBox) {
        if !self.rotation_enabled {
            return;
        }
        match phase {
            GesturePhase::Began => {
                self.last_rotation_angle = angle;
            }
            GesturePhase::Changed => {
                let delta = angle - self.last_rotation_angle;
                self.last_rotation_angle = angle;
                let pivot = bbox.local_to_world(bbox.point_in_bounds(Vector3::new(0.5, 0.0, 0.5)));
                bbox.rotate_around(-delta, pivot);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {}
        }
    }

    /// Resolves the first touch to a world location and starts the width
    /// drag there.
    fn place_box(&mut self, ray: Ray, frame: &TrackingFrame, bbox: &mut OrientedBox) {
        let Some(hit) = self.router.resolve(ray, frame) else {
            return;
        };
        bbox.set_position(hit.world_position);
        bbox.set_rotation(Quaternion::IDENTITY);
        self.plane_reference = hit.plane;
        self.set_mode(InteractionMode::DraggingInitialWidth, bbox, Some(ray));
    }

    /// Width drag: the box's right face follows the hit point while the box
    /// yaws to face the drawn line.
    fn drag_initial_width(&mut self, ray: Ray, bbox: &mut OrientedBox) {
        let Some(hit) = self.helper_plane.and_then(|p| p.intersect_ray(ray)) else {
            return;
        };
        let delta = bbox.position() - hit;
        let distance = delta.length();
        let angle = delta.z.atan2(delta.x);
        bbox.move_side(Side::Right, distance);
        bbox.set_rotation(Quaternion::from_yaw(-(angle + PI)));
    }

    /// Length drag: front/back follow the hit point's box-local z.
    fn drag_initial_length(&mut self, ray: Ray, bbox: &mut OrientedBox) {
        let Some(hit) = self.helper_plane.and_then(|p| p.intersect_ray(ray)) else {
            return;
        };
        let local = bbox.world_to_local(hit);
        if local.z < 0.0 {
            bbox.move_side(Side::Front, 0.0);
            bbox.move_side(Side::Back, local.z);
        } else {
            bbox.move_side(Side::Front, local.z);
            bbox.move_side(Side::Back, 0.0);
        }
    }

    /// Face drag: the grabbed face follows the hit point's offset along its
    /// axis. `move_side` clamps against the opposite face.
    fn drag_face(&mut self, side: Side, ray: Ray, bbox: &mut OrientedBox) {
        let Some(hit) = self.helper_plane.and_then(|p| p.intersect_ray(ray)) else {
            return;
        };
        let local = bbox.world_to_local(hit);
        bbox.move_side(side, local.component(side.axis()));
    }

    /// Performs every side effect of entering `mode`: visibility of the box,
    /// the hit-test helper plane and the floor reflector, helper-plane pose,
    /// rotation-gesture enablement and detected-plane visualization.
    fn set_mode(&mut self, mode: InteractionMode, bbox: &mut OrientedBox, ray: Option<Ray>) {
        log::debug!("mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        match mode {
            InteractionMode::WaitingForLocation => {
                bbox.set_visible(false);
                self.plane_reference = None;
                self.helper_plane = None;
                self.floor_visible = false;
                self.rotation_enabled = false;
                self.plane_visualization_enabled = true;
            }
            InteractionMode::DraggingInitialWidth | InteractionMode::DraggingInitialLength => {
                bbox.set_visible(true);
                // Flat under the box for the initial drags.
                self.helper_plane = Some(Plane::new(
                    bbox.position(),
                    Vector3::new(0.0, 1.0, 0.0),
                ));
                self.floor_visible = false;
                self.rotation_enabled = true;
                self.plane_visualization_enabled = false;
            }
            InteractionMode::WaitingForFaceDrag => {
                bbox.set_visible(true);
                self.helper_plane = None;
                self.floor_visible = true;
                self.rotation_enabled = true;
                self.plane_visualization_enabled = true;
            }
            InteractionMode::DraggingFace { side, drag_start } => {
                bbox.set_visible(true);
                self.helper_plane = Some(face_drag_plane(bbox, side, drag_start, ray));
                self.floor_visible = true;
                self.rotation_enabled = true;
                self.plane_visualization_enabled = false;
            }
        }
    }
}

/// Plane the face drag is resolved against. It passes through the grabbed
/// point; the normal is whichever non-drag axis is more face-on to the
/// current ray, so the drag axis stays inside the plane and intersections
/// stay well-conditioned.
fn face_drag_plane(
    bbox: &OrientedBox,
    side: Side,
    drag_start: Vector3,
    ray: Option<Ray>,
) -> Plane {
    let point = bbox.local_to_world(drag_start);
    let [a, b] = side.axis().others();
    let na = bbox.rotation().rotate_vector(a.unit());
    let nb = bbox.rotation().rotate_vector(b.unit());
    let normal = match ray {
        Some(r) if nb.dot(r.direction).abs() > na.dot(r.direction).abs() => nb,
        _ => na,
    };
    Plane::new(point, normal)
}
