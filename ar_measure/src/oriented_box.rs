//! The user-drawn measurement box: per-face offsets in local space plus a
//! world position and yaw rotation.

use crate::geometry::{Edge, Plane, Quaternion, Ray, Side, Vector3};

/// Six face offsets stored as a min/max corner pair in box-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct LocalBounds {
    pub min: Vector3,
    pub max: Vector3,
}

impl LocalBounds {
    pub const ZERO: LocalBounds = LocalBounds {
        min: Vector3::ZERO,
        max: Vector3::ZERO,
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Returns the offset of `side`'s face along its axis.
    pub fn offset(&self, side: Side) -> f64 {
        match side.edge() {
            Edge::Min => self.min.component(side.axis()),
            Edge::Max => self.max.component(side.axis()),
        }
    }

    /// Returns the per-axis extents (max − min).
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the local-space midpoint.
    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }
}

/// The measurement triple reported to the host, in meters.
///
/// Length, width and height are the z, x and y extents respectively.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Measurement {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of one box face in local space, for hit testing and highlight
/// wiring by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub side: Side,
    /// Center of the face rectangle.
    pub center: Vector3,
    /// Outward unit normal.
    pub normal: Vector3,
}

/// Callback fired after every extent change; `None` signals that no valid
/// measurement exists (some extent is not positive).
pub type MeasurementHandler = Box<dyn FnMut(Option<Measurement>)>;

/// An oriented bounding box with independently movable faces.
///
/// Created once per session, hidden; positioned and shown when the first
/// touch resolves to a real-world location, reset (never destroyed) on
/// double-tap.
pub struct OrientedBox {
    bounds: LocalBounds,
    position: Vector3,
    rotation: Quaternion,
    highlighted: Option<Side>,
    visible: bool,
    on_measurement: Option<MeasurementHandler>,
}

impl Default for OrientedBox {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrientedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrientedBox")
            .field("bounds", &self.bounds)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("highlighted", &self.highlighted)
            .field("visible", &self.visible)
            .finish()
    }
}

impl OrientedBox {
    /// Creates a hidden zero-extent box at the origin.
    pub fn new() -> Self {
        Self {
            bounds: LocalBounds::ZERO,
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            highlighted: None,
            visible: false,
            on_measurement: None,
        }
    }

    pub fn bounds(&self) -> LocalBounds {
        self.bounds
    }

    pub fn extent(&self) -> Vector3 {
        self.bounds.extent()
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Registers the measurement callback, replacing any previous one.
    pub fn on_measurement(&mut self, handler: MeasurementHandler) {
        self.on_measurement = Some(handler);
    }

    /// Moves `side`'s face to `offset` along its axis, clamped so it never
    /// crosses the opposite face. Fires the measurement callback.
    pub fn move_side(&mut self, side: Side, offset: f64) {
        let axis = side.axis();
        let clamped = match side.edge() {
            Edge::Min => offset.min(self.bounds.max.component(axis)),
            Edge::Max => offset.max(self.bounds.min.component(axis)),
        };
        log::trace!("move {:?} to {:.4}", side, clamped);
        match side.edge() {
            Edge::Min => self.bounds.min = self.bounds.min.with_component(axis, clamped),
            Edge::Max => self.bounds.max = self.bounds.max.with_component(axis, clamped),
        }
        self.emit_measurement();
    }

    /// Directly sets all six offsets. Used for reset and for bulk updates
    /// from the fitter. Fires the measurement callback.
    pub fn resize_to(&mut self, min: Vector3, max: Vector3) {
        self.bounds = LocalBounds::new(min, max);
        self.emit_measurement();
    }

    /// Applies an incremental yaw rotation about a world-space pivot,
    /// keeping the pivot fixed.
    pub fn rotate_around(&mut self, delta_yaw: f64, pivot: Vector3) {
        let q = Quaternion::from_yaw(delta_yaw);
        self.rotation = (q * self.rotation).normalized();
        self.position = pivot + q.rotate_vector(self.position - pivot);
    }

    /// Returns the local point interpolated between min and max per axis;
    /// `frac` components are in [0, 1]. (0.5, 0, 0.5) is the bottom center.
    pub fn point_in_bounds(&self, frac: Vector3) -> Vector3 {
        let ext = self.bounds.extent();
        Vector3::new(
            self.bounds.min.x + ext.x * frac.x,
            self.bounds.min.y + ext.y * frac.y,
            self.bounds.min.z + ext.z * frac.z,
        )
    }

    /// Converts a box-local point to world coordinates.
    pub fn local_to_world(&self, p: Vector3) -> Vector3 {
        self.position + self.rotation.rotate_vector(p)
    }

    /// Converts a world point into box-local coordinates.
    pub fn world_to_local(&self, p: Vector3) -> Vector3 {
        self.rotation.inverse().rotate_vector(p - self.position)
    }

    /// Marks `side` as under drag for visual feedback.
    pub fn highlight(&mut self, side: Side) {
        self.highlighted = Some(side);
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted = None;
    }

    pub fn highlighted_side(&self) -> Option<Side> {
        self.highlighted
    }

    /// Returns the six face geometries in local space.
    pub fn faces(&self) -> [Face; 6] {
        Side::ALL.map(|side| {
            let center = self
                .bounds
                .center()
                .with_component(side.axis(), self.bounds.offset(side));
            Face {
                side,
                center,
                normal: side.normal(),
            }
        })
    }

    /// Hit-tests `ray` against all six faces and returns the nearest hit as
    /// a side plus the box-local hit point.
    pub fn hit_test_face(&self, ray: Ray) -> Option<(Side, Vector3)> {
        let mut best: Option<(Side, Vector3, f64)> = None;
        for face in self.faces() {
            let plane = Plane::new(
                self.local_to_world(face.center),
                self.rotation.rotate_vector(face.normal),
            );
            let Some(hit) = plane.intersect_ray(ray) else {
                continue;
            };
            let local = self.world_to_local(hit);
            if !self.on_face(face.side, local) {
                continue;
            }
            let t = (hit - ray.origin).length();
            if best.map_or(true, |(_, _, bt)| t < bt) {
                best = Some((face.side, local, t));
            }
        }
        best.map(|(side, local, _)| (side, local))
    }

    /// Resets to a hidden zero-extent box, clearing any highlight. Position
    /// and rotation are left for the next placement to overwrite.
    pub fn reset(&mut self) {
        self.clear_highlights();
        self.visible = false;
        self.resize_to(Vector3::ZERO, Vector3::ZERO);
    }

    /// Returns the current measurement, `None` when any extent is not
    /// positive.
    pub fn measurement(&self) -> Option<Measurement> {
        let ext = self.bounds.extent();
        if ext.x > 0.0 && ext.y > 0.0 && ext.z > 0.0 {
            Some(Measurement {
                length: ext.z,
                width: ext.x,
                height: ext.y,
            })
        } else {
            None
        }
    }

    fn emit_measurement(&mut self) {
        let m = self.measurement();
        if let Some(handler) = self.on_measurement.as_mut() {
            handler(m);
        }
    }

    /// Tests whether a box-local point lies within the rectangle of `side`,
    /// ignoring the face's own axis.
    fn on_face(&self, side: Side, local: Vector3) -> bool {
        const EPS: f64 = 1e-9;
        side.axis().others().iter().all(|&a| {
            let v = local.component(a);
            v >= self.bounds.min.component(a) - EPS && v <= self.bounds.max.component(a) + EPS
        })
    }
}
