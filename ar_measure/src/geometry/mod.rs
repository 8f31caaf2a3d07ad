//! Basic 3D geometry primitives for the measurement core.

mod rotation;
mod side;

pub use rotation::Quaternion;
pub use side::{Axis, Edge, Side};

use std::ops::{Add, Mul, Neg, Sub};

/// Representation of a 3D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the dot product with `other`.
    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product with `other`.
    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Returns the Euclidean length of the vector.
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns the vector scaled to unit length, or zero for a zero vector.
    pub fn normalized(self) -> Vector3 {
        let len = self.length();
        if len == 0.0 {
            Vector3::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Returns the component along `axis`.
    pub fn component(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns a copy with the component along `axis` replaced by `value`.
    pub fn with_component(self, axis: Axis, value: f64) -> Vector3 {
        let mut v = self;
        match axis {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
        v
    }

    /// Component-wise minimum.
    pub fn min_components(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    pub fn max_components(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance3(a: Vector3, b: Vector3) -> f64 {
    (b - a).length()
}

/// A ray with a normalized direction, used for hit testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray; `direction` is normalized.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    /// Returns the point at parameter `t` along the ray.
    pub fn point_at(self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// An infinite plane defined by a point and a normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vector3,
    pub normal: Vector3,
}

impl Plane {
    pub fn new(point: Vector3, normal: Vector3) -> Self {
        Self {
            point,
            normal: normal.normalized(),
        }
    }

    /// Intersects `ray` with the plane, returning the hit point in front of
    /// the ray origin, or `None` when the ray is parallel or points away.
    pub fn intersect_ray(&self, ray: Ray) -> Option<Vector3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.point_at(t))
    }
}
