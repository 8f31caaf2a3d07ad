//! Per-frame world-tracking snapshot supplied by the host.

use crate::geometry::{Quaternion, Vector3};

/// A tracked 3D point reconstructed from visual tracking.
///
/// Identifiers are stable across frames.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeaturePoint {
    pub identifier: u64,
    pub position: Vector3,
}

impl FeaturePoint {
    pub fn new(identifier: u64, position: Vector3) -> Self {
        Self {
            identifier,
            position,
        }
    }
}

/// A tracked, host-detected flat real-world surface.
///
/// `center` and `extent` are expressed in the anchor's local frame; the
/// plane itself lies in the local XZ plane. `extent.x`/`extent.z` span the
/// observed surface.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaneAnchor {
    pub identifier: u64,
    pub center: Vector3,
    pub extent: Vector3,
    pub position: Vector3,
    pub rotation: Quaternion,
}

impl PlaneAnchor {
    /// Creates a horizontal anchor at `position` with the given local center
    /// and extent.
    pub fn horizontal(identifier: u64, position: Vector3, center: Vector3, extent: Vector3) -> Self {
        Self {
            identifier,
            center,
            extent,
            position,
            rotation: Quaternion::IDENTITY,
        }
    }

    /// Converts a world point into the anchor's local frame.
    pub fn world_to_local(&self, p: Vector3) -> Vector3 {
        self.rotation.inverse().rotate_vector(p - self.position)
    }

    /// Converts an anchor-local point to world coordinates.
    pub fn local_to_world(&self, p: Vector3) -> Vector3 {
        self.position + self.rotation.rotate_vector(p)
    }

    /// Tests whether a local point lies within the observed extent, scaled
    /// by `margin` (1.0 = exact extent, 1.1 = 10% tolerance).
    pub fn contains_local(&self, p: Vector3, margin: f64) -> bool {
        (p.x - self.center.x).abs() <= self.extent.x * 0.5 * margin
            && (p.z - self.center.z).abs() <= self.extent.z * 0.5 * margin
    }
}

/// Everything the core reads from one tracking frame.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TrackingFrame {
    pub feature_points: Vec<FeaturePoint>,
    pub plane_anchors: Vec<PlaneAnchor>,
}

impl TrackingFrame {
    pub fn new(feature_points: Vec<FeaturePoint>, plane_anchors: Vec<PlaneAnchor>) -> Self {
        Self {
            feature_points,
            plane_anchors,
        }
    }
}
