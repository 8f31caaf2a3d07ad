//! Fits and snaps the measurement box to scanned surface data.

use crate::geometry::{distance3, Vector3};
use crate::oriented_box::OrientedBox;
use crate::tracking::{FeaturePoint, PlaneAnchor};

/// Refines a box extent from a live feature-point cloud and snaps its
/// bottom onto nearby detected planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxFitter {
    /// Points farther than this from the focus point are ignored, meters.
    pub focus_radius: f64,
    /// Neighborhood radius for the outlier density test, meters.
    pub neighbor_radius: f64,
    /// A point is kept only with at least this many neighbors in range.
    pub min_neighbors: usize,
    /// Plane-extent tolerance factor for the snap membership test.
    pub snap_margin: f64,
    /// Offsets at or below this are treated as already aligned, meters.
    pub min_snap_offset: f64,
    /// Set by the manual-drag collaborator; permanently disables auto-snap.
    pub has_been_adjusted_by_user: bool,
    pub is_snapped_to_horizontal_plane: bool,
}

impl Default for BoundingBoxFitter {
    fn default() -> Self {
        Self {
            focus_radius: 0.05,
            neighbor_radius: 0.03,
            min_neighbors: 3,
            snap_margin: 1.1,
            min_snap_offset: 0.001,
            has_been_adjusted_by_user: false,
            is_snapped_to_horizontal_plane: false,
        }
    }
}

impl BoundingBoxFitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands and recenters `bbox` over the surviving cloud points.
    ///
    /// Candidates outside `focus_radius` of `focus` are dropped first, then
    /// isolated points are rejected by a local density test. When nothing
    /// survives the box is left untouched.
    pub fn fit_over_point_cloud(
        &self,
        bbox: &mut OrientedBox,
        points: &[FeaturePoint],
        focus: Option<Vector3>,
    ) {
        let candidates: Vec<Vector3> = points
            .iter()
            .map(|fp| fp.position)
            .filter(|p| match focus {
                Some(f) => distance3(*p, f) <= self.focus_radius,
                None => true,
            })
            .collect();
        let survivors = filter_isolated(&candidates, self.neighbor_radius, self.min_neighbors);
        if survivors.is_empty() {
            return;
        }

        let bounds = bbox.bounds();
        let mut min = bounds.min;
        let mut max = bounds.max;
        for p in &survivors {
            let local = bbox.world_to_local(*p);
            min = min.min_components(local);
            max = max.max_components(local);
        }
        let midpoint = (min + max) * 0.5;
        bbox.set_position(bbox.local_to_world(midpoint));
        bbox.resize_to(min - midpoint, max - midpoint);
    }

    /// Snaps the box's bottom onto the best nearby detected plane.
    ///
    /// Among planes whose extent (with tolerance) contains the box's
    /// bottom-center, the one with the smallest vertical offset wins. The
    /// snap only fires for a plane below the box and within half the box's
    /// height: the box is lowered by half the offset and grown by the full
    /// offset, so its top edge stays roughly fixed while the bottom meets
    /// the plane. Skipped entirely once the user has adjusted the box.
    pub fn try_to_align_with_planes(&mut self, bbox: &mut OrientedBox, anchors: &[PlaneAnchor]) {
        if self.has_been_adjusted_by_user {
            return;
        }
        let bottom_center = bbox.local_to_world(bbox.point_in_bounds(Vector3::new(0.5, 0.0, 0.5)));
        let mut best: Option<f64> = None;
        for anchor in anchors {
            let local = anchor.world_to_local(bottom_center);
            if !anchor.contains_local(local, self.snap_margin) {
                continue;
            }
            if best.map_or(true, |b: f64| local.y.abs() < b.abs()) {
                best = Some(local.y);
            }
        }
        let Some(offset) = best else {
            return;
        };
        let height = bbox.extent().y;
        if offset <= self.min_snap_offset || offset > height * 0.5 {
            return;
        }

        log::debug!("snapping box bottom to plane, offset {:.4}", offset);
        let mut position = bbox.position();
        position.y -= offset * 0.5;
        bbox.set_position(position);
        let bounds = bbox.bounds();
        bbox.resize_to(
            Vector3::new(bounds.min.x, bounds.min.y - offset * 0.5, bounds.min.z),
            Vector3::new(bounds.max.x, bounds.max.y + offset * 0.5, bounds.max.z),
        );
        self.is_snapped_to_horizontal_plane = true;
    }
}

/// Keeps a point only when at least `min_neighbors` other points lie within
/// `radius` of it. Naive O(n²); per-frame clouds stay small.
fn filter_isolated(points: &[Vector3], radius: f64, min_neighbors: usize) -> Vec<Vector3> {
    let mut kept = Vec::new();
    for (i, p) in points.iter().enumerate() {
        let mut count = 0;
        for (j, q) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            if distance3(*p, *q) <= radius {
                count += 1;
                if count >= min_neighbors {
                    break;
                }
            }
        }
        if count >= min_neighbors {
            kept.push(*p);
        }
    }
    kept
}
