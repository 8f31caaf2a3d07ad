//! Box face identifiers and their axis/edge conventions.

use super::Vector3;

/// One of the three local coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Returns the local unit vector along the axis.
    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }

    /// Returns the two remaining axes.
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

/// Which end of an axis a face sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Edge {
    Min,
    Max,
}

/// One of the six box faces.
///
/// Convention: Left/Right lie on X, Bottom/Top on Y, Back/Front on Z;
/// the min-edge faces are Left, Bottom and Back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Left,
        Side::Right,
        Side::Top,
        Side::Bottom,
        Side::Front,
        Side::Back,
    ];

    /// Returns the axis the face moves along.
    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::X,
            Side::Top | Side::Bottom => Axis::Y,
            Side::Front | Side::Back => Axis::Z,
        }
    }

    /// Returns which end of the axis the face sits on.
    pub fn edge(self) -> Edge {
        match self {
            Side::Left | Side::Bottom | Side::Back => Edge::Min,
            Side::Right | Side::Top | Side::Front => Edge::Max,
        }
    }

    /// Returns the face on the opposite end of the same axis.
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    /// Returns the outward face normal in box-local space.
    pub fn normal(self) -> Vector3 {
        let n = self.axis().unit();
        match self.edge() {
            Edge::Min => -n,
            Edge::Max => n,
        }
    }
}
