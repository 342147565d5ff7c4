#![warn(missing_docs)]
//! Cross-section cut primitives shared by outline extraction and rendering.
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Transverse axis along which a cross-section cut is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter)]
pub enum CutAxis {
    /// cut in the x/z plane (tangential for y-object systems)
    #[strum(serialize = "x")]
    X,
    /// cut in the y/z plane
    #[default]
    #[strum(serialize = "y")]
    Y,
}

impl CutAxis {
    /// Project a 3D point of a cut onto (transverse, axial) coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        match self {
            Self::X => Point2::new(point.x, point.z),
            Self::Y => Point2::new(point.y, point.z),
        }
    }
}

/// A single surface outline in (transverse, axial) train coordinates.
///
/// Open outlines are polylines (markers, transparent surfaces); closed
/// outlines are polygons enclosing a solid material block. The last point of a
/// closed outline repeats the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    points: Vec<Point2<f64>>,
    closed: bool,
}

impl Outline {
    /// Create an open polyline outline.
    #[must_use]
    pub const fn open(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: false,
        }
    }
    /// Create a closed polygon outline.
    #[must_use]
    pub const fn closed(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: true,
        }
    }
    /// Returns the outline points.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }
    /// Returns `true` if the outline is a closed polygon.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    #[test]
    fn project() {
        let point = Point3::new(1.0, 2.0, 3.0);
        let projected = CutAxis::X.project(&point);
        assert_relative_eq!(projected.x, 1.0);
        assert_relative_eq!(projected.y, 3.0);
        let projected = CutAxis::Y.project(&point);
        assert_relative_eq!(projected.x, 2.0);
        assert_relative_eq!(projected.y, 3.0);
    }
    #[test]
    fn default_axis() {
        assert_eq!(CutAxis::default(), CutAxis::Y);
    }
    #[test]
    fn outline() {
        let outline = Outline::open(vec![Point2::new(0.0, 0.0)]);
        assert!(!outline.is_closed());
        assert_eq!(outline.points().len(), 1);
        let outline = Outline::closed(vec![]);
        assert!(outline.is_closed());
    }
}
