//! Axis-aligned boxes, obstacles and positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned 3D box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl BoxBounds {
    /// Box with a flat footprint at ground level
    pub fn footprint(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min: 0.0,
            z_max: 0.0,
        }
    }

    /// Same footprint, raised from the ground to `height`
    pub fn with_height(mut self, height: f64) -> Self {
        self.z_min = 0.0;
        self.z_max = height;
        self
    }

    /// Footprint overlap test.
    ///
    /// Two boxes are apart only when one lies strictly beyond the other on
    /// the x or y axis. Shared edges and corners count as overlap.
    pub fn overlaps(&self, other: &BoxBounds) -> bool {
        !(self.x_min > other.x_max
            || other.x_min > self.x_max
            || self.y_min > other.y_max
            || other.y_min > self.y_max)
    }

    pub fn overlaps_any<'a, I>(&self, others: I) -> bool
    where
        I: IntoIterator<Item = &'a BoxBounds>,
    {
        others.into_iter().any(|other| self.overlaps(other))
    }

    pub fn is_proper(&self) -> bool {
        self.x_min < self.x_max && self.y_min < self.y_max && self.z_min < self.z_max
    }
}

/// A placed obstacle (building) with its sampled height
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub bounds: BoxBounds,
    pub height: f64,
}

impl Obstacle {
    pub fn new(footprint: BoxBounds, height: f64) -> Self {
        Self {
            bounds: footprint.with_height(height),
            height,
        }
    }

    /// `(x_min, x_max, y_min, y_max, height)` as handed to the engine
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (
            self.bounds.x_min,
            self.bounds.x_max,
            self.bounds.y_min,
            self.bounds.y_max,
            self.height,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_boxes_do_not_overlap() {
        let a = BoxBounds::footprint(0.0, 10.0, 0.0, 10.0);
        let b = BoxBounds::footprint(10.5, 20.0, 0.0, 10.0);
        let c = BoxBounds::footprint(0.0, 10.0, 11.0, 15.0);

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_shared_edge_counts_as_overlap() {
        let a = BoxBounds::footprint(0.0, 10.0, 0.0, 10.0);
        let right = BoxBounds::footprint(10.0, 20.0, 0.0, 10.0);
        let above = BoxBounds::footprint(0.0, 10.0, 10.0, 20.0);
        let corner = BoxBounds::footprint(10.0, 20.0, 10.0, 20.0);

        assert!(a.overlaps(&right));
        assert!(a.overlaps(&above));
        assert!(a.overlaps(&corner));
    }

    #[test]
    fn test_contained_box_overlaps() {
        let outer = BoxBounds::footprint(0.0, 50.0, 0.0, 50.0);
        let inner = BoxBounds::footprint(10.0, 20.0, 10.0, 20.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(inner.overlaps_any(&[outer]));
    }

    #[test]
    fn test_obstacle_height_sets_vertical_extent() {
        let obstacle = Obstacle::new(BoxBounds::footprint(30.0, 40.0, 5.0, 9.0), 12.5);
        assert_eq!(obstacle.bounds.z_min, 0.0);
        assert_eq!(obstacle.bounds.z_max, 12.5);
        assert!(obstacle.bounds.is_proper());
        assert_eq!(obstacle.as_tuple(), (30.0, 40.0, 5.0, 9.0, 12.5));
    }
}
