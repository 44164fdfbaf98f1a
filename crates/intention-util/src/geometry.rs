//! Geometry
//!
//! Angle conversions.

use serde::{Deserialize, Serialize};

/// 2D coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Angle in radians of the line from `a` to `b`
pub fn angle_between(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}
