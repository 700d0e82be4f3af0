use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    pub fn angle(&self) -> f64 {
        normalize_angle(self.y.atan2(self.x))
    }

    pub fn clamp_length(self, max: f64) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

pub fn degrees_to_radians(deg: f64) -> f64 {
    normalize_angle(deg * PI / 180.0)
}

pub fn radians_to_degrees(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Shortest unsigned angular distance between two angles, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_is_normalized() {
        assert_relative_eq!(Point::new(1.0, 0.0).angle(), 0.0);
        assert_relative_eq!(Point::new(0.0, 1.0).angle(), PI / 2.0);
        assert_relative_eq!(Point::new(0.0, -1.0).angle(), 3.0 * PI / 2.0);
        assert!(Point::new(1.0, -1e-300).angle() < TAU);
    }

    #[test]
    fn test_degree_conversion_wraps() {
        assert_relative_eq!(degrees_to_radians(-90.0), 3.0 * PI / 2.0);
        assert_relative_eq!(degrees_to_radians(450.0), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(radians_to_degrees(PI), 180.0);
    }

    #[test]
    fn test_clamp_length() {
        let p = Point::new(3.0, 4.0).clamp_length(1.0);
        assert_relative_eq!(p.length(), 1.0);
        assert_eq!(Point::new(0.3, 0.4).clamp_length(1.0), Point::new(0.3, 0.4));
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert_relative_eq!(angle_difference(0.1, TAU - 0.1), 0.2, epsilon = 1e-12);
    }
}
