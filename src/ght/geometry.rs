use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Sub-pixel point or offset vector in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;

    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer pixel coordinate. Marker lookups that find nothing yield [`PixelPoint::SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const SENTINEL: PixelPoint = PixelPoint { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::SENTINEL
    }

    pub fn to_point2(self) -> Point2 {
        Point2::new(self.x as f64, self.y as f64)
    }
}

impl Default for PixelPoint {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Rotate a vector with a precomputed cosine/sine pair.
#[inline]
pub fn rotate_vector(v: Point2, cos_a: f64, sin_a: f64) -> Point2 {
    Point2::new(v.x * cos_a - v.y * sin_a, v.x * sin_a + v.y * cos_a)
}

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate_point(point: Point2, center: Point2, angle: f64) -> Point2 {
    let (sin_a, cos_a) = angle.sin_cos();
    center + rotate_vector(point - center, cos_a, sin_a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: Point2, b: Point2) {
        assert!(a.distance(b) < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let p = Point2::new(12.5, -3.0);
        assert_close(rotate_point(p, Point2::new(4.0, 4.0), 0.0), p);
    }

    #[test]
    fn test_quarter_turn_about_center() {
        let center = Point2::new(10.0, 10.0);
        let rotated = rotate_point(Point2::new(15.0, 10.0), center, FRAC_PI_2);
        assert_close(rotated, Point2::new(10.0, 15.0));
    }

    #[test]
    fn test_half_turn_mirrors_through_center() {
        let center = Point2::new(2.0, 3.0);
        let rotated = rotate_point(Point2::new(5.0, 7.0), center, PI);
        assert_close(rotated, Point2::new(-1.0, -1.0));
    }

    #[test]
    fn test_rotation_preserves_distance_to_center() {
        let center = Point2::new(-4.0, 9.0);
        let p = Point2::new(3.0, 1.0);
        for step in 0..16 {
            let angle = step as f64 * PI / 8.0;
            let rotated = rotate_point(p, center, angle);
            assert!((rotated.distance(center) - p.distance(center)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sentinel_pixel_point() {
        assert!(!PixelPoint::SENTINEL.is_valid());
        assert!(!PixelPoint::default().is_valid());
        assert!(PixelPoint::new(0, 0).is_valid());
    }
}
