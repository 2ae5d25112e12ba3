use crate::ght::{Detection, Point2};
use std::f64::consts::PI;

/// Euclidean pixel distance between a detected and a reference landmark.
pub fn landmark_error(detected: Point2, ground_truth: Point2) -> f64 {
    detected.distance(ground_truth)
}

/// Absolute rotation error in radians, wrapped into `[0, π]`.
pub fn rotation_error(result: &Detection, ground_truth: f64) -> f64 {
    let wrapped = (result.angle - ground_truth + PI).rem_euclid(2.0 * PI) - PI;
    wrapped.abs()
}

pub fn ratio_error(result: &Detection, ground_truth: f64) -> f64 {
    (result.ratio - ground_truth).abs()
}
