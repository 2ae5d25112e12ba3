//! Edge-pixel orientation sampling.
//!
//! A 3×3 Sobel pair is convolved over the whole edge image (borders mirrored,
//! reflect-101). Every pixel equal to [`EDGE_VALUE`] becomes an [`EdgePoint`]
//! carrying its grid-cell position and the bucket of its contour tangent.

use image::GrayImage;
use ndarray::Array2;
use std::f64::consts::{FRAC_PI_2, PI};

/// Pixel value marking an edge in the binary edge image.
pub const EDGE_VALUE: u8 = 255;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    /// Column in grid-cell units
    pub x: f64,
    /// Row in grid-cell units
    pub y: f64,
    /// Orientation bucket, always `< intervals`
    pub bin: usize,
}

/// Horizontal and vertical derivative buffers, indexed `[row, col]`.
#[derive(Debug, Clone)]
pub struct GradientField {
    pub gx: Array2<f32>,
    pub gy: Array2<f32>,
}

impl GradientField {
    pub fn at(&self, x: u32, y: u32) -> (f32, f32) {
        let idx = [y as usize, x as usize];
        (self.gx[idx], self.gy[idx])
    }
}

#[inline]
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mirrored = if i < 0 {
        -i
    } else if i > last {
        2 * last - i
    } else {
        i
    };
    mirrored.clamp(0, last) as usize
}

/// Sobel derivatives of a single-channel image.
pub fn sobel(image: &GrayImage) -> GradientField {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let src = Array2::from_shape_fn((h, w), |(y, x)| image.get_pixel(x as u32, y as u32)[0] as f32);
    let mut gx = Array2::<f32>::zeros((h, w));
    let mut gy = Array2::<f32>::zeros((h, w));

    for y in 0..h {
        let rows = [
            reflect_101(y as isize - 1, h),
            y,
            reflect_101(y as isize + 1, h),
        ];
        for x in 0..w {
            let cols = [
                reflect_101(x as isize - 1, w),
                x,
                reflect_101(x as isize + 1, w),
            ];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, &yy) in rows.iter().enumerate() {
                for (kx, &xx) in cols.iter().enumerate() {
                    let v = src[[yy, xx]];
                    sum_x += v * SOBEL_KERNEL_X[ky][kx];
                    sum_y += v * SOBEL_KERNEL_Y[ky][kx];
                }
            }
            gx[[y, x]] = sum_x;
            gy[[y, x]] = sum_y;
        }
    }

    GradientField { gx, gy }
}

/// Contour tangent angle in `(−π/2, π/2]` from a gradient vector.
#[inline]
pub fn tangent_angle(gx: f64, gy: f64) -> f64 {
    let a = gy.atan2(gx);
    if a > 0.0 {
        a - FRAC_PI_2
    } else {
        a + FRAC_PI_2
    }
}

/// Quantize a tangent angle over `[−π/2, π/2]` into `intervals` buckets.
#[inline]
pub fn angle_bin(phi: f64, intervals: usize) -> usize {
    let raw = ((phi + FRAC_PI_2) * intervals as f64 / PI).floor();
    (raw.max(0.0) as usize).min(intervals.saturating_sub(1))
}

/// Collect every edge pixel with its cell position and orientation bucket.
pub fn sample_edges(edges: &GrayImage, cell_size: u32, intervals: usize) -> Vec<EdgePoint> {
    let field = sobel(edges);
    let cell = cell_size.max(1) as f64;

    edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] == EDGE_VALUE)
        .map(|(x, y, _)| {
            let (gx, gy) = field.at(x, y);
            EdgePoint {
                x: x as f64 / cell,
                y: y as f64 / cell,
                bin: angle_bin(tangent_angle(gx as f64, gy as f64), intervals),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_reflect_101_borders() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn test_sobel_on_vertical_step() {
        // dark left half, bright right half
        let img = GrayImage::from_fn(8, 8, |x, _| if x >= 4 { Luma([255]) } else { Luma([0]) });
        let field = sobel(&img);
        let (gx, gy) = field.at(4, 4);
        assert!(gx > 0.0);
        assert_eq!(gy, 0.0);
        let (gx_flat, _) = field.at(1, 4);
        assert_eq!(gx_flat, 0.0);
    }

    #[test]
    fn test_tangent_angle_range() {
        let samples = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0), (1.0, 1.0), (-1.0, -1.0)];
        for (gx, gy) in samples {
            let phi = tangent_angle(gx, gy);
            assert!(phi > -FRAC_PI_2 - 1e-12 && phi <= FRAC_PI_2 + 1e-12, "phi={}", phi);
        }
        // horizontal gradient means a vertical contour
        assert!((tangent_angle(1.0, 0.0) - FRAC_PI_2).abs() < 1e-12);
        assert!(tangent_angle(0.0, 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_bin_is_clamped() {
        assert_eq!(angle_bin(FRAC_PI_2, 16), 15);
        assert_eq!(angle_bin(-FRAC_PI_2, 16), 0);
        assert_eq!(angle_bin(0.0, 16), 8);
        assert_eq!(angle_bin(-10.0, 16), 0);
        assert_eq!(angle_bin(10.0, 16), 15);
    }

    #[test]
    fn test_sample_edges_scales_to_cells() {
        let mut img = GrayImage::new(16, 16);
        img.put_pixel(9, 5, Luma([255]));
        img.put_pixel(3, 12, Luma([128])); // not an edge
        let points = sample_edges(&img, 4, 8);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 2.25);
        assert_eq!(points[0].y, 1.25);
        // isolated pixel has zero gradient, which lands in the top bucket
        assert_eq!(points[0].bin, 7);
    }

    #[test]
    fn test_sample_edges_bins_in_range() {
        let img = GrayImage::from_fn(24, 24, |x, y| {
            let (dx, dy) = (x as i32 - 12, y as i32 - 12);
            if (dx * dx + dy * dy - 64).abs() < 9 { Luma([255]) } else { Luma([0]) }
        });
        let intervals = 12;
        let points = sample_edges(&img, 1, intervals);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.bin < intervals));
    }

    #[test]
    fn test_blank_image_has_no_edges() {
        let img = GrayImage::new(10, 10);
        assert!(sample_edges(&img, 2, 16).is_empty());
    }
}
