//! Template ingestion: marker image → reference points, width and R-table.

use super::geometry::{PixelPoint, Point2};
use super::gradient::{angle_bin, sobel, tangent_angle, EDGE_VALUE};
use super::rtable::RTable;
use crate::config::TemplateConfig;
use crate::data::load_marker_image;
use anyhow::{bail, Context};
use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::path::Path;

/// Colors identifying contour and reference pixels in a marker image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerColors {
    pub contour: [u8; 3],
    pub reference_a: [u8; 3],
    pub reference_b: [u8; 3],
}

impl Default for MarkerColors {
    fn default() -> Self {
        Self {
            contour: [255, 255, 255],
            reference_a: [255, 0, 0],
            reference_b: [0, 255, 0],
        }
    }
}

/// How template contour points are assigned to orientation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateOrientation {
    /// Every point gets the constant angle π/2, so the whole table lands in
    /// the last bucket and rotation scanning alone supplies angular selectivity.
    #[default]
    Fixed,
    /// Each point gets the tangent bucket of the contour mask's Sobel gradient.
    Measured,
}

/// One contour pixel's offset to reference A and the angle used for bucketing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplatePoint {
    pub dx: i32,
    pub dy: i32,
    pub phi: f64,
}

#[derive(Debug, Clone)]
pub struct Template {
    reference_a: PixelPoint,
    reference_b: PixelPoint,
    width: u32,
    points: Vec<TemplatePoint>,
    table: RTable,
}

fn find_marker(image: &RgbImage, color: [u8; 3]) -> PixelPoint {
    // enumerate_pixels walks rows top to bottom, so the first hit is row-major
    image
        .enumerate_pixels()
        .find(|(_, _, p)| **p == Rgb(color))
        .map(|(x, y, _)| PixelPoint::new(x as i32, y as i32))
        .unwrap_or(PixelPoint::SENTINEL)
}

impl Template {
    /// Ingest an in-memory marker image.
    ///
    /// Missing reference markers are not an error: they come back as
    /// [`PixelPoint::SENTINEL`] and every offset is taken relative to `(−1, −1)`.
    /// Check [`Template::has_reference_points`] before trusting the result.
    pub fn from_image(image: &RgbImage, config: &TemplateConfig, intervals: usize) -> crate::Result<Self> {
        if intervals == 0 {
            bail!("Template needs at least one orientation interval");
        }

        let markers = &config.markers;
        let reference_a = find_marker(image, markers.reference_a);
        let reference_b = find_marker(image, markers.reference_b);

        let contour: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == Rgb(markers.contour))
            .map(|(x, y, _)| (x, y))
            .collect();

        if contour.is_empty() {
            bail!(
                "Template image {}x{} has no contour pixels of color {:?}",
                image.width(),
                image.height(),
                markers.contour
            );
        }

        let phis: Vec<f64> = match config.orientation {
            TemplateOrientation::Fixed => vec![FRAC_PI_2; contour.len()],
            TemplateOrientation::Measured => {
                let mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
                    if *image.get_pixel(x, y) == Rgb(markers.contour) {
                        Luma([EDGE_VALUE])
                    } else {
                        Luma([0])
                    }
                });
                let field = sobel(&mask);
                contour
                    .iter()
                    .map(|&(x, y)| {
                        let (gx, gy) = field.at(x, y);
                        tangent_angle(gx as f64, gy as f64)
                    })
                    .collect()
            }
        };

        let points: Vec<TemplatePoint> = contour
            .iter()
            .zip(phis)
            .map(|(&(x, y), phi)| TemplatePoint {
                dx: reference_a.x - x as i32,
                dy: reference_a.y - y as i32,
                phi,
            })
            .collect();

        let min_dx = points.iter().map(|p| p.dx).min().unwrap_or(0);
        let max_dx = points.iter().map(|p| p.dx).max().unwrap_or(0);
        let width = (max_dx - min_dx + 1) as u32;

        let mut table = RTable::with_intervals(intervals);
        for p in &points {
            table.push(angle_bin(p.phi, intervals), Point2::new(p.dx as f64, p.dy as f64));
        }

        tracing::debug!(
            contour_points = points.len(),
            width = width,
            reference_a = ?reference_a,
            reference_b = ?reference_b,
            orientation = ?config.orientation,
            "Template ingested"
        );

        Ok(Self {
            reference_a,
            reference_b,
            width,
            points,
            table,
        })
    }

    /// Load a marker image from disk and ingest it.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &TemplateConfig, intervals: usize) -> crate::Result<Self> {
        let path = path.as_ref();
        let image = load_marker_image(path)?;
        Self::from_image(&image, config, intervals)
            .with_context(|| format!("Failed to ingest template {}", path.display()))
    }

    pub fn reference_a(&self) -> PixelPoint {
        self.reference_a
    }

    pub fn reference_b(&self) -> PixelPoint {
        self.reference_b
    }

    pub fn has_reference_points(&self) -> bool {
        self.reference_a.is_valid() && self.reference_b.is_valid()
    }

    /// `B − A` in pixels.
    pub fn reference_delta(&self) -> Point2 {
        self.reference_b.to_point2() - self.reference_a.to_point2()
    }

    /// Horizontal span of the contour relative to reference A.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn points(&self) -> &[TemplatePoint] {
        &self.points
    }

    pub fn table(&self) -> &RTable {
        &self.table
    }
}
