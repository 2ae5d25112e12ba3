use super::accumulator::{accumulate, Accumulator, Cell, VoteSpace, Votes};
use super::geometry::Point2;
use super::gradient::sample_edges;
use super::search::{best_candidate, point_b, Region};
use super::template::Template;
use crate::config::{Config, GhtConfig};
use crate::logging::{get_correlation_id, DetectionSpan};
use anyhow::{anyhow, bail};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Landmark detector over a binary edge image.
pub trait LandmarkDetector {
    /// Returns the name of the detector (e.g. the anatomical template it carries)
    fn name(&self) -> &str;

    /// Locate the landmarks inside one quadrant of `edges`
    fn detect(&self, edges: &GrayImage, region: Region) -> crate::Result<Detection>;
}

/// Landmarks found by one detection call.
///
/// A zero vote count means nothing was found; `point_a`/`point_b` then describe
/// the first cell of the searched quadrant and must not be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub detector: String,
    pub region: Region,
    pub point_a: Point2,
    pub point_b: Point2,
    /// Matched rotation in radians
    pub angle: f64,
    /// Matched width over template width
    pub ratio: f64,
    /// Best cell votes over total edge points
    pub confidence: f64,
    pub votes: Votes,
    pub cell: Cell,
    pub edge_points: usize,
    pub processing_time_ms: f32,
}

impl Detection {
    pub fn is_found(&self) -> bool {
        self.votes > 0 && self.edge_points > 0
    }

    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.is_found() && self.confidence >= min_confidence
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Populated accumulator of one edge image, together with the index mapping it was built with.
#[derive(Debug, Clone)]
pub struct Accumulation {
    pub accumulator: Accumulator,
    pub space: VoteSpace,
    pub edge_points: usize,
}

/// Generalized Hough Transform detector for one anatomical template.
#[derive(Debug, Clone)]
pub struct GhtDetector {
    name: String,
    template: Template,
    config: GhtConfig,
}

impl GhtDetector {
    pub fn new(name: impl Into<String>, template: Template, config: GhtConfig) -> crate::Result<Self> {
        let name = name.into();
        config
            .validate()
            .map_err(|errors| anyhow!("Invalid GHT configuration for {}: {}", name, errors.join("; ")))?;
        if template.table().intervals() != config.intervals {
            bail!(
                "Template for {} was built with {} intervals, configuration asks for {}",
                name,
                template.table().intervals(),
                config.intervals
            );
        }
        if !template.has_reference_points() {
            tracing::warn!(
                detector = %name,
                reference_a = ?template.reference_a(),
                reference_b = ?template.reference_b(),
                "Template is missing a reference marker; detected landmarks will be meaningless"
            );
        }
        Ok(Self { name, template, config })
    }

    /// Ingest the template at `path` with the marker and orientation settings of `config`.
    pub fn from_template_path<P: AsRef<Path>>(name: impl Into<String>, path: P, config: &Config) -> crate::Result<Self> {
        let template = Template::from_path(path, &config.template, config.ght.intervals)?;
        Self::new(name, template, config.ght.clone())
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &GhtConfig {
        &self.config
    }

    /// Sample `edges` and vote every edge point into a fresh accumulator.
    pub fn accumulate(&self, edges: &GrayImage) -> crate::Result<Accumulation> {
        let space = VoteSpace::new(edges.width(), edges.height(), &self.config, self.template.width())?;
        let edge_points = sample_edges(edges, self.config.cell_size, self.config.intervals);
        let accumulator = accumulate(self.template.table(), &edge_points, &space);
        Ok(Accumulation {
            accumulator,
            space,
            edge_points: edge_points.len(),
        })
    }

    /// Pick the best cell of `region` and derive both landmarks from it.
    pub fn search(&self, accumulation: &Accumulation, region: Region) -> Detection {
        let space = &accumulation.space;
        let delta = self.template.reference_delta();
        let best = best_candidate(&accumulation.accumulator, space, region, delta);

        let angle = space.angle(best.cell.rotation);
        let ratio = space.ratio(best.cell.scale);
        let point_a = space.point_a(best.cell.x, best.cell.y);
        let confidence = if accumulation.edge_points == 0 {
            0.0
        } else {
            best.votes as f64 / accumulation.edge_points as f64
        };

        Detection {
            detector: self.name.clone(),
            region,
            point_a,
            point_b: point_b(point_a, delta, angle, ratio),
            angle,
            ratio,
            confidence,
            votes: best.votes,
            cell: best.cell,
            edge_points: accumulation.edge_points,
            processing_time_ms: 0.0,
        }
    }
}

impl LandmarkDetector for GhtDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, edges: &GrayImage, region: Region) -> crate::Result<Detection> {
        let span = DetectionSpan::new(&self.name, region, edges.dimensions(), get_correlation_id());
        let _guard = span.span().enter();

        let accumulation = self.accumulate(edges)?;
        span.record_edge_sampling(accumulation.edge_points);
        span.record_accumulator(accumulation.space.shape(), accumulation.accumulator.total_votes());

        let mut detection = self.search(&accumulation, region);
        detection.processing_time_ms = span.elapsed_ms();
        span.record_result(&detection);

        Ok(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateConfig;
    use image::{Luma, Rgb, RgbImage};

    fn square_template() -> Template {
        let mut img = RgbImage::new(16, 16);
        for i in 3..=12 {
            img.put_pixel(i, 3, Rgb([255, 255, 255]));
            img.put_pixel(i, 12, Rgb([255, 255, 255]));
            img.put_pixel(3, i, Rgb([255, 255, 255]));
            img.put_pixel(12, i, Rgb([255, 255, 255]));
        }
        img.put_pixel(7, 7, Rgb([255, 0, 0]));
        img.put_pixel(7, 9, Rgb([0, 255, 0]));
        Template::from_image(&img, &TemplateConfig::default(), 8).unwrap()
    }

    fn ght_config() -> GhtConfig {
        GhtConfig {
            angle_min: 0.0,
            angle_max: 0.0,
            width_min: 10.0,
            width_max: 10.0,
            width_step: 1.0,
            cell_size: 1,
            intervals: 8,
        }
    }

    #[test]
    fn test_blank_edge_image_is_no_detection() {
        let detector = GhtDetector::new("square", square_template(), ght_config()).unwrap();
        let detection = detector.detect(&GrayImage::new(40, 40), Region::UpperLeft).unwrap();
        assert_eq!(detection.edge_points, 0);
        assert_eq!(detection.votes, 0);
        assert_eq!(detection.confidence, 0.0);
        assert!(!detection.confidence.is_nan());
        assert!(!detection.is_found());
        assert_eq!(detection.cell, Cell::new(2, 2, 0, 0));
    }

    #[test]
    fn test_interval_mismatch_rejected() {
        let config = GhtConfig {
            intervals: 16,
            ..ght_config()
        };
        assert!(GhtDetector::new("square", square_template(), config).is_err());
    }

    #[test]
    fn test_single_cell_confidence_is_exact() {
        let detector = GhtDetector::new("square", square_template(), ght_config()).unwrap();
        let space = VoteSpace::new(40, 40, detector.config(), detector.template().width()).unwrap();
        let mut accumulator = Accumulator::zeros(space.shape());
        let target = Cell::new(7, 7, 0, 0);
        for _ in 0..6 {
            accumulator.increment(target);
        }
        let accumulation = Accumulation {
            accumulator,
            space,
            edge_points: 24,
        };

        let detection = detector.search(&accumulation, Region::UpperLeft);
        assert_eq!(detection.cell, target);
        assert_eq!(detection.votes, 6);
        assert_eq!(detection.confidence, 0.25);
        assert_eq!(detection.point_a, Point2::new(8.0, 8.0));
        assert_eq!(detection.point_b, Point2::new(8.0, 10.0));
    }

    #[test]
    fn test_confidence_is_vote_fraction() {
        let detector = GhtDetector::new("square", square_template(), ght_config()).unwrap();
        let mut edges = GrayImage::new(40, 40);
        for i in 3..=12 {
            edges.put_pixel(i, 3, Luma([255]));
            edges.put_pixel(i, 12, Luma([255]));
            edges.put_pixel(3, i, Luma([255]));
            edges.put_pixel(12, i, Luma([255]));
        }
        let accumulation = detector.accumulate(&edges).unwrap();
        let detection = detector.search(&accumulation, Region::UpperLeft);
        assert!(detection.is_found());
        assert_eq!(
            detection.confidence,
            detection.votes as f64 / accumulation.edge_points as f64
        );
        assert_eq!(detection.cell.x, 7);
        assert_eq!(detection.cell.y, 7);
        assert_eq!(detection.point_b - detection.point_a, Point2::new(0.0, 2.0));
    }
}
