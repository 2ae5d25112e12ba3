use crate::ght::{Detection, LandmarkDetector, Point2, Region};
use crate::logging::{get_correlation_id, new_correlation_id};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image half holding the leg to annotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSide {
    Left,
    Right,
}

impl ImageSide {
    /// The femur is searched in the upper quadrant of the side.
    pub fn femur_region(self) -> Region {
        match self {
            ImageSide::Left => Region::UpperLeft,
            ImageSide::Right => Region::UpperRight,
        }
    }

    pub fn tibia_region(self) -> Region {
        match self {
            ImageSide::Left => Region::LowerLeft,
            ImageSide::Right => Region::LowerRight,
        }
    }
}

impl fmt::Display for ImageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageSide::Left => "left",
            ImageSide::Right => "right",
        })
    }
}

impl FromStr for ImageSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(ImageSide::Left),
            "right" | "r" => Ok(ImageSide::Right),
            other => Err(anyhow::anyhow!("Unknown image side: {}", other)),
        }
    }
}

/// Femur and tibia detections of one leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegLandmarks {
    pub side: ImageSide,
    pub femur: Detection,
    pub tibia: Detection,
}

impl LegLandmarks {
    /// Points seeding the annotation workflow: femur A, tibia A, tibia B.
    pub fn seed_points(&self) -> [Point2; 3] {
        [self.femur.point_a, self.tibia.point_a, self.tibia.point_b]
    }

    pub fn is_complete(&self, min_confidence: f64) -> bool {
        self.femur.is_confident(min_confidence) && self.tibia.is_confident(min_confidence)
    }
}

/// Run the femur and tibia detectors on the same edge image for one side.
pub fn detect_leg(
    femur: &dyn LandmarkDetector,
    tibia: &dyn LandmarkDetector,
    edges: &GrayImage,
    side: ImageSide,
) -> crate::Result<LegLandmarks> {
    if get_correlation_id().is_none() {
        new_correlation_id();
    }

    let femur_detection = femur.detect(edges, side.femur_region())?;
    let tibia_detection = tibia.detect(edges, side.tibia_region())?;

    tracing::info!(
        side = %side,
        femur_confidence = femur_detection.confidence,
        tibia_confidence = tibia_detection.confidence,
        "Leg landmarks detected"
    );

    Ok(LegLandmarks {
        side,
        femur: femur_detection,
        tibia: tibia_detection,
    })
}
