use bone_landmark_ght::*;
use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::tempdir;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline of the rectangle `[x0, x1] × [y0, y1]`, both ends inclusive.
fn outline(x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<(u32, u32)> {
    let mut pixels = Vec::new();
    for x in x0..=x1 {
        pixels.push((x, y0));
        pixels.push((x, y1));
    }
    for y in (y0 + 1)..y1 {
        pixels.push((x0, y));
        pixels.push((x1, y));
    }
    pixels
}

/// 20×30 rectangle with reference A at its center and B 10 px below A.
fn create_rect_template() -> RgbImage {
    let mut img = RgbImage::new(40, 50);
    for (x, y) in outline(5, 5, 24, 34) {
        img.put_pixel(x, y, WHITE);
    }
    img.put_pixel(14, 19, RED);
    img.put_pixel(14, 29, GREEN);
    img
}

fn create_edge_image(size: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    for &(x0, y0, x1, y1) in rects {
        for (x, y) in outline(x0, y0, x1, y1) {
            img.put_pixel(x, y, Luma([255]));
        }
    }
    img
}

fn unit_config(width_min: f64, width_max: f64, width_step: f64) -> Config {
    let mut config = Config::default();
    config.ght = GhtConfig {
        angle_min: 0.0,
        angle_max: 0.0,
        width_min,
        width_max,
        width_step,
        cell_size: 1,
        intervals: 16,
    };
    config
}

fn detector(name: &str, config: &Config) -> GhtDetector {
    let template = Template::from_image(&create_rect_template(), &config.template, config.ght.intervals).unwrap();
    GhtDetector::new(name, template, config.ght.clone()).unwrap()
}

#[test]
fn test_translated_template_is_recovered() {
    let config = unit_config(20.0, 20.0, 1.0);
    let detector = detector("rect", &config);
    assert_eq!(detector.template().width(), 20);

    // template shifted by (3, 2): A lands on (17, 21), B on (17, 31)
    let edges = create_edge_image(80, &[(8, 7, 27, 36)]);
    let detection = detector.detect(&edges, Region::UpperLeft).unwrap();

    assert!(detection.is_found());
    assert!(landmark_error(detection.point_a, Point2::new(17.0, 21.0)) < 1.5);
    assert!(landmark_error(detection.point_b, Point2::new(17.0, 31.0)) < 1.5);
    assert_eq!(detection.cell.x, 17);
    assert_eq!(detection.cell.y, 21);
    assert_eq!(detection.ratio, 1.0);
    assert_eq!(detection.angle, 0.0);
    assert!(detection.confidence > 0.5, "confidence {}", detection.confidence);
    assert!(detection.confidence <= 1.0);
    assert!(detection.processing_time_ms >= 0.0);
}

#[test]
fn test_scaled_template_is_recovered() {
    let config = unit_config(20.0, 40.0, 20.0);
    let detector = detector("rect", &config);

    // twice the template size with A at (40, 45)
    let edges = create_edge_image(120, &[(22, 17, 60, 75)]);
    let detection = detector.detect(&edges, Region::UpperLeft).unwrap();

    assert!(detection.is_found());
    assert_eq!(detection.cell.scale, 1);
    assert!(ratio_error(&detection, 2.0) < 1e-12);
    assert!(landmark_error(detection.point_a, Point2::new(40.0, 45.0)) < 1.5);
    assert!(landmark_error(detection.point_b, Point2::new(40.0, 65.0)) < 1.5);
}

#[test]
fn test_wrong_quadrant_finds_nothing_strong() {
    let config = unit_config(20.0, 20.0, 1.0);
    let detector = detector("rect", &config);
    let edges = create_edge_image(80, &[(8, 7, 27, 36)]);

    let hit = detector.detect(&edges, Region::UpperLeft).unwrap();
    let miss = detector.detect(&edges, Region::LowerRight).unwrap();
    assert!(miss.votes < hit.votes / 2);
}

#[test]
fn test_accumulate_once_search_every_region() {
    let config = unit_config(20.0, 20.0, 1.0);
    let detector = detector("rect", &config);
    let edges = create_edge_image(80, &[(8, 7, 27, 36)]);

    let accumulation = detector.accumulate(&edges).unwrap();
    let best = Region::ALL
        .iter()
        .map(|&region| detector.search(&accumulation, region))
        .max_by_key(|d| d.votes)
        .unwrap();
    assert_eq!(best.region, Region::UpperLeft);
    assert_eq!(accumulation.edge_points, outline(8, 7, 27, 36).len());
}

#[test]
fn test_blank_edge_image_is_no_detection() {
    let config = unit_config(20.0, 20.0, 1.0);
    let detector = detector("rect", &config);
    let detection = detector.detect(&GrayImage::new(64, 64), Region::LowerLeft).unwrap();

    assert!(!detection.is_found());
    assert_eq!(detection.confidence, 0.0);
    assert!(detection.confidence.is_finite());
    assert_eq!(detection.votes, 0);
}

#[test]
fn test_missing_markers_still_run() {
    let mut img = RgbImage::new(40, 50);
    for (x, y) in outline(5, 5, 24, 34) {
        img.put_pixel(x, y, WHITE);
    }
    let config = unit_config(20.0, 20.0, 1.0);
    let template = Template::from_image(&img, &config.template, 16).unwrap();
    assert_eq!(template.reference_a(), PixelPoint::SENTINEL);
    assert!(!template.has_reference_points());

    let detector = GhtDetector::new("unmarked", template, config.ght.clone()).unwrap();
    let detection = detector.detect(&create_edge_image(80, &[(8, 7, 27, 36)]), Region::UpperLeft);
    assert!(detection.is_ok());
}

#[test]
fn test_leg_pipeline_end_to_end() {
    let config = unit_config(20.0, 20.0, 1.0);
    let femur = detector("femur", &config);
    let tibia = detector("tibia", &config);

    // femur A at (20, 22), tibia A at (20, 80)
    let edges = create_edge_image(120, &[(11, 8, 30, 37), (11, 66, 30, 95)]);
    let leg = detect_leg(&femur, &tibia, &edges, ImageSide::Left).unwrap();

    assert_eq!(leg.femur.region, Region::UpperLeft);
    assert_eq!(leg.tibia.region, Region::LowerLeft);
    let [femur_a, tibia_a, tibia_b] = leg.seed_points();
    assert!(landmark_error(femur_a, Point2::new(20.0, 22.0)) < 1.5);
    assert!(landmark_error(tibia_a, Point2::new(20.0, 80.0)) < 1.5);
    assert!(landmark_error(tibia_b, Point2::new(20.0, 90.0)) < 1.5);
    assert!(leg.is_complete(config.detection.min_confidence));
    assert!(rotation_error(&leg.tibia, 0.0) < 1e-12);
}

#[test]
fn test_detection_from_files() {
    let dir = tempdir().unwrap();
    let template_path = dir.path().join("femur.png");
    let edges_path = dir.path().join("edges.png");
    create_rect_template().save(&template_path).unwrap();
    create_edge_image(80, &[(8, 7, 27, 36)]).save(&edges_path).unwrap();

    let config = unit_config(20.0, 20.0, 1.0);
    let detector = GhtDetector::from_template_path("femur", &template_path, &config).unwrap();
    let edges = load_edge_image(&edges_path).unwrap();
    let detection = detector.detect(&edges, Region::UpperLeft).unwrap();

    assert_eq!(detector.name(), "femur");
    assert!(landmark_error(detection.point_a, Point2::new(17.0, 21.0)) < 1.5);

    let json = serde_json::to_string(&detection).unwrap();
    let restored: Detection = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.cell, detection.cell);
    assert_eq!(restored.region, Region::UpperLeft);
}
