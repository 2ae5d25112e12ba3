use crate::ght::{Detection, Template};
use crate::pipeline::LegLandmarks;

pub fn print_detection(detection: &Detection) {
    println!("=== Detection: {} ({}) ===", detection.detector, detection.region);
    if !detection.is_found() {
        println!("  No landmarks found ({} edge points)", detection.edge_points);
        println!();
        return;
    }
    println!("  Point A: ({:.1}, {:.1})", detection.point_a.x, detection.point_a.y);
    println!("  Point B: ({:.1}, {:.1})", detection.point_b.x, detection.point_b.y);
    println!("  Rotation: {:.2}°", detection.angle_degrees());
    println!("  Ratio: {:.3}", detection.ratio);
    println!("  Votes: {} / {} edge points", detection.votes, detection.edge_points);
    println!("  Confidence: {:.3}", detection.confidence);
    println!("  Processing Time: {:.2}ms", detection.processing_time_ms);
    println!();
}

pub fn print_detection_table(detections: &[Detection]) {
    println!("| Detector | Region | Point A | Point B | Rotation (°) | Ratio | Confidence | Time (ms) |");
    println!("|----------|--------|---------|---------|--------------|-------|------------|-----------|");

    for d in detections {
        println!(
            "| {} | {} | ({:.1}, {:.1}) | ({:.1}, {:.1}) | {:.2} | {:.3} | {:.3} | {:.2} |",
            d.detector,
            d.region,
            d.point_a.x,
            d.point_a.y,
            d.point_b.x,
            d.point_b.y,
            d.angle_degrees(),
            d.ratio,
            d.confidence,
            d.processing_time_ms
        );
    }
}

pub fn print_leg(leg: &LegLandmarks, min_confidence: f64) {
    print_detection_table(&[leg.femur.clone(), leg.tibia.clone()]);
    let [femur_a, tibia_a, tibia_b] = leg.seed_points();
    println!();
    println!("Seed points ({} side):", leg.side);
    println!("  Femur A: ({:.1}, {:.1})", femur_a.x, femur_a.y);
    println!("  Tibia A: ({:.1}, {:.1})", tibia_a.x, tibia_a.y);
    println!("  Tibia B: ({:.1}, {:.1})", tibia_b.x, tibia_b.y);
    if !leg.is_complete(min_confidence) {
        println!("  Warning: confidence below {:.3}, treat as no detection", min_confidence);
    }
}

pub fn print_template_summary(name: &str, template: &Template) {
    println!("=== Template: {} ===", name);
    println!("  Reference A: ({}, {})", template.reference_a().x, template.reference_a().y);
    println!("  Reference B: ({}, {})", template.reference_b().x, template.reference_b().y);
    if !template.has_reference_points() {
        println!("  Warning: reference marker missing");
    }
    println!("  Width: {} px", template.width());
    println!("  Contour points: {}", template.points().len());
    let occupancy: Vec<String> = template
        .table()
        .occupancy()
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .map(|(bin, n)| format!("{}:{}", bin, n))
        .collect();
    println!("  Occupied buckets: {}", occupancy.join(" "));
}
