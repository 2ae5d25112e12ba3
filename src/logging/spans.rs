//! Span wrapping one detection call.

use crate::ght::{AccumulatorShape, Detection, Region};
use instant::Instant;
use tracing::{field, span, Level, Span};
use uuid::Uuid;

pub struct DetectionSpan {
    span: Span,
    start_time: Instant,
}

impl DetectionSpan {
    pub fn new(detector: &str, region: Region, image_size: (u32, u32), correlation_id: Option<Uuid>) -> Self {
        let span = span!(
            Level::INFO,
            "detection",
            detector = detector,
            region = %region,
            image_width = image_size.0,
            image_height = image_size.1,
            correlation_id = field::Empty,
            edge_points = field::Empty,
            accumulator_cells = field::Empty,
            votes = field::Empty,
            confidence = field::Empty,
            execution_time_ms = field::Empty
        );
        if let Some(id) = correlation_id {
            span.record("correlation_id", field::display(id));
        }

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn record_edge_sampling(&self, edge_points: usize) {
        self.span.record("edge_points", edge_points);
        if edge_points == 0 {
            tracing::warn!(parent: &self.span, "Edge image has no edge pixels");
        } else {
            tracing::debug!(parent: &self.span, edge_points = edge_points, "Edge sampling completed");
        }
    }

    pub fn record_accumulator(&self, shape: AccumulatorShape, total_votes: u64) {
        self.span.record("accumulator_cells", shape.cells());
        tracing::debug!(
            parent: &self.span,
            x_cells = shape.x_cells,
            y_cells = shape.y_cells,
            scales = shape.scales,
            rotations = shape.rotations,
            total_votes = total_votes,
            "Accumulator populated"
        );
    }

    /// Record the final landmarks with their derived parameters
    pub fn record_result(&self, detection: &Detection) {
        let duration = self.start_time.elapsed();
        self.span.record("votes", detection.votes);
        self.span.record("confidence", detection.confidence);
        self.span.record("execution_time_ms", duration.as_millis() as f64);

        tracing::info!(
            parent: &self.span,
            found = detection.is_found(),
            point_a = format!("({:.1}, {:.1})", detection.point_a.x, detection.point_a.y),
            point_b = format!("({:.1}, {:.1})", detection.point_b.x, detection.point_b.y),
            angle = format!("{:.2}°", detection.angle_degrees()),
            ratio = format!("{:.3}x", detection.ratio),
            confidence = format!("{:.3}", detection.confidence),
            execution_time_ms = duration.as_millis(),
            "Detection completed"
        );
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32() * 1000.0
    }

    /// Get the underlying span for manual instrumentation
    pub fn span(&self) -> &Span {
        &self.span
    }
}
