//! Generalized Hough Transform landmark detection.
//!
//! Template ingestion builds an R-table of offsets to reference point A;
//! edge sampling turns the edge image into oriented cell positions;
//! accumulation votes every rotated/scaled offset into an `[x][y][scale][rotation]`
//! grid; the search picks the best cell of one quadrant and derives both landmarks.

pub mod accumulator;
pub mod detector;
pub mod geometry;
pub mod gradient;
pub mod rtable;
pub mod search;
pub mod template;

pub use accumulator::{accumulate, Accumulator, AccumulatorShape, Cell, VoteSpace, Votes};
pub use detector::{Accumulation, Detection, GhtDetector, LandmarkDetector};
pub use geometry::{rotate_point, PixelPoint, Point2};
pub use gradient::{sample_edges, EdgePoint};
pub use rtable::RTable;
pub use search::{best_candidate, point_b, Candidate, Region};
pub use template::{MarkerColors, Template, TemplateOrientation};
