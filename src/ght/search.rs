//! Best-candidate search over one quadrant of the accumulator.

use super::accumulator::{Accumulator, AccumulatorShape, Cell, VoteSpace, Votes};
use super::geometry::{rotate_point, Point2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Cells skipped along every accumulator border.
pub const REGION_MARGIN: usize = 2;

/// Anatomical search region: one quadrant of the accumulator's x/y extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    UpperLeft,
    LowerLeft,
    UpperRight,
    LowerRight,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::UpperLeft,
        Region::LowerLeft,
        Region::UpperRight,
        Region::LowerRight,
    ];

    fn is_left(self) -> bool {
        matches!(self, Region::UpperLeft | Region::LowerLeft)
    }

    fn is_upper(self) -> bool {
        matches!(self, Region::UpperLeft | Region::UpperRight)
    }

    /// Cell ranges of this quadrant, inset by [`REGION_MARGIN`] from the border.
    pub fn bounds(self, shape: AccumulatorShape) -> CellRange {
        let split = |len: usize, first_half: bool| {
            let mid = len / 2;
            if first_half {
                REGION_MARGIN..mid
            } else {
                mid.max(REGION_MARGIN)..len.saturating_sub(REGION_MARGIN)
            }
        };
        CellRange {
            x: split(shape.x_cells, self.is_left()),
            y: split(shape.y_cells, self.is_upper()),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::UpperLeft => "upper-left",
            Region::LowerLeft => "lower-left",
            Region::UpperRight => "upper-right",
            Region::LowerRight => "lower-right",
        };
        f.write_str(name)
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "upper-left" | "ul" => Ok(Region::UpperLeft),
            "lower-left" | "ll" => Ok(Region::LowerLeft),
            "upper-right" | "ur" => Ok(Region::UpperRight),
            "lower-right" | "lr" => Ok(Region::LowerRight),
            other => Err(anyhow::anyhow!("Unknown region: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub x: Range<usize>,
    pub y: Range<usize>,
}

impl CellRange {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.x.contains(&x) && self.y.contains(&y)
    }
}

/// Best cell of a search and its vote count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub cell: Cell,
    pub votes: Votes,
}

/// Second landmark: `B − A` scaled by `ratio`, placed at `point_a`, rotated about it.
pub fn point_b(point_a: Point2, reference_delta: Point2, angle: f64, ratio: f64) -> Point2 {
    rotate_point(point_a + reference_delta * ratio, point_a, angle)
}

/// Highest-voted cell inside `region` whose derived second landmark stays in the image.
///
/// With no votes in the quadrant the result is the quadrant's first cell at
/// scale 0, rotation 0 with zero votes.
pub fn best_candidate(
    accumulator: &Accumulator,
    space: &VoteSpace,
    region: Region,
    reference_delta: Point2,
) -> Candidate {
    let bounds = region.bounds(accumulator.shape());
    let shape = accumulator.shape();
    let mut best = Candidate {
        cell: Cell::new(bounds.x.start, bounds.y.start, 0, 0),
        votes: 0,
    };

    for x in bounds.x.clone() {
        for y in bounds.y.clone() {
            for s in 0..shape.scales {
                for r in 0..shape.rotations {
                    let cell = Cell::new(x, y, s, r);
                    let votes = accumulator.get(cell).unwrap_or(0);
                    if votes <= best.votes {
                        continue;
                    }
                    let a = space.point_a(x, y);
                    let b = point_b(a, reference_delta, space.angle(r), space.ratio(s));
                    if !space.contains_pixel(b) {
                        continue;
                    }
                    best = Candidate { cell, votes };
                }
            }
        }
    }

    tracing::trace!(region = %region, cell = ?best.cell, votes = best.votes, "Best candidate");
    best
}
