//! Dense 4D vote accumulator indexed `[x][y][scale][rotation]` and the voting loop.
//!
//! Complexity per call: `R × S × bucket size × matching edge points`. Trig and
//! the rotated table are computed once per rotation step, the scaled table once
//! per (rotation, scale) pair; nothing is recomputed per edge point.

use super::geometry::Point2;
use super::gradient::EdgePoint;
use super::rtable::RTable;
use crate::config::GhtConfig;
use anyhow::{anyhow, bail};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Vote counter. Increments saturate at `u16::MAX`; a cell can only get there
/// when more than 65535 (edge point, offset) pairs land on it, which needs an
/// edge image far denser than a silhouette outline.
pub type Votes = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatorShape {
    pub x_cells: usize,
    pub y_cells: usize,
    pub scales: usize,
    pub rotations: usize,
}

impl AccumulatorShape {
    pub fn cells(&self) -> usize {
        self.x_cells * self.y_cells * self.scales * self.rotations
    }

    fn dims(&self) -> (usize, usize, usize, usize) {
        (self.x_cells, self.y_cells, self.scales, self.rotations)
    }
}

/// Index of one accumulator cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub scale: usize,
    pub rotation: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize, scale: usize, rotation: usize) -> Self {
        Self { x, y, scale, rotation }
    }

    fn index(&self) -> [usize; 4] {
        [self.x, self.y, self.scale, self.rotation]
    }
}

/// Number of scale steps covering `[width_min, width_max]` inclusively.
pub fn scale_count(width_min: f64, width_max: f64, width_step: f64) -> usize {
    ((width_max - width_min) / width_step + 1.0).ceil().max(1.0) as usize
}

/// Number of rotation steps of size `π / intervals` starting at `floor(angle_min / Δ)`:
/// `ceil(angle_max / Δ) − floor(angle_min / Δ)`, at least one.
/// `[−π, π]` yields the distinct angles `−π ..= π − Δ`.
pub fn rotation_count(angle_min: f64, angle_max: f64, intervals: usize) -> usize {
    let delta = PI / intervals as f64;
    let first = (angle_min / delta).floor() as i64;
    let last = (angle_max / delta).ceil() as i64;
    (last - first).max(1) as usize
}

/// Maps accumulator indices back to image-space parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteSpace {
    shape: AccumulatorShape,
    cell_size: u32,
    width_min: f64,
    width_step: f64,
    template_width: f64,
    /// `floor(angle_min / Δ)`
    rotation_base: i64,
    angle_step: f64,
}

impl VoteSpace {
    pub fn new(image_width: u32, image_height: u32, config: &GhtConfig, template_width: u32) -> crate::Result<Self> {
        config
            .validate()
            .map_err(|errors| anyhow!("Invalid GHT configuration: {}", errors.join("; ")))?;
        if image_width == 0 || image_height == 0 {
            bail!("Edge image is empty: {}x{}", image_width, image_height);
        }
        if template_width == 0 {
            bail!("Template width must be positive");
        }

        let cell = config.cell_size;
        let angle_step = PI / config.intervals as f64;
        let shape = AccumulatorShape {
            x_cells: image_width.div_ceil(cell) as usize,
            y_cells: image_height.div_ceil(cell) as usize,
            scales: scale_count(config.width_min, config.width_max, config.width_step),
            rotations: rotation_count(config.angle_min, config.angle_max, config.intervals),
        };

        Ok(Self {
            shape,
            cell_size: cell,
            width_min: config.width_min,
            width_step: config.width_step,
            template_width: template_width as f64,
            rotation_base: (config.angle_min / angle_step).floor() as i64,
            angle_step,
        })
    }

    pub fn shape(&self) -> AccumulatorShape {
        self.shape
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Signed number of angle steps applied at rotation index `r`.
    pub fn rotation_steps(&self, r: usize) -> i64 {
        r as i64 + self.rotation_base
    }

    /// Rotation angle in radians for rotation index `r`.
    pub fn angle(&self, r: usize) -> f64 {
        self.rotation_steps(r) as f64 * self.angle_step
    }

    /// Matched template width in pixels for scale index `s`.
    pub fn width(&self, s: usize) -> f64 {
        self.width_min + s as f64 * self.width_step
    }

    /// Matched width over template width for scale index `s`.
    pub fn ratio(&self, s: usize) -> f64 {
        self.width(s) / self.template_width
    }

    /// Pixel position represented by cell `(x, y)`.
    pub fn point_a(&self, x: usize, y: usize) -> Point2 {
        let cell = self.cell_size as usize;
        let half = (cell + 1) / 2;
        Point2::new((x * cell + half) as f64, (y * cell + half) as f64)
    }

    /// Pixel extent covered by the accumulator grid.
    pub fn pixel_extent(&self) -> (f64, f64) {
        let cell = self.cell_size as f64;
        (self.shape.x_cells as f64 * cell, self.shape.y_cells as f64 * cell)
    }

    pub fn contains_pixel(&self, p: Point2) -> bool {
        let (w, h) = self.pixel_extent();
        p.x >= 0.0 && p.x < w && p.y >= 0.0 && p.y < h
    }
}

#[derive(Debug, Clone)]
pub struct Accumulator {
    votes: Array4<Votes>,
}

impl Accumulator {
    pub fn zeros(shape: AccumulatorShape) -> Self {
        Self {
            votes: Array4::zeros(shape.dims()),
        }
    }

    pub fn shape(&self) -> AccumulatorShape {
        let (x_cells, y_cells, scales, rotations) = self.votes.dim();
        AccumulatorShape {
            x_cells,
            y_cells,
            scales,
            rotations,
        }
    }

    pub fn get(&self, cell: Cell) -> Option<Votes> {
        self.votes.get(cell.index()).copied()
    }

    /// Add one vote; returns `false` and leaves the array untouched when the
    /// cell lies outside the grid.
    pub fn vote(&mut self, x: i64, y: i64, scale: usize, rotation: usize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.increment(Cell::new(x as usize, y as usize, scale, rotation))
    }

    pub fn increment(&mut self, cell: Cell) -> bool {
        match self.votes.get_mut(cell.index()) {
            Some(v) => {
                *v = v.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|&v| v as u64).sum()
    }

    /// Non-empty cells with their vote counts, in `[x][y][s][r]` order.
    pub fn nonzero_cells(&self) -> impl Iterator<Item = (Cell, Votes)> + '_ {
        self.votes
            .indexed_iter()
            .filter(|(_, &v)| v > 0)
            .map(|((x, y, s, r), &v)| (Cell::new(x, y, s, r), v))
    }
}

/// Vote every edge point through every rotated and scaled copy of `table`.
pub fn accumulate(table: &RTable, edges: &[EdgePoint], space: &VoteSpace) -> Accumulator {
    let shape = space.shape();
    let mut accumulator = Accumulator::zeros(shape);
    let intervals = table.intervals();

    let mut edges_by_bin: Vec<Vec<&EdgePoint>> = vec![Vec::new(); intervals];
    for edge in edges {
        if let Some(group) = edges_by_bin.get_mut(edge.bin) {
            group.push(edge);
        }
    }

    let cell = space.cell_size() as f64;
    let mut cast = 0u64;

    for r in 0..shape.rotations {
        let (sin_a, cos_a) = space.angle(r).sin_cos();
        let rotated = table.rotated(space.rotation_steps(r), cos_a, sin_a);
        let bins: Vec<usize> = rotated
            .occupied_bins()
            .filter(|&bin| !edges_by_bin[bin].is_empty())
            .collect();
        if bins.is_empty() {
            continue;
        }

        for s in 0..shape.scales {
            // offsets are in pixels, edge points in cells
            let scaled = rotated.scaled(space.ratio(s) / cell);
            for &bin in &bins {
                let offsets = scaled.bucket(bin);
                for edge in &edges_by_bin[bin] {
                    for offset in offsets {
                        let x = (edge.x + offset.x).floor() as i64;
                        let y = (edge.y + offset.y).floor() as i64;
                        if accumulator.vote(x, y, s, r) {
                            cast += 1;
                        }
                    }
                }
            }
        }
    }

    tracing::debug!(
        rotations = shape.rotations,
        scales = shape.scales,
        edge_points = edges.len(),
        votes_cast = cast,
        "Accumulation completed"
    );

    accumulator
}
