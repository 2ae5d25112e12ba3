//! R-table: orientation bucket → offset vectors pointing at reference point A.
//!
//! The table built from a template is never mutated; [`RTable::rotated`] and
//! [`RTable::scaled`] return transient copies used by one accumulation step.

use super::geometry::{rotate_vector, Point2};

#[derive(Debug, Clone, PartialEq)]
pub struct RTable {
    buckets: Vec<Vec<Point2>>,
}

impl RTable {
    pub fn with_intervals(intervals: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); intervals],
        }
    }

    pub fn intervals(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, bin: usize) -> &[Point2] {
        self.buckets.get(bin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of offsets across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Bucket sizes, indexed by bin.
    pub fn occupancy(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Indices of buckets holding at least one offset.
    pub fn occupied_bins(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(bin, _)| bin)
    }

    pub(crate) fn push(&mut self, bin: usize, offset: Point2) {
        let last = self.buckets.len().saturating_sub(1);
        self.buckets[bin.min(last)].push(offset);
    }

    /// Rotate every offset by the angle whose cosine/sine are given and shift
    /// bucket `ii` to `(ii + steps) mod intervals`.
    pub fn rotated(&self, steps: i64, cos_a: f64, sin_a: f64) -> RTable {
        let n = self.buckets.len();
        let mut out = RTable::with_intervals(n);
        if n == 0 {
            return out;
        }
        for (bin, bucket) in self.buckets.iter().enumerate() {
            let target = (bin as i64 + steps).rem_euclid(n as i64) as usize;
            out.buckets[target].extend(bucket.iter().map(|&v| rotate_vector(v, cos_a, sin_a)));
        }
        out
    }

    pub fn scaled(&self, factor: f64) -> RTable {
        RTable {
            buckets: self
                .buckets
                .iter()
                .map(|bucket| bucket.iter().map(|&v| v * factor).collect())
                .collect(),
        }
    }
}
