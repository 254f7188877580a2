//! Mixed-radix enumeration of the full grid cross-product.

use gs_types::{ConfigError, GsError, GsResult};

/// One enumeration step: the cursor tuple for a grid point, the index of the
/// outermost digit that moved, and the linear sample index.
///
/// All digits from `changed_from` inward changed on this step (the inner ones
/// by wrapping back to zero), so a caller re-applying parameter values only
/// needs to touch axes `changed_from..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub cursors: Vec<usize>,
    pub changed_from: usize,
    pub sample: u64,
}

/// Odometer over the cross-product of the given digit sizes.
///
/// Digit 0 varies slowest, the last digit fastest, which makes the visit
/// order lexicographic. The counter is positionable at any linear sample
/// index, so long runs can restart from a checkpoint without replaying the
/// prefix. Replaces one-stack-frame-per-dimension recursion: dimension count
/// no longer bounds stack depth.
#[derive(Debug, Clone)]
pub struct Odometer {
    sizes: Vec<usize>,
    total: u64,
    next: u64,
    prev: Option<Vec<usize>>,
}

impl Odometer {
    pub fn new(sizes: &[usize]) -> GsResult<Self> {
        if sizes.is_empty() {
            return Err(ConfigError::NoAxes.into());
        }
        if sizes.contains(&0) {
            return Err(GsError::Internal(
                "odometer digit with zero values".to_string(),
            ));
        }
        let total = sizes
            .iter()
            .try_fold(1u64, |product, &size| product.checked_mul(size as u64))
            .ok_or(ConfigError::GridSizeOverflow)?;

        Ok(Self {
            sizes: sizes.to_vec(),
            total,
            next: 0,
            prev: None,
        })
    }

    /// Total number of grid points.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Linear index of the next point to be produced.
    pub fn sample_index(&self) -> u64 {
        self.next
    }

    /// Position the counter at an arbitrary linear sample index. The first
    /// step after a seek reports every digit as changed.
    pub fn seek(&mut self, sample: u64) {
        self.next = sample;
        self.prev = None;
    }

    /// Advance to the next grid point, or `None` once the grid is exhausted.
    pub fn step(&mut self) -> Option<Step> {
        if self.next >= self.total {
            return None;
        }

        let cursors = self.decompose(self.next);
        let changed_from = match &self.prev {
            None => 0,
            Some(prev) => cursors
                .iter()
                .zip(prev.iter())
                .position(|(current, previous)| current != previous)
                .unwrap_or(0),
        };

        let step = Step {
            cursors: cursors.clone(),
            changed_from,
            sample: self.next,
        };
        self.prev = Some(cursors);
        self.next += 1;
        Some(step)
    }

    fn decompose(&self, mut linear: u64) -> Vec<usize> {
        let mut cursors = vec![0usize; self.sizes.len()];
        for digit in (0..self.sizes.len()).rev() {
            let size = self.sizes[digit] as u64;
            cursors[digit] = (linear % size) as usize;
            linear /= size;
        }
        cursors
    }
}
