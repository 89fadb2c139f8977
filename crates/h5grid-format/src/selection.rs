//! Hyperslab selection for partial dataset I/O.
//!
//! A [`Hyperslab`] is an axis-aligned box inside a dataspace, given by a
//! `start` and a `count` per dimension. For contiguous storage the box is
//! walked as a sequence of [`Run`]s: maximal stretches of elements that are
//! adjacent in row-major order and can be moved with one read or write.
//!
//! ```
//! use h5grid_format::selection::Hyperslab;
//!
//! // Column 2 of a 3x4 matrix: three runs of one element each.
//! let sel = Hyperslab::new(vec![0, 2], vec![3, 1]);
//! let runs: Vec<_> = sel.runs(&[3, 4]).map(|r| r.offset).collect();
//! assert_eq!(runs, vec![2, 6, 10]);
//! ```

use std::ops::Range;

use crate::error::FormatError;

/// Box selection with unit stride and unit block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    pub start: Vec<u64>,
    pub count: Vec<u64>,
}

/// A stretch of `len` consecutive elements beginning at linear element
/// index `offset` in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub offset: u64,
    pub len: u64,
}

impl Hyperslab {
    pub fn new(start: Vec<u64>, count: Vec<u64>) -> Self {
        Self { start, count }
    }

    /// A single element at `coords`.
    pub fn point(coords: &[u64]) -> Self {
        Self {
            start: coords.to_vec(),
            count: vec![1; coords.len()],
        }
    }

    /// One half-open range per dimension.
    pub fn slice(ranges: &[Range<u64>]) -> Self {
        Self {
            start: ranges.iter().map(|r| r.start).collect(),
            count: ranges.iter().map(|r| r.end.saturating_sub(r.start)).collect(),
        }
    }

    /// The whole of a dataspace with extent `dims`.
    pub fn all(dims: &[u64]) -> Self {
        Self {
            start: vec![0; dims.len()],
            count: dims.to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.count.len()
    }

    /// Number of selected elements (saturating).
    pub fn num_elements(&self) -> u64 {
        self.count.iter().fold(1u64, |acc, &c| acc.saturating_mul(c))
    }

    /// Shape of the selected box; the matching in-memory dataspace.
    pub fn output_shape(&self) -> &[u64] {
        &self.count
    }

    /// Verify the selection fits inside `dims`.
    pub fn check_bounds(&self, dims: &[u64]) -> Result<(), FormatError> {
        if self.start.len() != self.count.len() || self.count.len() != dims.len() {
            return Err(FormatError::RankMismatch {
                selection: self.start.len().max(self.count.len()),
                dataspace: dims.len(),
            });
        }
        let fits = self
            .start
            .iter()
            .zip(&self.count)
            .zip(dims)
            .all(|((&s, &c), &d)| s.checked_add(c).is_some_and(|end| end <= d));
        if !fits {
            return Err(FormatError::SelectionOutOfBounds {
                start: self.start.clone(),
                count: self.count.clone(),
                dims: dims.to_vec(),
            });
        }
        Ok(())
    }

    /// Contiguous runs covering the selection, in row-major order.
    ///
    /// The selection must already have passed [`check_bounds`](Self::check_bounds)
    /// against `dims`.
    pub fn runs(&self, dims: &[u64]) -> Runs {
        let rank = dims.len();
        let mut strides = vec![1u64; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1].saturating_mul(dims[d + 1]);
        }

        if rank == 0 {
            return Runs {
                start: Vec::new(),
                count: Vec::new(),
                strides,
                split: 0,
                run_len: 1,
                base: 0,
                index: Vec::new(),
                done: false,
            };
        }

        // Trailing dimensions selected in full merge into the run.
        let mut split = rank - 1;
        while split > 0 && self.start[split] == 0 && self.count[split] == dims[split] {
            split -= 1;
        }
        let run_len = self.count[split].saturating_mul(strides[split]);

        Runs {
            start: self.start[..split].to_vec(),
            count: self.count[..split].to_vec(),
            base: self.start[split].saturating_mul(strides[split]),
            strides,
            split,
            run_len,
            index: vec![0; split],
            done: self.count.contains(&0),
        }
    }
}

/// Iterator over the [`Run`]s of a hyperslab.
#[derive(Debug, Clone)]
pub struct Runs {
    start: Vec<u64>,
    count: Vec<u64>,
    strides: Vec<u64>,
    /// Dimensions before `split` are iterated; the rest form one run.
    split: usize,
    run_len: u64,
    base: u64,
    index: Vec<u64>,
    done: bool,
}

impl Iterator for Runs {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        if self.done {
            return None;
        }
        let offset = (0..self.split).fold(self.base, |acc, d| {
            acc + (self.start[d] + self.index[d]) * self.strides[d]
        });

        // Odometer over the outer dimensions.
        self.done = true;
        for d in (0..self.split).rev() {
            self.index[d] += 1;
            if self.index[d] < self.count[d] {
                self.done = false;
                break;
            }
            self.index[d] = 0;
        }

        Some(Run {
            offset,
            len: self.run_len,
        })
    }
}
