use ndarray::{s, ArrayView2};

use crate::error::{Error, Result};

/// ColumnBatches yields consecutive column slices of an input/target pair.
/// The last batch is narrower when the column count is not a multiple of
/// `batch_size`; nothing is padded or dropped.
#[derive(Debug, Clone)]
pub struct ColumnBatches<'a> {
    input: ArrayView2<'a, f64>,
    target: ArrayView2<'a, f64>,
    batch_size: usize,
    start: usize,
}

impl<'a> ColumnBatches<'a> {
    pub fn new(
        input: ArrayView2<'a, f64>,
        target: ArrayView2<'a, f64>,
        batch_size: usize,
    ) -> Result<Self> {
        if input.ncols() != target.ncols() {
            return Err(Error::shape_mismatch(
                "batch split",
                input.shape(),
                target.shape(),
            ));
        }
        if batch_size == 0 || input.ncols() == 0 {
            return Err(Error::EmptyBatch {
                operation: "batch split",
            });
        }
        Ok(Self {
            input,
            target,
            batch_size,
            start: 0,
        })
    }

    pub fn len(&self) -> usize {
        (self.input.ncols() - self.start).div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Iterator for ColumnBatches<'a> {
    type Item = (ArrayView2<'a, f64>, ArrayView2<'a, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let n_columns = self.input.ncols();
        if self.start >= n_columns {
            return None;
        }
        let end = (self.start + self.batch_size).min(n_columns);
        let batch = (
            self.input.slice_move(s![.., self.start..end]),
            self.target.slice_move(s![.., self.start..end]),
        );
        self.start = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for ColumnBatches<'_> {}
