// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-major numeric tables handed to the engine.

use crate::error::{Error, Result};

/// A flat, row-major table of `f64` values with a fixed column count.
///
/// Construction guarantees `values.len()` is a multiple of `column_count`,
/// and that `column_count` is non-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataframe {
    values: Vec<f64>,
    column_count: usize,
}

impl Dataframe {
    /// Validates and wraps `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MismatchedDimension`] if `column_count` is zero or does
    /// not evenly divide `values.len()`.
    pub fn new(values: Vec<f64>, column_count: usize) -> Result<Self> {
        if column_count == 0 || values.len() % column_count != 0 {
            return Err(Error::MismatchedDimension {
                len: values.len(),
                columns: column_count,
            });
        }
        Ok(Self {
            values,
            column_count,
        })
    }

    /// The values, row-major.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.values.len() / self.column_count
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over rows.
    pub fn rows(&self) -> core::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.column_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_divisibility() {
        for k in [1_usize, 2, 3, 7] {
            for len in 0..=(3 * k + 2) {
                let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
                let result = Dataframe::new(values, k);
                if len % k == 0 {
                    let frame = result.unwrap();
                    assert_eq!(frame.row_count(), len / k);
                    assert_eq!(frame.column_count(), k);
                } else {
                    assert!(
                        matches!(result, Err(Error::MismatchedDimension { len: l, columns }) if l == len && columns == k),
                        "len {len} with {k} columns should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn zero_columns_rejected() {
        assert!(matches!(
            Dataframe::new(Vec::new(), 0),
            Err(Error::MismatchedDimension { columns: 0, .. })
        ));
    }

    #[test]
    fn rows_iterate_in_order() {
        let frame = Dataframe::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
        let rows: Vec<&[f64]> = frame.rows().collect();
        assert_eq!(rows, [&[1.0, 2.0, 3.0][..], &[4.0, 5.0, 6.0][..]]);
    }
}
