//! Compressed rows: a ragged 2D array stored as one flat buffer plus offsets.
//!
//! Row `i` occupies `items[offsets[i]..offsets[i + 1]]`. Offsets are the prefix
//! sum of the per-row counts, which is also the order rows are persisted in.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowsError {
    #[error("row counts sum to {expected} but {actual} items were supplied")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressedRows<T> {
    offsets: Vec<usize>,
    items: Vec<T>,
}

impl<T> CompressedRows<T> {
    /// Flatten nested rows.
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = T>,
    {
        let mut offsets = vec![0];
        let mut items = Vec::new();
        for row in rows {
            items.extend(row);
            offsets.push(items.len());
        }
        Self { offsets, items }
    }

    /// Rebuild from per-row counts and the flattened item list.
    pub fn from_counts(counts: &[u32], items: Vec<T>) -> Result<Self, RowsError> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for &count in counts {
            total += count as usize;
            offsets.push(total);
        }
        if total != items.len() {
            return Err(RowsError::LengthMismatch { expected: total, actual: items.len() });
        }
        Ok(Self { offsets, items })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.items[self.offsets[index]..self.offsets[index + 1]]
    }

    pub fn row_len(&self, index: usize) -> usize {
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Per-row counts, in row order.
    pub fn counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.offsets.windows(2).map(|w| (w[1] - w[0]) as u32)
    }

    /// The flattened buffer.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }
}
