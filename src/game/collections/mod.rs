//! Flat collections shared by the navmesh.
//!
//! # Example
//!
//! ```rust
//! use torusnav::game::collections::CompressedRows;
//!
//! // Two rows: [7, 8] and [9]
//! let rows = CompressedRows::from_rows(vec![vec![7u32, 8], vec![9]]);
//! assert_eq!(rows.row(0), &[7, 8]);
//! assert_eq!(rows.row_len(1), 1);
//! ```

pub mod compressed_rows;

#[cfg(test)]
mod tests;

pub use compressed_rows::{CompressedRows, RowsError};
