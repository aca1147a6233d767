//! Tests for CompressedRows

use super::*;

#[test]
fn test_rows_round_trip_through_counts() {
    let rows = CompressedRows::from_rows(vec![vec![1u32, 2, 3], vec![], vec![4]]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.row(0), &[1, 2, 3]);
    assert!(rows.row(1).is_empty());
    assert_eq!(rows.row(2), &[4]);

    let counts: Vec<u32> = rows.counts().collect();
    assert_eq!(counts, vec![3, 0, 1]);

    let rebuilt = CompressedRows::from_counts(&counts, rows.items().to_vec()).unwrap();
    assert_eq!(rebuilt, rows);
}

#[test]
fn test_count_mismatch_is_rejected() {
    let err = CompressedRows::from_counts(&[2, 2], vec![1u32, 2, 3]).unwrap_err();
    assert_eq!(err, RowsError::LengthMismatch { expected: 4, actual: 3 });
}

#[test]
fn test_empty_rows() {
    let rows: CompressedRows<u32> = CompressedRows::from_rows(Vec::<Vec<u32>>::new());
    assert!(rows.is_empty());
    assert_eq!(rows.iter().count(), 0);

    let default: CompressedRows<u32> = CompressedRows::default();
    assert_eq!(default.len(), 0);
}
