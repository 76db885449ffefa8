//! Inclusive date-range filtering over rental tables.

use rental_core::models::{DateRange, RentalRow};

/// Rows of `rows` whose date lies within `range`, in their original order.
///
/// A range that excludes every row yields an empty table.
pub fn filter_range<R: RentalRow + Clone>(rows: &[R], range: &DateRange) -> Vec<R> {
    rows.iter()
        .filter(|row| range.contains(row.date()))
        .cloned()
        .collect()
}
