//! Normalizes the sparse hourly usage map into a dense, uniformly spaced
//! series suitable for charting.
//!
//! The dense axis always covers the full trailing window, so hours with no
//! recorded usage render as empty columns instead of disappearing and
//! compressing the time scale around them.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::models::{ChartKind, TokenBreakdown};

/// Widest chart body the renderer will produce, in data columns.
pub const MAX_COLUMNS: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("No time series data available.")]
    EmptyInput,
    #[error("Not enough data points for chart.")]
    InsufficientData,
}

/// A dense hourly series covering the trailing window, gaps zero-filled.
#[derive(Debug, Clone)]
pub struct DenseSeries {
    pub times: Vec<NaiveDateTime>,
    pub breakdowns: Vec<TokenBreakdown>,
    /// Per-bucket sum of the chart kind's selected categories, parallel to
    /// `times`. This is what the Y-axis is scaled against.
    pub totals: Vec<u64>,
    /// Effective hours represented by each column. 1.0 unless the raw axis
    /// exceeded [`MAX_COLUMNS`] and was subsampled.
    pub hours_per_column: f64,
}

impl DenseSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_downsampled(&self) -> bool {
        self.hours_per_column > 1.0
    }
}

/// Truncate a timestamp down to the top of its hour.
pub fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Build the dense series for the trailing `days_back` window.
///
/// The window runs from `max(keys) - days_back`, rounded down to the hour,
/// through `max(keys)` inclusive. If the resulting axis has more than
/// [`MAX_COLUMNS`] points it is reduced by keeping every `len / MAX_COLUMNS`-th
/// element starting at index 0 — a deterministic stride, never averaging.
pub fn normalize(
    sparse: &HashMap<NaiveDateTime, TokenBreakdown>,
    days_back: i64,
    kind: ChartKind,
) -> Result<DenseSeries, ChartError> {
    let last = *sparse.keys().max().ok_or(ChartError::EmptyInput)?;
    let start = truncate_to_hour(last - Duration::days(days_back));

    let mut times = Vec::new();
    let mut current = start;
    while current <= last {
        times.push(current);
        current += Duration::hours(1);
    }

    let mut hours_per_column = 1.0;
    if times.len() > MAX_COLUMNS {
        hours_per_column = times.len() as f64 / MAX_COLUMNS as f64;
        let stride = (times.len() / MAX_COLUMNS).max(1);
        times = times.into_iter().step_by(stride).collect();
    }

    if times.len() < 2 {
        return Err(ChartError::InsufficientData);
    }

    let breakdowns: Vec<TokenBreakdown> = times
        .iter()
        .map(|t| sparse.get(t).copied().unwrap_or_default())
        .collect();
    let totals = breakdowns.iter().map(|b| b.total(kind)).collect();

    Ok(DenseSeries {
        times,
        breakdowns,
        totals,
        hours_per_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn breakdown(input: u64) -> TokenBreakdown {
        TokenBreakdown {
            input,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let sparse = HashMap::new();
        assert_eq!(
            normalize(&sparse, 7, ChartKind::All).unwrap_err(),
            ChartError::EmptyInput
        );
    }

    #[test]
    fn test_single_point_window_is_insufficient() {
        let mut sparse = HashMap::new();
        sparse.insert(hour(1, 12), breakdown(10));
        assert_eq!(
            normalize(&sparse, 0, ChartKind::All).unwrap_err(),
            ChartError::InsufficientData
        );
    }

    #[test]
    fn test_window_covers_every_hour_inclusive() {
        let mut sparse = HashMap::new();
        sparse.insert(hour(10, 15), breakdown(100));
        let dense = normalize(&sparse, 7, ChartKind::All).unwrap();
        // 7 days of hourly points plus the inclusive endpoint.
        assert_eq!(dense.len(), 7 * 24 + 1);
        assert_eq!(dense.times[0], hour(3, 15));
        assert_eq!(*dense.times.last().unwrap(), hour(10, 15));
        assert!(!dense.is_downsampled());
    }

    #[test]
    fn test_gaps_are_zero_filled() {
        let mut sparse = HashMap::new();
        sparse.insert(hour(1, 0), breakdown(50));
        sparse.insert(hour(2, 0), breakdown(70));
        let dense = normalize(&sparse, 1, ChartKind::All).unwrap();
        assert_eq!(dense.len(), 25);
        assert_eq!(dense.breakdowns[0], breakdown(50));
        assert_eq!(dense.breakdowns[12], TokenBreakdown::default());
        assert_eq!(dense.breakdowns[24], breakdown(70));
        assert_eq!(dense.totals.iter().sum::<u64>(), 120);
    }

    #[test]
    fn test_totals_follow_chart_kind() {
        let mut sparse = HashMap::new();
        sparse.insert(
            hour(1, 0),
            TokenBreakdown {
                input: 1,
                output: 2,
                cache_creation: 4,
                cache_read: 8,
            },
        );
        sparse.insert(hour(2, 0), breakdown(0));
        let io = normalize(&sparse, 1, ChartKind::Io).unwrap();
        assert_eq!(io.totals[0], 3);
        let cache = normalize(&sparse, 1, ChartKind::Cache).unwrap();
        assert_eq!(cache.totals[0], 12);
    }

    #[test]
    fn test_oversized_axis_is_strided() {
        let mut sparse = HashMap::new();
        sparse.insert(hour(1, 0), breakdown(1));
        sparse.insert(hour(1, 0) + Duration::hours(1200), breakdown(2));
        let dense = normalize(&sparse, 50, ChartKind::All).unwrap();
        // Raw axis is 1201 points, stride 1201 / 500 = 2 keeps indices 0, 2, 4...
        assert_eq!(dense.len(), 601);
        assert_eq!(dense.times[0], hour(1, 0));
        assert_eq!(dense.times[1], hour(1, 2));
        assert!(dense.is_downsampled());

        // Deterministic: a second pass selects the same points.
        let again = normalize(&sparse, 50, ChartKind::All).unwrap();
        assert_eq!(dense.times, again.times);
        assert_eq!(dense.totals, again.totals);
    }

    #[test]
    fn test_window_start_rounds_down_to_hour() {
        let mut sparse = HashMap::new();
        let last = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(15, 42, 7)
            .unwrap();
        sparse.insert(last, breakdown(9));
        let dense = normalize(&sparse, 1, ChartKind::All).unwrap();
        assert_eq!(dense.times[0], hour(9, 15));
        // 24 full hourly steps fit between 09th 15:00 and 10th 15:42.
        assert_eq!(dense.len(), 25);
    }
}
