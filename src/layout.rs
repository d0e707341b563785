//! Column layout: maps dense series buckets to chart columns, inserts day
//! separators, scales category values to row heights, and locates each day's
//! header label.

use chrono::{NaiveDateTime, Timelike};

use crate::models::ChartKind;
use crate::scale::ScaleRange;
use crate::series::DenseSeries;

/// One character column of the chart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartColumn {
    /// Vertical divider drawn at a calendar day boundary.
    Separator,
    /// A data column, referencing an index into the dense series.
    Data(usize),
}

/// One of the four stacked token categories, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Input,
    Output,
    CacheCreation,
    CacheRead,
}

/// Per-category bar heights for one data column, already scaled to rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackHeights {
    pub input: usize,
    pub output: usize,
    pub cache_creation: usize,
    pub cache_read: usize,
}

impl StackHeights {
    /// Which category's stacked band a row falls in, for the active subset.
    ///
    /// Hidden categories are excluded from the cumulative sum entirely, so a
    /// 2-category chart stacks its two visible bands from zero.
    pub fn category_at(&self, row: usize, kind: ChartKind) -> Option<Category> {
        let stack: &[(Category, usize)] = match kind {
            ChartKind::Io => &[(Category::Input, self.input), (Category::Output, self.output)],
            ChartKind::Cache => &[
                (Category::CacheCreation, self.cache_creation),
                (Category::CacheRead, self.cache_read),
            ],
            ChartKind::All => &[
                (Category::Input, self.input),
                (Category::Output, self.output),
                (Category::CacheCreation, self.cache_creation),
                (Category::CacheRead, self.cache_read),
            ],
        };

        let mut cumulative = 0;
        for &(category, height) in stack {
            cumulative += height;
            if row < cumulative {
                return Some(category);
            }
        }
        None
    }
}

/// Aggregate total for one calendar day, placed at its horizontal midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotal {
    pub mid_col: usize,
    pub total: u64,
    pub start: NaiveDateTime,
}

/// The full column layout for one chart render.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub columns: Vec<ChartColumn>,
    /// Scaled stack heights, parallel to the dense series.
    pub stacks: Vec<StackHeights>,
    pub day_totals: Vec<DayTotal>,
    /// Data index -> column index.
    pub data_to_col: Vec<usize>,
}

impl ChartLayout {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

pub fn build(series: &DenseSeries, range: ScaleRange, height: usize) -> ChartLayout {
    let mut columns = Vec::with_capacity(series.len() + series.len() / 24 + 1);
    let mut data_to_col = Vec::with_capacity(series.len());

    for (i, time) in series.times.iter().enumerate() {
        // A separator precedes every 00:00 column except the very first day's.
        if time.hour() == 0 && time.minute() == 0 && i > 0 {
            columns.push(ChartColumn::Separator);
        }
        data_to_col.push(columns.len());
        columns.push(ChartColumn::Data(i));
    }

    let stacks = series
        .breakdowns
        .iter()
        .map(|b| StackHeights {
            input: scale_component(b.input, range, height),
            output: scale_component(b.output, range, height),
            cache_creation: scale_component(b.cache_creation, range, height),
            cache_read: scale_component(b.cache_read, range, height),
        })
        .collect();

    let day_totals = day_totals(&columns, series);

    ChartLayout {
        columns,
        stacks,
        day_totals,
        data_to_col,
    }
}

/// Scale one category value to a row count.
///
/// Every bar normalizes from zero against the full `min..max` span, even
/// though the axis legend starts at `min`. Bars stay proportional to each
/// other this way; the mismatch with the axis labels is deliberate.
fn scale_component(value: u64, range: ScaleRange, height: usize) -> usize {
    if range.span() == 0 || height < 2 {
        return 0;
    }
    (value as f64 / range.span() as f64 * (height - 1) as f64) as usize
}

/// Sum consecutive data-column totals between separators into per-day
/// aggregates, each with the midpoint column its header label centers on.
fn day_totals(columns: &[ChartColumn], series: &DenseSeries) -> Vec<DayTotal> {
    let mut days = Vec::new();
    let mut day_start: Option<NaiveDateTime> = None;
    let mut day_total = 0u64;
    let mut day_start_col = 0usize;

    for (col_idx, column) in columns.iter().enumerate() {
        match *column {
            ChartColumn::Separator => {
                if let Some(start) = day_start {
                    days.push(DayTotal {
                        mid_col: (day_start_col + col_idx) / 2,
                        total: day_total,
                        start,
                    });
                }
                day_start = None;
                day_total = 0;
                day_start_col = col_idx + 1;
            }
            ChartColumn::Data(i) => {
                if day_start.is_none() {
                    day_start = Some(series.times[i]);
                    day_start_col = col_idx;
                }
                day_total += series.totals[i];
            }
        }
    }

    if let Some(start) = day_start {
        days.push(DayTotal {
            mid_col: (day_start_col + columns.len()) / 2,
            total: day_total,
            start,
        });
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartKind, TokenBreakdown};
    use chrono::NaiveDate;

    fn hour(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// A dense series of `count` hourly points from `first`, 100 input
    /// tokens in every bucket.
    fn dense_hours(first: NaiveDateTime, count: usize) -> DenseSeries {
        let times: Vec<NaiveDateTime> = (0..count)
            .map(|i| first + chrono::Duration::hours(i as i64))
            .collect();
        let breakdowns = vec![TokenBreakdown { input: 100, ..Default::default() }; count];
        let totals = vec![100; count];
        DenseSeries {
            times,
            breakdowns,
            totals,
            hours_per_column: 1.0,
        }
    }

    #[test]
    fn test_ten_days_have_nine_separators() {
        // Ten calendar days on screen: no separator before the first day,
        // one between each adjacent pair.
        let dense = dense_hours(hour(1, 12), 9 * 24 + 1);
        let layout = build(&dense, ScaleRange { min: 0, max: 5_000 }, 10);
        let separators = layout
            .columns
            .iter()
            .filter(|c| **c == ChartColumn::Separator)
            .count();
        assert_eq!(separators, 9);
        assert_eq!(layout.width(), dense.len() + 9);
        assert_ne!(layout.columns[0], ChartColumn::Separator);
    }

    #[test]
    fn test_separator_precedes_midnight_column() {
        let dense = dense_hours(hour(1, 22), 5);
        let layout = build(&dense, ScaleRange { min: 0, max: 5_000 }, 10);
        // 22:00 23:00 | 00:00 01:00 02:00
        assert_eq!(
            layout.columns,
            vec![
                ChartColumn::Data(0),
                ChartColumn::Data(1),
                ChartColumn::Separator,
                ChartColumn::Data(2),
                ChartColumn::Data(3),
                ChartColumn::Data(4),
            ]
        );
        assert_eq!(layout.data_to_col, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_scaled_heights_floor_against_full_span() {
        let range = ScaleRange { min: 0, max: 100 };
        assert_eq!(scale_component(100, range, 10), 9);
        assert_eq!(scale_component(50, range, 10), 4); // floor(4.5)
        assert_eq!(scale_component(0, range, 10), 0);
    }

    #[test]
    fn test_stacking_is_exclusive_and_ordered() {
        let stack = StackHeights {
            input: 2,
            output: 3,
            cache_creation: 1,
            cache_read: 2,
        };
        let bands: Vec<_> = (0..10).map(|r| stack.category_at(r, ChartKind::All)).collect();
        assert_eq!(
            bands,
            vec![
                Some(Category::Input),
                Some(Category::Input),
                Some(Category::Output),
                Some(Category::Output),
                Some(Category::Output),
                Some(Category::CacheCreation),
                Some(Category::CacheRead),
                Some(Category::CacheRead),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_hidden_categories_restack_from_zero() {
        let stack = StackHeights {
            input: 4,
            output: 4,
            cache_creation: 2,
            cache_read: 1,
        };
        // Cache chart ignores the 8 rows of input/output entirely.
        assert_eq!(stack.category_at(0, ChartKind::Cache), Some(Category::CacheCreation));
        assert_eq!(stack.category_at(1, ChartKind::Cache), Some(Category::CacheCreation));
        assert_eq!(stack.category_at(2, ChartKind::Cache), Some(Category::CacheRead));
        assert_eq!(stack.category_at(3, ChartKind::Cache), None);
    }

    #[test]
    fn test_day_totals_split_on_separators() {
        let dense = dense_hours(hour(1, 22), 5);
        let layout = build(&dense, ScaleRange { min: 0, max: 5_000 }, 10);
        assert_eq!(layout.day_totals.len(), 2);

        // Columns: 22:00 23:00 | 00:00 01:00 02:00
        let first = layout.day_totals[0];
        assert_eq!(first.start, hour(1, 22));
        assert_eq!(first.total, 200);
        assert_eq!(first.mid_col, (0 + 2) / 2);

        let second = layout.day_totals[1];
        assert_eq!(second.start, hour(2, 0));
        assert_eq!(second.total, 300);
        assert_eq!(second.mid_col, (3 + 6) / 2);
    }

    #[test]
    fn test_degenerate_range_yields_flat_stacks() {
        let dense = dense_hours(hour(1, 22), 5);
        let layout = build(&dense, ScaleRange { min: 0, max: 0 }, 10);
        assert!(layout.stacks.iter().all(|s| *s == StackHeights::default()));
    }
}
