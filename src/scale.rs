//! Y-axis scale selection.
//!
//! Bounds snap to multiples of 5, 5K, 5M or 5B so the axis labels stay round
//! numbers no matter what magnitude the data happens to be at.

/// Inclusive Y-axis bounds for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleRange {
    pub min: u64,
    pub max: u64,
}

impl ScaleRange {
    pub fn span(&self) -> u64 {
        self.max - self.min
    }
}

/// Derive nice-rounded bounds from the per-bucket totals.
///
/// Max rounds up and min rounds down to a magnitude-appropriate unit. If the
/// two coincide the max is widened by 5K so the range is never degenerate.
pub fn scale_range(totals: &[u64]) -> ScaleRange {
    let raw_max = totals.iter().copied().max().unwrap_or(1);
    let raw_min = totals.iter().copied().min().unwrap_or(0);

    let min = round_to_unit(raw_min, false);
    let mut max = round_to_unit(raw_max, true);
    if max == min {
        max = min + 5_000;
    }

    ScaleRange { min, max }
}

/// Round to a multiple of 5, 5K, 5M or 5B, unit chosen by the value's own
/// magnitude (largest threshold checked first).
fn round_to_unit(value: u64, round_up: bool) -> u64 {
    let unit = if value >= 5_000_000_000 {
        5_000_000_000
    } else if value >= 5_000_000 {
        5_000_000
    } else if value >= 5_000 {
        5_000
    } else {
        5
    };

    if round_up {
        value.div_ceil(unit) * unit
    } else {
        value / unit * unit
    }
}
