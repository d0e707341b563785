//! Stacked-bar terminal chart for hourly token usage.
//!
//! A chart is rendered in one top-to-bottom, left-to-right pass over a fixed
//! character grid: two day-label header lines, the chart body with a 5-char
//! Y-axis gutter, the X-axis rule, and optional vertical hour ticks. The
//! render is a pure function of its inputs; identical inputs produce
//! byte-identical output.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::format::{format_axis_value, format_total_value};
use crate::layout::{self, Category, ChartColumn};
use crate::models::{ChartKind, TokenBreakdown};
use crate::scale;
use crate::series::{self, ChartError, MAX_COLUMNS};

const ANSI_CYAN: &str = "\x1b[38;5;51m";
const ANSI_GREEN: &str = "\x1b[38;5;46m";
const ANSI_ORANGE: &str = "\x1b[38;5;214m";
const ANSI_RESET: &str = "\x1b[0m";

const SEPARATOR: char = '|';
const AXIS_RULE: char = '─';
const AXIS_JUNCTION: char = '┴';
const AXIS_CORNER: char = '└';

/// Width of the Y-axis gutter: 5-char value, a space, and the axis bar.
const GUTTER: usize = 7;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Hours that get a vertical tick label on the X-axis.
const TICK_HOURS: [u32; 3] = [6, 12, 18];

/// Stacked-bar chart over a sparse hourly usage series.
pub struct StackedBarChart<'a> {
    series: &'a HashMap<NaiveDateTime, TokenBreakdown>,
    kind: ChartKind,
    days_back: i64,
    height: usize,
    show_x_axis: bool,
}

impl<'a> StackedBarChart<'a> {
    pub fn new(series: &'a HashMap<NaiveDateTime, TokenBreakdown>, kind: ChartKind) -> Self {
        Self {
            series,
            kind,
            days_back: 7,
            height: 29,
            show_x_axis: true,
        }
    }

    pub fn with_days_back(mut self, days_back: i64) -> Self {
        self.days_back = days_back;
        self
    }

    pub fn with_height(mut self, height: usize) -> Self {
        // One row cannot carry both the top and bottom of the scale.
        self.height = height.max(2);
        self
    }

    /// When several charts stack vertically sharing one X-axis, only the
    /// bottom chart shows the tick labels and the trailing summary.
    pub fn with_x_axis(mut self, show: bool) -> Self {
        self.show_x_axis = show;
        self
    }

    /// Render the chart to a block of text lines.
    pub fn render(&self) -> Result<String, ChartError> {
        let dense = series::normalize(self.series, self.days_back, self.kind)?;
        let range = scale::scale_range(&dense.totals);
        let layout = layout::build(&dense, range, self.height);
        let width = layout.width();

        let mut out = String::new();

        if dense.is_downsampled() {
            let _ = writeln!(
                out,
                "Note: Adjusting interval to ~{:.1} hours to fit in {} columns.",
                dense.hours_per_column, MAX_COLUMNS
            );
        }

        self.push_title(&mut out);
        let _ = writeln!(out, "{}", "=".repeat(width + 10));

        let (weekday_line, date_line) = day_header_lines(&layout.day_totals);
        out.push_str(&weekday_line);
        out.push('\n');
        out.push_str(&date_line);
        out.push('\n');

        for row in (0..self.height).rev() {
            let y_val = range.min as f64
                + range.span() as f64 * row as f64 / (self.height - 1) as f64;
            let _ = write!(out, "{} |", format_axis_value(y_val));
            for column in &layout.columns {
                match *column {
                    ChartColumn::Separator => out.push(SEPARATOR),
                    ChartColumn::Data(i) => {
                        match layout.stacks[i].category_at(row, self.kind) {
                            Some(category) => push_glyph(&mut out, category),
                            None => out.push(' '),
                        }
                    }
                }
            }
            out.push('\n');
        }

        let _ = write!(out, "{}{}", " ".repeat(GUTTER - 1), AXIS_CORNER);
        for column in &layout.columns {
            out.push(match column {
                ChartColumn::Separator => AXIS_JUNCTION,
                ChartColumn::Data(_) => AXIS_RULE,
            });
        }
        out.push('\n');

        if self.show_x_axis {
            out.push('\n');
            push_hour_labels(&mut out, &dense.times, &layout);

            let _ = writeln!(out, "\n{}", "=".repeat(width + 10));
            let _ = writeln!(
                out,
                "Total time span: {} to {} | Data points: {}",
                dense.times[0].format("%Y-%m-%d %H:%M"),
                dense.times[dense.len() - 1].format("%Y-%m-%d %H:%M"),
                dense.len()
            );
            let _ = writeln!(
                out,
                "Legend: {ANSI_CYAN}█{ANSI_RESET} Input  {ANSI_GREEN}▓{ANSI_RESET} Output  █ Cache Input  {ANSI_ORANGE}▒{ANSI_RESET} Cache Output"
            );
        }

        Ok(out)
    }

    fn push_title(&self, out: &mut String) {
        let (title, y_axis) = match self.kind {
            ChartKind::Io => (
                "Input + Output Tokens Over Time (1-hour intervals, Local Time)",
                "Y-axis: Input and Output token consumption",
            ),
            ChartKind::Cache => (
                "Cache Tokens Over Time (1-hour intervals, Local Time)",
                "Y-axis: Cache Output and Cache Input token consumption",
            ),
            ChartKind::All => (
                "Token Usage Breakdown Over Time (1-hour intervals, Local Time)",
                "Y-axis: Token consumption (all token types)",
            ),
        };
        let _ = writeln!(out, "\n{}", title);
        let _ = writeln!(out, "{}", y_axis);
        if self.show_x_axis {
            let _ = writeln!(
                out,
                "X-axis: Time (each day has 24 data points, ticks at 6-hour intervals)\n"
            );
        } else {
            out.push('\n');
        }
    }
}

fn push_glyph(out: &mut String, category: Category) {
    match category {
        Category::Input => {
            out.push_str(ANSI_CYAN);
            out.push('█');
            out.push_str(ANSI_RESET);
        }
        Category::Output => {
            out.push_str(ANSI_GREEN);
            out.push('▓');
            out.push_str(ANSI_RESET);
        }
        Category::CacheCreation => {
            out.push_str(ANSI_ORANGE);
            out.push('▒');
            out.push_str(ANSI_RESET);
        }
        // Cache reads draw in the terminal's default color.
        Category::CacheRead => out.push('█'),
    }
}

/// Build the two header lines: "<Weekday> : <total>" over " MM / DD", padded
/// so the ':' and '/' land on each day's midpoint column.
///
/// Days are placed left to right in chronological order; labels of
/// closely-spaced days may butt against each other, which is accepted.
fn day_header_lines(day_totals: &[layout::DayTotal]) -> (String, String) {
    let mut weekday_line = " ".repeat(GUTTER);
    let mut date_line = " ".repeat(GUTTER);
    let mut prev_end = 0isize;

    for day in day_totals {
        let weekday = WEEKDAYS[day.start.weekday().num_days_from_monday() as usize];
        let mut weekday_total = format!("{} : {}", weekday, format_total_value(day.total));
        let mut date_str = format!(" {:02} / {:02}", day.start.month(), day.start.day());

        // Pad the shorter prefix so ':' and '/' share a relative position.
        let mut colon_idx = weekday_total.find(':').unwrap_or(0);
        let slash_idx = date_str.find('/').unwrap_or(0);
        if colon_idx > slash_idx {
            date_str = format!("{}{}", " ".repeat(colon_idx - slash_idx), date_str);
        } else if slash_idx > colon_idx {
            weekday_total = format!("{}{}", " ".repeat(slash_idx - colon_idx), weekday_total);
            colon_idx = slash_idx;
        }

        let max_len = weekday_total.len().max(date_str.len());
        let weekday_total = format!("{:<max_len$}", weekday_total);
        let date_str = format!("{:<max_len$}", date_str);

        let start_pos = day.mid_col as isize - colon_idx as isize;
        let padding = start_pos - prev_end;
        if padding > 0 {
            weekday_line.push_str(&" ".repeat(padding as usize));
            date_line.push_str(&" ".repeat(padding as usize));
        }

        weekday_line.push_str(&weekday_total);
        date_line.push_str(&date_str);
        prev_end = start_pos + max_len as isize;
    }

    (weekday_line, date_line)
}

/// Vertical hour labels under columns whose bucket starts at 06, 12 or 18,
/// one character of the label per output line.
fn push_hour_labels(out: &mut String, times: &[NaiveDateTime], layout: &layout::ChartLayout) {
    let labels: Vec<(String, usize)> = times
        .iter()
        .enumerate()
        .filter(|(_, t)| TICK_HOURS.contains(&t.hour()))
        .map(|(i, t)| (format!("{:02}", t.hour()), layout.data_to_col[i]))
        .collect();

    let max_label_len = labels.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    for char_idx in 0..max_label_len {
        out.push_str(&" ".repeat(GUTTER));
        for (col_idx, column) in layout.columns.iter().enumerate() {
            match column {
                ChartColumn::Separator => out.push(SEPARATOR),
                ChartColumn::Data(_) => {
                    let ch = labels
                        .iter()
                        .find(|(label, pos)| *pos == col_idx && char_idx < label.len())
                        .map(|(label, _)| label.as_bytes()[char_idx] as char)
                        .unwrap_or(' ');
                    out.push(ch);
                }
            }
        }
        out.push('\n');
    }
}
