//! Aggregation of usage events: the hourly breakdown series feeding the
//! charts, and the per-model usage/cost table.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeZone};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Table};

use crate::format::format_number;
use crate::models::{ChartKind, TokenBreakdown, UsageEvent};
use crate::pricing::{pricing_for, SUBSCRIPTION_PRICE};
use crate::series::truncate_to_hour;

/// Bucket events into hourly `TokenBreakdown`s, keyed by the event's
/// timestamp localized with `tz` and truncated to the top of the hour.
///
/// The timezone is an explicit parameter so the whole pipeline below it stays
/// pure; callers resolve `chrono::Local` (or anything else) exactly once.
pub fn token_breakdown_series<Tz: TimeZone>(
    events: &[UsageEvent],
    tz: &Tz,
) -> HashMap<NaiveDateTime, TokenBreakdown> {
    let mut series: HashMap<NaiveDateTime, TokenBreakdown> = HashMap::new();
    for event in events {
        let local = event.timestamp.with_timezone(tz).naive_local();
        let bucket = truncate_to_hour(local);
        series.entry(bucket).or_default().add_usage(&event.usage);
    }
    series
}

/// Usage totals for one model.
#[derive(Debug, Clone)]
pub struct ModelStats {
    pub model: String,
    pub count: u64,
    pub tokens: TokenBreakdown,
}

impl ModelStats {
    pub fn io_total(&self) -> u64 {
        self.tokens.total(ChartKind::Io)
    }

    pub fn total_with_cache(&self) -> u64 {
        self.tokens.total(ChartKind::All)
    }
}

/// Per-model usage, models under 0.1% of total messages dropped, sorted by
/// input+output volume descending.
pub fn model_breakdown(events: &[UsageEvent]) -> Vec<ModelStats> {
    let mut by_model: HashMap<&str, (u64, TokenBreakdown)> = HashMap::new();
    for event in events {
        let entry = by_model.entry(&event.model).or_default();
        entry.0 += 1;
        entry.1.add_usage(&event.usage);
    }

    let total_messages: u64 = by_model.values().map(|(count, _)| count).sum();
    let threshold = total_messages as f64 * 0.001;

    let mut stats: Vec<ModelStats> = by_model
        .into_iter()
        .filter(|(_, (count, _))| *count as f64 >= threshold)
        .map(|(model, (count, tokens))| ModelStats {
            model: model.to_string(),
            count,
            tokens,
        })
        .collect();

    // Tie-break on the name so the table order is stable across runs.
    stats.sort_by(|a, b| {
        b.io_total()
            .cmp(&a.io_total())
            .then_with(|| a.model.cmp(&b.model))
    });
    stats
}

/// Render the usage/cost table plus the cost projection line.
pub fn render_model_breakdown(stats: &[ModelStats], days_in_data: i64) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        "Model",
        "Messages",
        "Input",
        "Output",
        "Total",
        "Cache Output",
        "Cache Input",
        "Cache Total",
    ]);

    let mut sum_count = 0u64;
    let mut sum = TokenBreakdown::default();
    for s in stats {
        table.add_row(row(
            &s.model,
            s.count,
            &s.tokens,
            s.io_total(),
            s.total_with_cache(),
        ));
        sum_count += s.count;
        sum.input += s.tokens.input;
        sum.output += s.tokens.output;
        sum.cache_creation += s.tokens.cache_creation;
        sum.cache_read += s.tokens.cache_read;
    }
    table.add_row(row(
        "TOTAL",
        sum_count,
        &sum,
        sum.total(ChartKind::Io),
        sum.total(ChartKind::All),
    ));

    let (input_cost, output_cost, cache_output_cost, cache_input_cost) = api_cost(stats);
    let io_cost = input_cost + output_cost;
    let total_cost = io_cost + cache_output_cost + cache_input_cost;
    table.add_row(vec![
        Cell::new("Cost(API)"),
        Cell::new(""),
        money(input_cost),
        money(output_cost),
        money(io_cost),
        money(cache_output_cost),
        money(cache_input_cost),
        money(total_cost),
    ]);

    let days = days_in_data.max(1) as f64;
    let daily_cost = total_cost / days;
    let monthly_cost = daily_cost * 30.0;
    let monthly_tokens = sum.total(ChartKind::All) as f64 / days * 30.0;
    let cost_per_mtok = if monthly_tokens > 0.0 {
        SUBSCRIPTION_PRICE / (monthly_tokens / 1_000_000.0)
    } else {
        0.0
    };

    format!(
        "Usage / Cost by Model\n{table}\nDaily: ${:.2}, Weekly: ${:.2}, Monthly(30d): ${:.2}, Monthly Saving ${:.2}, ${:.2} / MTok\n",
        daily_cost,
        daily_cost * 7.0,
        monthly_cost,
        monthly_cost - SUBSCRIPTION_PRICE,
        cost_per_mtok,
    )
}

fn row(model: &str, count: u64, tokens: &TokenBreakdown, io_total: u64, all_total: u64) -> Vec<Cell> {
    vec![
        Cell::new(model),
        right(count),
        right(tokens.input),
        right(tokens.output),
        right(io_total),
        right(tokens.cache_creation),
        right(tokens.cache_read),
        right(all_total),
    ]
}

fn right(value: u64) -> Cell {
    Cell::new(format_number(value)).set_alignment(CellAlignment::Right)
}

fn money(value: f64) -> Cell {
    Cell::new(format!("${:.2}", value)).set_alignment(CellAlignment::Right)
}

/// Total API cost split by token category, using model-specific pricing.
fn api_cost(stats: &[ModelStats]) -> (f64, f64, f64, f64) {
    let mut input = 0.0;
    let mut output = 0.0;
    let mut cache_output = 0.0;
    let mut cache_input = 0.0;
    for s in stats {
        let pricing = pricing_for(&s.model);
        input += s.tokens.input as f64 * pricing.input / 1_000_000.0;
        output += s.tokens.output as f64 * pricing.output / 1_000_000.0;
        cache_output += s.tokens.cache_creation as f64 * pricing.cache_output / 1_000_000.0;
        cache_input += s.tokens.cache_read as f64 * pricing.cache_input / 1_000_000.0;
    }
    (input, output, cache_output, cache_input)
}
