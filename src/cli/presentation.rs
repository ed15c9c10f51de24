//! CLI presentation: text and json formatters per command.

use crate::cli::parse::Collection;
use crate::query::{resolve_present, AggregationResult};
use crate::service::{ListResponse, QuerySubmission};
use chrono::{DateTime, SecondsFormat};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_list_text(collection: Collection, response: &ListResponse) -> String {
    if response.records.is_empty() {
        return format!(
            "No {} found ({} visible match(es)).",
            collection.name(),
            response.meta.total
        );
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    match collection {
        Collection::Contexts => {
            table.set_header(vec!["ID", "Name", "Status", "Started", "Duration"]);
            for doc in &response.records {
                table.add_row(vec![
                    text_at(doc, "id"),
                    text_at(doc, "name"),
                    text_at(doc, "status"),
                    timestamp_at(doc, "timeStarted"),
                    resolve_present(doc, "duration")
                        .and_then(Value::as_i64)
                        .map(format_duration_ms)
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
        }
        Collection::Events => {
            table.set_header(vec!["ID", "Name", "Time", "Context"]);
            for doc in &response.records {
                table.add_row(vec![
                    text_at(doc, "id"),
                    text_at(doc, "name"),
                    timestamp_at(doc, "time"),
                    text_at(doc, "contextId"),
                ]);
            }
        }
    }

    let mut output = format!("{}\n", table);
    output.push_str(&format!(
        "Showing {} of {} {}\n",
        response.records.len(),
        response.meta.total,
        collection.name()
    ));
    let pages = &response.links.pages;
    for (label, link) in [("prev", &pages.prev), ("next", &pages.next), ("last", &pages.last)] {
        if let Some(link) = link {
            output.push_str(&format!("  {}: {}\n", label, link));
        }
    }
    output
}

pub fn format_submission_text(submission: &QuerySubmission) -> String {
    format!("Query id: {}", submission.query_id)
}

pub fn format_aggregation_text(result: &AggregationResult) -> String {
    match result {
        AggregationResult::Sum(sum) => format!("sum: {}", sum),
        AggregationResult::Avg(Some(avg)) => format!("avg: {}", avg),
        AggregationResult::Avg(None) => "avg: undefined (no visible records)".to_string(),
        AggregationResult::Count(count) => format!("count: {}", count),
    }
}

pub fn format_load_summary(collection: Collection, loaded: usize) -> String {
    format!("Loaded {} record(s) into {}", loaded, collection.name())
}

fn text_at(doc: &Value, path: &str) -> String {
    match resolve_present(doc, path) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

fn timestamp_at(doc: &Value, path: &str) -> String {
    resolve_present(doc, path)
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| text_at(doc, path))
}

/// Milliseconds as `1h 02m 03s`, `3m 00s` or `12.345s`.
fn format_duration_ms(ms: i64) -> String {
    let seconds = ms / 1000;
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, secs)
    } else {
        format!("{}.{:03}s", secs, ms % 1000)
    }
}
