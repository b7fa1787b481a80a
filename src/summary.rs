//! Per-program yield statistics.
//!
//! Cleaned records are partitioned by canonical final-test station and
//! each group is reduced to descriptive statistics over its overall
//! yield. The partition doubles as the output layout: every group
//! becomes one sheet of the output workbook, the statistics become the
//! Summary sheet.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::TestRecord;

/// Descriptive statistics for one final-test program group.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramSummary {
    pub station: String,
    pub lots: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1 divisor); absent for a single lot.
    pub stddev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// The summary report envelope handed to the JSON and workbook outputs.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub programs: Vec<ProgramSummary>,
}

/// Groups cleaned records by canonical station, keeping only final-test
/// groups (stations beginning with `FT`). Marker rows that survived
/// cleaning (`R<n>`, `Total`) belong to no program and are excluded.
///
/// Groups are ordered by first appearance in the record sequence; the
/// choice affects presentation only.
pub fn partition_by_program(records: &[TestRecord]) -> Vec<(String, Vec<TestRecord>)> {
    let mut groups: Vec<(String, Vec<TestRecord>)> = Vec::new();
    for rec in records {
        if !rec.station.starts_with("FT") {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| *name == rec.station) {
            Some((_, rows)) => rows.push(rec.clone()),
            None => groups.push((rec.station.clone(), vec![rec.clone()])),
        }
    }
    groups
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the sample standard deviation (N-1 divisor) given a
/// pre-computed mean. Undefined for fewer than two values.
fn sample_stddev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Reduces each program group to its overall-yield statistics.
///
/// Empty groups cannot occur (a group exists only because at least one
/// record mapped to it), so min/max are always defined.
pub fn summarize(groups: &[(String, Vec<TestRecord>)]) -> Vec<ProgramSummary> {
    groups
        .iter()
        .map(|(station, rows)| {
            let yields: Vec<f64> = rows.iter().map(|r| r.overall_yield).collect();
            let avg = mean(&yields);
            ProgramSummary {
                station: station.clone(),
                lots: yields.len(),
                mean: avg,
                stddev: sample_stddev(&yields, avg),
                min: yields.iter().copied().fold(f64::INFINITY, f64::min),
                max: yields.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}

/// Wraps the per-group statistics with the run metadata.
pub fn summary_report(source: &str, groups: &[(String, Vec<TestRecord>)]) -> SummaryReport {
    SummaryReport {
        generated_at: Utc::now(),
        source: source.to_string(),
        programs: summarize(groups),
    }
}
