//! Retest-rate derivation.
//!
//! Each lot is tested in a "run": a final-test row (`FT*`), zero or more
//! retest rows (`R1`, `R2`, ...), and a closing `Total` row. The retest
//! rate of a run is the highest retest-pass number observed inside it, and
//! it applies to every row of the run. The scan below walks the ordered
//! rows once, carrying the two accumulators that delimit the open run.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::record::{RawRecord, TestRecord};

static RETEST_PASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^R(\d+)").unwrap());

/// Extracts the retest-pass number from a station label.
///
/// A numeral too large for `u32` is treated as a non-match rather than
/// an error; the scan must never fail on station text.
fn retest_pass_number(station: &str) -> Option<u32> {
    RETEST_PASS
        .captures(station)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Assigns a retest rate to every record that belongs to a complete run.
///
/// Single left-to-right pass:
/// - a station beginning with `FT` opens a run (abandoning any run still
///   open at that point);
/// - `R<n>` inside an open run raises the running maximum; outside any
///   run it is ignored;
/// - `Total` closes the open run and back-fills the maximum over the
///   whole span, inclusive. A `Total` with no open run is ignored.
///
/// Records of abandoned or unterminated runs keep an absent retest rate
/// and are discarded by [`clean`].
pub fn assign_retest_rates(records: &mut [RawRecord]) {
    let mut current_max: Option<u32> = None;
    let mut run_start: Option<usize> = None;

    for idx in 0..records.len() {
        let Some(station) = records[idx].station.clone() else {
            continue;
        };

        if station.starts_with("FT") {
            if let Some(start) = run_start {
                debug!(start, idx, "unterminated run abandoned");
            }
            current_max = Some(0);
            run_start = Some(idx);
        } else if let Some(r) = retest_pass_number(&station) {
            if run_start.is_some() {
                current_max = Some(current_max.map_or(r, |m| m.max(r)));
            } else {
                debug!(idx, r, "retest marker outside any run ignored");
            }
        } else if station == "Total" {
            if let Some(start) = run_start.take() {
                let rate = current_max.take().unwrap_or(0);
                for rec in &mut records[start..=idx] {
                    rec.retest_rate = Some(rate);
                }
            }
        }
        // Any other station: part of the open run, left for its Total.
    }
}

/// Strict completeness filter: only fully-determined records survive.
pub fn clean(records: Vec<RawRecord>) -> Vec<TestRecord> {
    let total = records.len();
    let cleaned: Vec<TestRecord> = records
        .into_iter()
        .filter_map(RawRecord::into_complete)
        .collect();
    debug!(total, kept = cleaned.len(), "completeness filter applied");
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(station: &str) -> RawRecord {
        RawRecord {
            lot_id: Some("L1".to_string()),
            station: Some(station.to_string()),
            program_name: Some("pgm_f1".to_string()),
            first_pass_yield: Some(0.95),
            overall_yield: Some(0.98),
            retest_rate: None,
        }
    }

    fn rates(records: &[RawRecord]) -> Vec<Option<u32>> {
        records.iter().map(|r| r.retest_rate).collect()
    }

    #[test]
    fn test_run_closure() {
        let mut records: Vec<_> = ["FT1", "R1", "R2", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![Some(2); 4]);
    }

    #[test]
    fn test_run_without_retests_rates_zero() {
        let mut records: Vec<_> = ["FT1", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_unterminated_run_yields_nothing() {
        let mut records: Vec<_> = ["FT1", "R3"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![None, None]);
        assert!(clean(records).is_empty());
    }

    #[test]
    fn test_orphan_total_is_noop() {
        let mut records: Vec<_> = ["Total", "FT1", "R1", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![None, Some(1), Some(1), Some(1)]);
    }

    #[test]
    fn test_disjoint_runs_are_isolated() {
        let mut records: Vec<_> = ["FT1", "R2", "Total", "FT2", "R5", "Total"]
            .map(record)
            .into();
        assign_retest_rates(&mut records);
        assert_eq!(
            rates(&records),
            vec![Some(2), Some(2), Some(2), Some(5), Some(5), Some(5)]
        );
    }

    #[test]
    fn test_reopened_run_abandons_previous() {
        let mut records: Vec<_> = ["FT1", "R4", "FT2", "R1", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        // The first run never closed; the second must not see R4.
        assert_eq!(
            rates(&records),
            vec![None, None, Some(1), Some(1), Some(1)]
        );
    }

    #[test]
    fn test_retest_marker_outside_run_ignored() {
        let mut records: Vec<_> = ["R3", "FT1", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![None, Some(0), Some(0)]);
    }

    #[test]
    fn test_malformed_retest_numeral_is_nonmatch() {
        // Digits beyond u32 range: treated like any other station label.
        let mut records: Vec<_> = ["FT1", "R99999999999999999999", "R1", "Total"]
            .map(record)
            .into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![Some(1); 4]);
    }

    #[test]
    fn test_other_stations_ride_along() {
        let mut records: Vec<_> = ["FT1", "QC", "Total"].map(record).into();
        assign_retest_rates(&mut records);
        assert_eq!(rates(&records), vec![Some(0); 3]);
    }

    #[test]
    fn test_missing_station_rows_stay_in_span() {
        let mut records: Vec<_> = ["FT1", "R1", "Total"].map(record).into();
        records[1].station = None;
        assign_retest_rates(&mut records);
        // The blank row cannot raise the maximum but is inside the span.
        assert_eq!(rates(&records), vec![Some(0); 3]);
    }

    #[test]
    fn test_clean_drops_incomplete_rows() {
        let mut records: Vec<_> = ["FT1", "R1", "Total", "FT2"].map(record).into();
        records[1].overall_yield = None;
        assign_retest_rates(&mut records);
        let cleaned = clean(records);
        // R1 row lost its yield, FT2 never closed; both dropped.
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|r| r.retest_rate == 1));
    }
}
