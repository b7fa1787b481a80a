//! Row types for the yield pipeline.
//!
//! A [`RawRecord`] is a worksheet row as ingested: every field may be
//! absent, either because the cell was empty or because its value could
//! not be coerced. A [`TestRecord`] is a fully-determined row; the strict
//! completeness filter is the conversion between the two.

use serde::Serialize;

/// One worksheet row as read from the yield control table.
///
/// Input order is preserved end to end; it encodes the run boundaries
/// the retest-rate scan depends on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRecord {
    pub lot_id: Option<String>,
    pub station: Option<String>,
    pub program_name: Option<String>,
    pub first_pass_yield: Option<f64>,
    pub overall_yield: Option<f64>,
    /// Populated by the retest-rate scan for rows inside a closed run.
    pub retest_rate: Option<u32>,
}

/// A cleaned row: every field determined, retest rate included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    pub lot_id: String,
    pub station: String,
    pub program_name: String,
    pub first_pass_yield: f64,
    pub overall_yield: f64,
    pub retest_rate: u32,
}

impl RawRecord {
    /// Converts to a [`TestRecord`] if every field is present.
    pub fn into_complete(self) -> Option<TestRecord> {
        Some(TestRecord {
            lot_id: self.lot_id?,
            station: self.station?,
            program_name: self.program_name?,
            first_pass_yield: self.first_pass_yield?,
            overall_yield: self.overall_yield?,
            retest_rate: self.retest_rate?,
        })
    }

    /// True when any field is still absent.
    pub fn is_incomplete(&self) -> bool {
        self.lot_id.is_none()
            || self.station.is_none()
            || self.program_name.is_none()
            || self.first_pass_yield.is_none()
            || self.overall_yield.is_none()
            || self.retest_rate.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> RawRecord {
        RawRecord {
            lot_id: Some("L001".to_string()),
            station: Some("FT1".to_string()),
            program_name: Some("qal642e_f1".to_string()),
            first_pass_yield: Some(0.97),
            overall_yield: Some(0.99),
            retest_rate: Some(2),
        }
    }

    #[test]
    fn test_into_complete_with_all_fields() {
        let rec = full_record().into_complete().unwrap();
        assert_eq!(rec.lot_id, "L001");
        assert_eq!(rec.station, "FT1");
        assert_eq!(rec.retest_rate, 2);
    }

    #[test]
    fn test_into_complete_drops_missing_yield() {
        let mut rec = full_record();
        rec.overall_yield = None;
        assert!(rec.into_complete().is_none());
    }

    #[test]
    fn test_into_complete_drops_missing_retest_rate() {
        let mut rec = full_record();
        rec.retest_rate = None;
        assert!(rec.is_incomplete());
        assert!(rec.into_complete().is_none());
    }
}
