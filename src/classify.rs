//! Station classification.
//!
//! The yield control table records every final-test pass under the generic
//! station label `FT`; the program number that distinguishes FT1 from FT2
//! is only present inside the free-text program name (e.g. `QAL642E_f2_rev3`).
//! Classification folds that number back into the station label so the rest
//! of the pipeline can group by it.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::RawRecord;

static PROGRAM_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"f(\d+)").unwrap());

/// Canonicalizes a raw station label.
///
/// A bare `FT` becomes `FT<n>` when the program name carries an `f<n>`
/// code; every other label (retest passes `R<n>`, the `Total` marker,
/// already-canonical `FT<n>`, anything else) is returned verbatim.
/// Absence of a code is a valid outcome, not an error.
pub fn classify(raw_station: &str, program_name: &str) -> String {
    if raw_station == "FT" {
        if let Some(caps) = PROGRAM_CODE.captures(program_name) {
            return format!("FT{}", &caps[1]);
        }
    }
    raw_station.to_string()
}

/// Applies [`classify`] in place to every record that has both a station
/// and a program name. Rows missing either are left untouched; they are
/// dropped later by the completeness filter.
pub fn classify_records(records: &mut [RawRecord]) {
    for rec in records.iter_mut() {
        if let (Some(station), Some(program)) = (&rec.station, &rec.program_name) {
            rec.station = Some(classify(station, program));
        }
    }
}
