//! Output formatting and persistence for the cleaned yield data.
//!
//! Writes the partitioned records and the summary statistics to an
//! annotated workbook, exports the cleaned set as CSV, and prints the
//! summary report as JSON. Stage snapshots are plain CSVs for debugging
//! an ingest or scan problem.

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::{RawRecord, TestRecord};
use crate::summary::SummaryReport;

/// Header row of each program-group sheet.
const GROUP_HEADERS: [&str; 6] = [
    crate::ingest::LOT_COLUMN,
    crate::ingest::STATION_COLUMN,
    crate::ingest::PROGRAM_COLUMN,
    crate::ingest::FIRST_PASS_COLUMN,
    crate::ingest::OVERALL_COLUMN,
    "RT rate",
];

/// Header row of the Summary sheet.
const SUMMARY_HEADERS: [&str; 6] = ["Station", "Lots", "Mean", "Std Dev", "Min", "Max"];

/// Writes one sheet per program group plus a Summary sheet.
///
/// Nothing touches the filesystem until every sheet has been assembled,
/// so a failed invocation leaves no partial artifact behind.
pub fn write_workbook(
    path: &Path,
    groups: &[(String, Vec<TestRecord>)],
    report: &SummaryReport,
) -> Result<()> {
    let mut workbook = Workbook::new();

    for (station, rows) in groups {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(station)?;
        for (col, title) in GROUP_HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *title)?;
        }
        for (i, rec) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, &rec.lot_id)?;
            worksheet.write_string(row, 1, &rec.station)?;
            worksheet.write_string(row, 2, &rec.program_name)?;
            worksheet.write_number(row, 3, rec.first_pass_yield)?;
            worksheet.write_number(row, 4, rec.overall_yield)?;
            worksheet.write_number(row, 5, rec.retest_rate)?;
        }
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        summary.write_string(0, col as u16, *title)?;
    }
    for (i, program) in report.programs.iter().enumerate() {
        let row = (i + 1) as u32;
        summary.write_string(row, 0, &program.station)?;
        summary.write_number(row, 1, program.lots as f64)?;
        summary.write_number(row, 2, program.mean)?;
        // A single-lot group has no sample deviation; the cell stays blank.
        if let Some(sd) = program.stddev {
            summary.write_number(row, 3, sd)?;
        }
        summary.write_number(row, 4, program.min)?;
        summary.write_number(row, 5, program.max)?;
    }

    workbook.save(path)?;
    info!(path = %path.display(), sheets = groups.len() + 1, "workbook written");
    Ok(())
}

/// Exports the cleaned record set as CSV, one row per record.
pub fn write_csv(path: &Path, records: &[TestRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for rec in records {
        writer.serialize(rec)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "CSV export written");
    Ok(())
}

/// Logs the summary report as pretty-printed JSON.
pub fn print_json(report: &SummaryReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes a per-stage CSV snapshot (`<stage>.csv` under `dir`).
pub fn dump_stage(dir: &Path, stage: &str, records: &[RawRecord]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stage}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    for rec in records {
        writer.serialize(rec)?;
    }
    writer.flush()?;
    debug!(stage, path = %path.display(), "stage snapshot written");
    Ok(())
}
