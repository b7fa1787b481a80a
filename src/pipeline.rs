//! The shared analysis pipeline used by every CLI front-end.
//!
//! Keeping the sequence in one place means `analyze` and `summarize`
//! only differ in what they do with the results:
//! read -> classify -> rate -> clean -> partition -> summarize

use std::path::Path;

use tracing::info;

use crate::aggregate::{assign_retest_rates, clean};
use crate::classify::classify_records;
use crate::error::Result;
use crate::ingest::{SheetConfig, read_records};
use crate::output::dump_stage;
use crate::record::TestRecord;
use crate::summary::{SummaryReport, partition_by_program, summary_report};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Cleaned records, in input order.
    pub records: Vec<TestRecord>,
    /// Cleaned records partitioned by final-test program.
    pub groups: Vec<(String, Vec<TestRecord>)>,
    /// Per-program statistics.
    pub report: SummaryReport,
}

/// Executes the full pipeline over one worksheet.
///
/// When `stage_dir` is set, a CSV snapshot of the record set is written
/// after each transformation stage (`raw`, `classified`, `rated`).
pub fn run_analysis(
    path: &Path,
    config: &SheetConfig,
    stage_dir: Option<&Path>,
) -> Result<AnalysisOutput> {
    let mut records = read_records(path, config)?;
    if let Some(dir) = stage_dir {
        dump_stage(dir, "raw", &records)?;
    }

    classify_records(&mut records);
    if let Some(dir) = stage_dir {
        dump_stage(dir, "classified", &records)?;
    }

    assign_retest_rates(&mut records);
    if let Some(dir) = stage_dir {
        dump_stage(dir, "rated", &records)?;
    }

    let cleaned = clean(records);
    let groups = partition_by_program(&cleaned);
    let report = summary_report(&path.display().to_string(), &groups);

    info!(
        records = cleaned.len(),
        programs = groups.len(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        records: cleaned,
        groups,
        report,
    })
}
