//! Workbook ingestion.
//!
//! Reads one worksheet of the yield control table into [`RawRecord`]s.
//! The table carries a banner row above the header, so a configurable
//! number of leading rows is skipped; required columns are located by
//! their header text rather than by position. Cell-level problems never
//! abort the read: an empty or unparseable cell becomes an absent field
//! and the record is dropped later during cleaning.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::{Result, YieldError};
use crate::record::RawRecord;

pub const LOT_COLUMN: &str = "Lot#";
pub const STATION_COLUMN: &str = "Station";
pub const PROGRAM_COLUMN: &str = "PGM Name";
pub const FIRST_PASS_COLUMN: &str = "First Pass Yield";
pub const OVERALL_COLUMN: &str = "Overall Yield";

/// Which worksheet to read and how many leading rows precede the header.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Worksheet name; `None` selects the first sheet in the workbook.
    pub sheet_name: Option<String>,
    /// Rows above the header row (the control table carries one banner row).
    pub skip_rows: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: None,
            skip_rows: 1,
        }
    }
}

/// Positions of the required columns within the header row.
#[derive(Debug)]
struct ColumnMap {
    lot: usize,
    station: usize,
    program: usize,
    first_pass: usize,
    overall: usize,
}

impl ColumnMap {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| YieldError::SchemaMismatch {
                    column: column.to_string(),
                    present: headers.to_vec(),
                })
        };
        Ok(Self {
            lot: find(LOT_COLUMN)?,
            station: find(STATION_COLUMN)?,
            program: find(PROGRAM_COLUMN)?,
            first_pass: find(FIRST_PASS_COLUMN)?,
            overall: find(OVERALL_COLUMN)?,
        })
    }
}

/// Reads the configured worksheet into raw records, in sheet order.
pub fn read_records(path: &Path, config: &SheetConfig) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(YieldError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let available = workbook.sheet_names();
    let sheet = match &config.sheet_name {
        Some(name) => {
            if !available.iter().any(|s| s == name) {
                return Err(YieldError::SheetNotFound {
                    name: name.clone(),
                    available,
                });
            }
            name.clone()
        }
        None => available
            .first()
            .cloned()
            .ok_or_else(|| YieldError::SheetNotFound {
                name: "<first sheet>".to_string(),
                available,
            })?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let start_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    // Row indices are absolute within the sheet: the used range may not
    // begin at the top, but skip_rows counts from it.
    let mut kept = range
        .rows()
        .enumerate()
        .filter(|(i, _)| start_row + i >= config.skip_rows)
        .map(|(_, row)| row);

    let headers: Vec<String> = match kept.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => Vec::new(),
    };
    let columns = ColumnMap::locate(&headers)?;

    let records: Vec<RawRecord> = kept
        .map(|row| RawRecord {
            lot_id: cell_string(cell(row, columns.lot)),
            station: cell_string(cell(row, columns.station)),
            program_name: cell_string(cell(row, columns.program)),
            first_pass_yield: cell_f64(cell(row, columns.first_pass)),
            overall_yield: cell_f64(cell(row, columns.overall)),
            retest_rate: None,
        })
        .collect();

    debug!(sheet = %sheet, rows = records.len(), "worksheet read");
    Ok(records)
}

/// Lists the worksheet names in a workbook.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(YieldError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names())
}

fn cell<'a>(row: &'a [Data], idx: usize) -> &'a Data {
    row.get(idx).unwrap_or(&Data::Empty)
}

/// Header text of a cell; non-text cells stringify so the schema error
/// can report what the row actually contains.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => match s.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(value = %s, "numeric cell did not parse, field left absent");
                None
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_f64_coercion() {
        assert_eq!(cell_f64(&Data::Float(0.98)), Some(0.98));
        assert_eq!(cell_f64(&Data::Int(1)), Some(1.0));
        assert_eq!(cell_f64(&Data::String(" 0.97 ".to_string())), Some(0.97));
        assert_eq!(cell_f64(&Data::String("n/a".to_string())), None);
        assert_eq!(cell_f64(&Data::Empty), None);
    }

    #[test]
    fn test_cell_string_coercion() {
        assert_eq!(
            cell_string(&Data::String(" FT ".to_string())),
            Some("FT".to_string())
        );
        assert_eq!(cell_string(&Data::String("   ".to_string())), None);
        assert_eq!(cell_string(&Data::Int(642)), Some("642".to_string()));
        assert_eq!(cell_string(&Data::Empty), None);
    }

    #[test]
    fn test_column_map_reports_missing_column() {
        let headers = vec![
            LOT_COLUMN.to_string(),
            STATION_COLUMN.to_string(),
            PROGRAM_COLUMN.to_string(),
            FIRST_PASS_COLUMN.to_string(),
        ];
        let err = ColumnMap::locate(&headers).unwrap_err();
        match err {
            YieldError::SchemaMismatch { column, present } => {
                assert_eq!(column, OVERALL_COLUMN);
                assert_eq!(present.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_map_in_any_order() {
        let headers = vec![
            OVERALL_COLUMN.to_string(),
            FIRST_PASS_COLUMN.to_string(),
            PROGRAM_COLUMN.to_string(),
            STATION_COLUMN.to_string(),
            LOT_COLUMN.to_string(),
        ];
        let map = ColumnMap::locate(&headers).unwrap();
        assert_eq!(map.lot, 4);
        assert_eq!(map.overall, 0);
    }
}
