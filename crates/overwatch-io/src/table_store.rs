//! Reference tables persisted as a single CSV file.
//!
//! ```csv
//! distance_km,ia,ib,ic,fault_type
//! 0.01,4521.7,0.0,0.0,1
//! ...
//! ```
//!
//! `fault_type` is the integer tag (1 = SLG, 2 = LL, 3 = 3PH). Rows of the same
//! tag form one table and must appear in ascending distance order. Loading is
//! strict: a missing file, a foreign header, an unknown tag, a current that is
//! negative or not finite, an empty table or an out-of-order row all fail
//! instead of producing a partial table set.

use anyhow::{Context, Result};
use overwatch_algo::{ReferenceTable, ReferenceTables, TableRow};
use overwatch_core::{FaultType, OverwatchError, PhaseCurrents};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column order of the table file.
pub const TABLE_HEADER: [&str; 5] = ["distance_km", "ia", "ib", "ic", "fault_type"];

/// Structural problems in a table file.
#[derive(Error, Debug, PartialEq)]
pub enum TableFormatError {
    #[error("unexpected header {found:?}; expected {}", TABLE_HEADER.join(","))]
    Header { found: Vec<String> },

    #[error("line {line}: unknown fault type tag {tag}")]
    UnknownTag { line: usize, tag: u8 },

    #[error("line {line}: {fault_type} current {value} is negative or not finite")]
    InvalidCurrent {
        line: usize,
        fault_type: FaultType,
        value: f64,
    },

    #[error("no rows for the {0} table")]
    EmptyTable(FaultType),

    #[error("line {line}: {fault_type} row at {distance_km} km is not after the previous row")]
    NotAscending {
        line: usize,
        fault_type: FaultType,
        distance_km: f64,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    distance_km: f64,
    ia: f64,
    ib: f64,
    ic: f64,
    fault_type: u8,
}

/// Write all three tables, SLG first, each in ascending distance order.
pub fn save_reference_tables(tables: &ReferenceTables, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating reference table file: {}", path.display()))?;

    for table in tables.iter() {
        let tag = table.fault_type().tag();
        for row in table.rows() {
            writer
                .serialize(TableRecord {
                    distance_km: row.distance_km,
                    ia: row.currents.ia,
                    ib: row.currents.ib,
                    ic: row.currents.ic,
                    fault_type: tag,
                })
                .with_context(|| format!("writing reference table row to {}", path.display()))?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("flushing reference table file: {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = tables.total_rows(),
        "saved reference tables"
    );
    Ok(())
}

/// Load and validate the three tables from `path`.
///
/// An absent file is reported as [`OverwatchError::MissingTable`] so callers
/// can tell "never built" apart from "corrupt".
pub fn load_reference_tables(path: impl AsRef<Path>) -> Result<ReferenceTables> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(OverwatchError::MissingTable(format!(
            "no reference table file at {}; run `overwatch table build` first",
            path.display()
        ))
        .into());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening reference table file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?;
    if headers.iter().map(str::trim).ne(TABLE_HEADER) {
        return Err(TableFormatError::Header {
            found: headers.iter().map(str::to_string).collect(),
        })
        .with_context(|| format!("loading reference tables from {}", path.display()));
    }

    let mut partitions: [Vec<TableRow>; 3] = Default::default();
    for (index, record) in reader.deserialize::<TableRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = record
            .with_context(|| format!("{}: malformed row on line {line}", path.display()))?;

        let fault_type = FaultType::from_tag(record.fault_type)
            .map_err(|_| TableFormatError::UnknownTag {
                line,
                tag: record.fault_type,
            })
            .with_context(|| format!("loading reference tables from {}", path.display()))?;

        if let Some(value) = [record.ia, record.ib, record.ic]
            .into_iter()
            .find(|a| !a.is_finite() || *a < 0.0)
        {
            return Err(TableFormatError::InvalidCurrent {
                line,
                fault_type,
                value,
            })
            .with_context(|| format!("loading reference tables from {}", path.display()));
        }

        let rows = &mut partitions[usize::from(fault_type.tag() - 1)];
        if let Some(previous) = rows.last() {
            if record.distance_km <= previous.distance_km {
                return Err(TableFormatError::NotAscending {
                    line,
                    fault_type,
                    distance_km: record.distance_km,
                })
                .with_context(|| format!("loading reference tables from {}", path.display()));
            }
        }
        rows.push(TableRow {
            distance_km: record.distance_km,
            currents: PhaseCurrents::new(record.ia, record.ib, record.ic),
        });
    }

    let finish = |fault_type: FaultType, rows: Vec<TableRow>| -> Result<ReferenceTable> {
        if rows.is_empty() {
            return Err(TableFormatError::EmptyTable(fault_type))
                .with_context(|| format!("loading reference tables from {}", path.display()));
        }
        debug!(%fault_type, rows = rows.len(), "loaded reference table");
        Ok(ReferenceTable::from_rows(fault_type, rows)?)
    };

    let [slg, ll, three] = partitions;
    Ok(ReferenceTables::new(
        finish(FaultType::SingleLineToGround, slg)?,
        finish(FaultType::LineToLine, ll)?,
        finish(FaultType::ThreePhase, three)?,
    )?)
}
