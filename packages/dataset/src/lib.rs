#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only robbery dataset.
//!
//! Loads the incident CSV once into an immutable [`Dataset`]. Headers are
//! resolved through a [`DatasetSchema`]; per-cell parse failures (bad dates,
//! bad times, empty cells) degrade to missing values instead of rejecting
//! the row. Only file-level problems surface as [`LoadError`].

pub mod global;
pub mod parsing;
pub mod progress;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use crime_dashboard_incident_models::IncidentRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parsing::{parse_categorical, parse_occurrence_date, parse_occurrence_time};
use crate::progress::{ProgressCallback, null_progress};
use crate::schema::{DatasetField, DatasetSchema};

/// How many rows to read between progress updates.
const PROGRESS_INTERVAL: u64 = 5_000;

/// Errors that prevent the dataset from loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset (or schema) file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// I/O error while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV framing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns have no matching header.
    #[error("Dataset is missing required columns: {}", missing.join(", "))]
    MissingColumns {
        /// Names of the missing attributes.
        missing: Vec<String>,
    },

    /// The dataset schema is invalid.
    #[error("Invalid dataset schema: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// The process-wide dataset has already been loaded.
    #[error("Dataset already loaded")]
    AlreadyLoaded,
}

/// Load-time statistics about a [`Dataset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Number of records.
    pub rows: u64,
    /// Records whose date was missing or unparseable.
    pub missing_dates: u64,
    /// Records whose time was missing or unparseable.
    pub missing_times: u64,
    /// Earliest parsed occurrence date.
    pub earliest_date: Option<NaiveDate>,
    /// Latest parsed occurrence date.
    pub latest_date: Option<NaiveDate>,
}

impl DatasetSummary {
    fn from_records(records: &[IncidentRecord]) -> Self {
        let mut summary = Self {
            rows: records.len() as u64,
            ..Self::default()
        };
        for record in records {
            match record.occurrence_date {
                Some(date) => {
                    summary.earliest_date =
                        Some(summary.earliest_date.map_or(date, |d| d.min(date)));
                    summary.latest_date =
                        Some(summary.latest_date.map_or(date, |d| d.max(date)));
                }
                None => summary.missing_dates += 1,
            }
            if record.occurrence_time.is_none() {
                summary.missing_times += 1;
            }
        }
        summary
    }
}

/// Immutable, in-memory table of incident records.
///
/// There is no mutation API; every query is a read over [`Self::records`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    summary: DatasetSummary,
}

impl Dataset {
    /// Builds a dataset from already-parsed records, keeping their order.
    #[must_use]
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        let summary = DatasetSummary::from_records(&records);
        Self { records, summary }
    }

    /// All records in file order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load-time statistics.
    #[must_use]
    pub const fn summary(&self) -> &DatasetSummary {
        &self.summary
    }
}

/// Loads a dataset using the default schema and no progress reporting.
///
/// # Errors
///
/// Returns [`LoadError`] if the file is missing, unreadable, or lacks a
/// required column.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    load_with_schema(path, &DatasetSchema::default(), &null_progress())
}

/// Loads a dataset from `path` using `schema`.
///
/// # Errors
///
/// Returns [`LoadError`] if the file is missing, unreadable, or lacks a
/// required column.
pub fn load_with_schema(
    path: &Path,
    schema: &DatasetSchema,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let size = file.metadata()?.len();
    progress.set_total(size);
    progress.set_message(format!("Loading {}", path.display()));
    log::info!("Loading dataset from {} ({size} bytes)", path.display());

    let dataset = from_reader(BufReader::new(file), schema, progress)?;

    progress.finish(format!(
        "Loaded {} records from {}",
        dataset.len(),
        path.display()
    ));

    Ok(dataset)
}

/// Parses a dataset from any reader producing delimited text.
///
/// # Errors
///
/// Returns [`LoadError`] if the header row cannot be read, a required
/// column is missing, or the underlying reader fails.
pub fn from_reader<R: Read>(
    reader: R,
    schema: &DatasetSchema,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(schema.delimiter_byte()?)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let columns = resolve_columns(schema, &headers)?;

    let mut records = Vec::new();
    let mut record = csv::ByteRecord::new();

    while reader.read_byte_record(&mut record)? {
        records.push(columns.parse_row(&record, schema));

        if records.len() as u64 % PROGRESS_INTERVAL == 0 {
            progress.set_position(record.position().map_or(0, csv::Position::byte));
        }
    }

    let dataset = Dataset::from_records(records);
    let summary = dataset.summary();

    log::info!(
        "Parsed {} records ({} without date, {} without time)",
        summary.rows,
        summary.missing_dates,
        summary.missing_times
    );
    if let (Some(earliest), Some(latest)) = (summary.earliest_date, summary.latest_date) {
        log::info!("Occurrence dates span {earliest} to {latest}");
    }

    Ok(dataset)
}

/// Header indices for every [`DatasetField`].
struct ColumnIndices {
    occurrence_date: usize,
    occurrence_time: usize,
    municipality: usize,
    neighborhood: usize,
    street: usize,
    incident_type: usize,
    location_type: usize,
}

impl ColumnIndices {
    fn parse_row(&self, row: &csv::ByteRecord, schema: &DatasetSchema) -> IncidentRecord {
        let cell = |idx: usize| {
            row.get(idx)
                .map(String::from_utf8_lossy)
                .unwrap_or_default()
        };

        let date_cell = cell(self.occurrence_date);
        let time_cell = cell(self.occurrence_time);
        let occurrence_date = parse_occurrence_date(&date_cell, &schema.date_formats);
        let occurrence_time = parse_occurrence_time(&time_cell, &schema.time_format);

        if occurrence_date.is_none() && !date_cell.trim().is_empty() {
            log::trace!("Unparseable occurrence date {date_cell:?}");
        }
        if occurrence_time.is_none() && !time_cell.trim().is_empty() {
            log::trace!("Unparseable occurrence time {time_cell:?}");
        }

        IncidentRecord {
            occurrence_date,
            occurrence_time,
            municipality: parse_categorical(&cell(self.municipality)),
            neighborhood: parse_categorical(&cell(self.neighborhood)),
            street: parse_categorical(&cell(self.street)),
            incident_type: parse_categorical(&cell(self.incident_type)),
            location_type: parse_categorical(&cell(self.location_type)),
        }
    }
}

/// Maps every required field to a header index, collecting all missing
/// fields into a single error.
fn resolve_columns(schema: &DatasetSchema, headers: &[String]) -> Result<ColumnIndices, LoadError> {
    let mut missing = Vec::new();
    let mut index_of = |field: DatasetField| {
        schema.find_header(field, headers).unwrap_or_else(|| {
            missing.push(field.to_string());
            0
        })
    };

    let columns = ColumnIndices {
        occurrence_date: index_of(DatasetField::OccurrenceDate),
        occurrence_time: index_of(DatasetField::OccurrenceTime),
        municipality: index_of(DatasetField::Municipality),
        neighborhood: index_of(DatasetField::Neighborhood),
        street: index_of(DatasetField::Street),
        incident_type: index_of(DatasetField::IncidentType),
        location_type: index_of(DatasetField::LocationType),
    };

    if !missing.is_empty() {
        log::warn!("Dataset headers {headers:?} are missing {missing:?}");
        return Err(LoadError::MissingColumns { missing });
    }

    Ok(columns)
}
