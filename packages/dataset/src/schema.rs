//! Dataset layout configuration.
//!
//! A [`DatasetSchema`] tells the loader which header names identify each
//! attribute, which field delimiter to use, and which date/time formats to
//! try. The default schema is embedded from `schema/default.toml` and accepts
//! both the English attribute names and the Portuguese headers of the
//! published dataset.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::LoadError;

/// Default schema TOML baked into the binary.
const DEFAULT_SCHEMA_TOML: &str = include_str!("../schema/default.toml");

static DEFAULT_SCHEMA: LazyLock<DatasetSchema> = LazyLock::new(|| {
    DatasetSchema::from_toml(DEFAULT_SCHEMA_TOML).expect("embedded dataset schema is valid")
});

/// An attribute the loader must find a header for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DatasetField {
    /// Date of the occurrence.
    OccurrenceDate,
    /// Time of day of the occurrence.
    OccurrenceTime,
    /// Municipality.
    Municipality,
    /// Neighborhood.
    Neighborhood,
    /// Street.
    Street,
    /// Incident type.
    IncidentType,
    /// Location type.
    LocationType,
}

impl DatasetField {
    /// Returns all variants of this enum, in record field order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::OccurrenceDate,
            Self::OccurrenceTime,
            Self::Municipality,
            Self::Neighborhood,
            Self::Street,
            Self::IncidentType,
            Self::LocationType,
        ]
    }
}

/// Accepted header names for each attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderAliases {
    pub occurrence_date: Vec<String>,
    pub occurrence_time: Vec<String>,
    pub municipality: Vec<String>,
    pub neighborhood: Vec<String>,
    pub street: Vec<String>,
    pub incident_type: Vec<String>,
    pub location_type: Vec<String>,
}

impl HeaderAliases {
    /// Returns the aliases configured for `field`.
    #[must_use]
    pub fn for_field(&self, field: DatasetField) -> &[String] {
        match field {
            DatasetField::OccurrenceDate => &self.occurrence_date,
            DatasetField::OccurrenceTime => &self.occurrence_time,
            DatasetField::Municipality => &self.municipality,
            DatasetField::Neighborhood => &self.neighborhood,
            DatasetField::Street => &self.street,
            DatasetField::IncidentType => &self.incident_type,
            DatasetField::LocationType => &self.location_type,
        }
    }
}

/// Layout of the incident CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Single-character field delimiter.
    pub delimiter: String,
    /// `chrono` formats tried in order for the occurrence date.
    pub date_formats: Vec<String>,
    /// `chrono` format for the occurrence time.
    pub time_format: String,
    /// Header aliases per attribute.
    pub headers: HeaderAliases,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        DEFAULT_SCHEMA.clone()
    }
}

impl DatasetSchema {
    /// Parses a schema from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Schema`] if the TOML is malformed, is missing
    /// fields, or declares a delimiter that is not a single byte.
    pub fn from_toml(toml_str: &str) -> Result<Self, LoadError> {
        let schema: Self = toml::de::from_str(toml_str).map_err(|e| LoadError::Schema {
            message: e.to_string(),
        })?;
        schema.delimiter_byte()?;
        Ok(schema)
    }

    /// Reads and parses a schema TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if the file does not exist, or any
    /// error from [`Self::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded dataset schema from {}", path.display());
        Self::from_toml(&contents)
    }

    /// Returns the delimiter as a byte for the CSV reader.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Schema`] if the delimiter is not exactly one
    /// ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8, LoadError> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(LoadError::Schema {
                message: format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ),
            }),
        }
    }

    /// Finds the index of the first header matching one of `field`'s
    /// aliases.
    #[must_use]
    pub fn find_header(&self, field: DatasetField, headers: &[String]) -> Option<usize> {
        let aliases: Vec<String> = self
            .headers
            .for_field(field)
            .iter()
            .map(|alias| normalize_header(alias))
            .collect();

        headers
            .iter()
            .position(|header| aliases.contains(&normalize_header(header)))
    }
}

/// Trims, drops a UTF-8 byte order mark, and lowercases a header name.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
