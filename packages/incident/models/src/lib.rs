#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types shared across the crime dashboard.
//!
//! Every row of the robbery dataset becomes one [`IncidentRecord`]. The
//! categorical attributes that can be filtered, counted, or offered as
//! dropdown choices are enumerated by [`IncidentColumn`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category prefixes that the source data prepends to incident types.
///
/// They carry no information of their own: `"CRIMES AGAINST PROPERTY: THEFT"`
/// and `"THEFT"` are the same incident type.
pub const INCIDENT_TYPE_PREFIXES: &[&str] =
    &["CRIMES AGAINST PROPERTY: ", "CRIMES CONTRA O PATRIMÔNIO: "];

/// Strips every known category prefix from an incident type.
///
/// Prefixes are removed repeatedly until none remains, so applying this
/// twice gives the same result as applying it once.
#[must_use]
pub fn strip_incident_type_prefix(value: &str) -> &str {
    let mut rest = value;
    while let Some(stripped) = INCIDENT_TYPE_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
    {
        rest = stripped;
    }
    rest
}

/// A categorical column of the incident dataset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentColumn {
    /// Municipality where the incident occurred.
    Municipality,
    /// Neighborhood, only unique within a municipality.
    Neighborhood,
    /// Street, only unique within a (municipality, neighborhood) pair.
    Street,
    /// Incident type, compared without its category prefix.
    IncidentType,
    /// Type of location (e.g., "STREET", "HOUSE").
    LocationType,
}

impl IncidentColumn {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Municipality,
            Self::Neighborhood,
            Self::Street,
            Self::IncidentType,
            Self::LocationType,
        ]
    }

    /// Columns that must be pinned to a value before this column's values
    /// mean anything.
    #[must_use]
    pub const fn enclosing_scope(self) -> &'static [Self] {
        match self {
            Self::Neighborhood => &[Self::Municipality],
            Self::Street => &[Self::Municipality, Self::Neighborhood],
            Self::Municipality | Self::IncidentType | Self::LocationType => &[],
        }
    }

    /// Whether this column is scoped under another column.
    #[must_use]
    pub const fn is_scoped(self) -> bool {
        !self.enclosing_scope().is_empty()
    }

    /// Human-readable label for prompts and chart axes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Municipality => "Municipality",
            Self::Neighborhood => "Neighborhood",
            Self::Street => "Street",
            Self::IncidentType => "Incident type",
            Self::LocationType => "Location type",
        }
    }

    /// Normalizes a user-supplied value for this column the same way
    /// [`IncidentRecord::value`] normalizes stored values.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn normalize(self, value: &str) -> Option<&str> {
        let trimmed = value.trim();
        let logical = match self {
            Self::IncidentType => strip_incident_type_prefix(trimmed),
            _ => trimmed,
        };
        (!logical.is_empty()).then_some(logical)
    }
}

/// One reported robbery occurrence.
///
/// Categorical fields are trimmed and `None` when the source cell is empty.
/// Date and time are parsed independently; either may be `None` when the
/// source value is missing or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Calendar date of the occurrence.
    pub occurrence_date: Option<NaiveDate>,
    /// Time of day of the occurrence.
    pub occurrence_time: Option<NaiveTime>,
    /// Municipality name.
    pub municipality: Option<String>,
    /// Neighborhood name (scoped under municipality).
    pub neighborhood: Option<String>,
    /// Street name (scoped under municipality and neighborhood).
    pub street: Option<String>,
    /// Incident type as it appears in the source, prefix included.
    pub incident_type: Option<String>,
    /// Location type.
    pub location_type: Option<String>,
}

impl IncidentRecord {
    /// Returns the stored value of a categorical column, exactly as loaded.
    #[must_use]
    pub fn raw(&self, column: IncidentColumn) -> Option<&str> {
        match column {
            IncidentColumn::Municipality => self.municipality.as_deref(),
            IncidentColumn::Neighborhood => self.neighborhood.as_deref(),
            IncidentColumn::Street => self.street.as_deref(),
            IncidentColumn::IncidentType => self.incident_type.as_deref(),
            IncidentColumn::LocationType => self.location_type.as_deref(),
        }
    }

    /// Returns the logical value of a categorical column.
    ///
    /// Incident types come back without their category prefix. A value that
    /// is empty after normalization is treated as missing.
    #[must_use]
    pub fn value(&self, column: IncidentColumn) -> Option<&str> {
        self.raw(column).and_then(|v| column.normalize(v))
    }

    /// Formats the occurrence time as `HH:MM:SS`.
    #[must_use]
    pub fn occurrence_time_label(&self) -> Option<String> {
        self.occurrence_time
            .map(|t| t.format("%H:%M:%S").to_string())
    }
}
