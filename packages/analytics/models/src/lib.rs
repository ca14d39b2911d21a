#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query criteria and result types for the crime dashboard.
//!
//! [`Criteria`] describes which rows a query looks at. The remaining types
//! are what the query engine hands back to the presentation layer: value
//! counts for bar charts, time-of-day counts for line charts, and the
//! per-page bundles that group them.

use std::collections::BTreeMap;

use crime_dashboard_incident_models::IncidentColumn;
use serde::{Deserialize, Deserializer, Serialize};

/// Exact-match constraints on categorical columns, combined with AND.
///
/// Values are stored normalized (trimmed, incident-type prefix removed).
/// Blank values are never stored, so "no constraint" and "empty selection"
/// are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<IncidentColumn, String>);

impl<'de> Deserialize<'de> for Criteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<IncidentColumn, String>::deserialize(deserializer)?;
        let mut criteria = Self::new();
        for (column, value) in &raw {
            criteria.set(*column, Some(value.as_str()));
        }
        Ok(criteria)
    }
}

impl Criteria {
    /// Criteria with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint. Blank values are ignored.
    #[must_use]
    pub fn with(mut self, column: IncidentColumn, value: &str) -> Self {
        self.set(column, Some(value));
        self
    }

    /// Adds a constraint if `value` is present and not blank.
    #[must_use]
    pub fn with_opt(mut self, column: IncidentColumn, value: Option<&str>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets or clears the constraint on `column`.
    pub fn set(&mut self, column: IncidentColumn, value: Option<&str>) {
        match value.and_then(|v| column.normalize(v)) {
            Some(normalized) => {
                self.0.insert(column, normalized.to_string());
            }
            None => {
                self.0.remove(&column);
            }
        }
    }

    /// The constrained value for `column`, if any.
    #[must_use]
    pub fn get(&self, column: IncidentColumn) -> Option<&str> {
        self.0.get(&column).map(String::as_str)
    }

    /// Whether `column` is constrained.
    #[must_use]
    pub fn contains(&self, column: IncidentColumn) -> bool {
        self.0.contains_key(&column)
    }

    /// Whether there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of constrained columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates constraints in column order.
    pub fn iter(&self) -> impl Iterator<Item = (IncidentColumn, &str)> {
        self.0.iter().map(|(column, value)| (*column, value.as_str()))
    }

    /// Combines two constraint sets.
    ///
    /// Returns `None` when both constrain the same column to different
    /// values, since no row can satisfy both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        let mut merged = self.0.clone();
        for (column, value) in &other.0 {
            match merged.get(column) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    merged.insert(*column, value.clone());
                }
            }
        }
        Some(Self(merged))
    }

    /// Whether every column that `column` is scoped under is constrained.
    #[must_use]
    pub fn pins_scope_of(&self, column: IncidentColumn) -> bool {
        column
            .enclosing_scope()
            .iter()
            .all(|enclosing| self.contains(*enclosing))
    }

    /// Whether every scoped constraint also constrains its enclosing
    /// columns. A neighborhood without a municipality is incomplete.
    #[must_use]
    pub fn is_scope_complete(&self) -> bool {
        self.0.keys().all(|column| self.pins_scope_of(*column))
    }
}

/// Occurrence count for one value of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueCount {
    /// The column value.
    pub value: String,
    /// Number of matching records.
    pub count: u64,
    /// Enclosing scope values when the query did not pin them, outermost
    /// first (e.g. the municipality of a neighborhood).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub within: Vec<String>,
}

impl ValueCount {
    /// Display label, qualified with its enclosing scope when present.
    #[must_use]
    pub fn label(&self) -> String {
        if self.within.is_empty() {
            self.value.clone()
        } else {
            format!("{} ({})", self.value, self.within.join(" / "))
        }
    }
}

/// Occurrence count for one time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayCount {
    /// Time of day as `HH:MM:SS`.
    pub time: String,
    /// Number of matching records.
    pub count: u64,
}

/// Selections on the overview page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewFilters {
    /// Municipality to narrow to.
    pub municipality: Option<String>,
    /// Incident type to narrow to.
    pub incident_type: Option<String>,
    /// Location type to narrow to.
    pub location_type: Option<String>,
}

impl OverviewFilters {
    /// Converts the selections into query criteria.
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        Criteria::new()
            .with_opt(IncidentColumn::Municipality, self.municipality.as_deref())
            .with_opt(IncidentColumn::IncidentType, self.incident_type.as_deref())
            .with_opt(IncidentColumn::LocationType, self.location_type.as_deref())
    }
}

/// Chart data for the overview page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCharts {
    /// Records matching the filters.
    pub matched: u64,
    /// Top neighborhoods by incident count.
    pub top_neighborhoods: Vec<ValueCount>,
    /// Incidents per time of day.
    pub time_of_day: Vec<TimeOfDayCount>,
    /// Full incident type distribution.
    pub incident_types: Vec<ValueCount>,
    /// Full location type distribution.
    pub location_types: Vec<ValueCount>,
}

/// Dropdown choices for the overview page, without the "no filter" entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewOptions {
    /// Every municipality in the dataset.
    pub municipalities: Vec<String>,
    /// Every incident type, without category prefixes.
    pub incident_types: Vec<String>,
    /// Every location type.
    pub location_types: Vec<String>,
}

/// Selections on the streets page.
///
/// Municipality and neighborhood are required before any chart is drawn;
/// incident type and location type are optional refinements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetFilters {
    /// Municipality the neighborhood belongs to.
    pub municipality: Option<String>,
    /// Neighborhood to chart streets for.
    pub neighborhood: Option<String>,
    /// Incident type to narrow to.
    pub incident_type: Option<String>,
    /// Location type to narrow to.
    pub location_type: Option<String>,
}

impl StreetFilters {
    /// Converts the selections into query criteria.
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        Criteria::new()
            .with_opt(IncidentColumn::Municipality, self.municipality.as_deref())
            .with_opt(IncidentColumn::Neighborhood, self.neighborhood.as_deref())
            .with_opt(IncidentColumn::IncidentType, self.incident_type.as_deref())
            .with_opt(IncidentColumn::LocationType, self.location_type.as_deref())
    }
}

/// Chart data for the streets page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetCharts {
    /// Records matching the filters.
    pub matched: u64,
    /// Top streets in the neighborhood by incident count.
    pub top_streets: Vec<ValueCount>,
    /// Incidents per time of day in the neighborhood.
    pub time_of_day: Vec<TimeOfDayCount>,
}

/// Cascading dropdown choices for the streets page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetOptions {
    /// Neighborhoods of the chosen municipality.
    pub neighborhoods: Vec<String>,
    /// Incident types seen in the chosen neighborhood.
    pub incident_types: Vec<String>,
    /// Location types seen in the chosen neighborhood.
    pub location_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_not_constraints() {
        let criteria = Criteria::new()
            .with(IncidentColumn::Municipality, "  ")
            .with_opt(IncidentColumn::LocationType, None)
            .with_opt(IncidentColumn::IncidentType, Some(""));
        assert!(criteria.is_empty());
    }

    #[test]
    fn stores_normalized_incident_type() {
        let criteria = Criteria::new().with(
            IncidentColumn::IncidentType,
            " CRIMES AGAINST PROPERTY: THEFT ",
        );
        assert_eq!(criteria.get(IncidentColumn::IncidentType), Some("THEFT"));
    }

    #[test]
    fn set_none_clears_constraint() {
        let mut criteria = Criteria::new().with(IncidentColumn::Municipality, "MunA");
        criteria.set(IncidentColumn::Municipality, None);
        assert!(!criteria.contains(IncidentColumn::Municipality));
    }

    #[test]
    fn merge_unions_compatible_constraints() {
        let a = Criteria::new().with(IncidentColumn::Municipality, "MunA");
        let b = Criteria::new()
            .with(IncidentColumn::Municipality, "MunA")
            .with(IncidentColumn::LocationType, "STREET");
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged, b.merge(&a).unwrap());
    }

    #[test]
    fn merge_detects_conflicts() {
        let a = Criteria::new().with(IncidentColumn::Municipality, "MunA");
        let b = Criteria::new().with(IncidentColumn::Municipality, "MunB");
        assert!(a.merge(&b).is_none());
    }

    #[test]
    fn scope_completeness() {
        let neighborhood_only = Criteria::new().with(IncidentColumn::Neighborhood, "BairroX");
        assert!(!neighborhood_only.is_scope_complete());

        let scoped = neighborhood_only.with(IncidentColumn::Municipality, "MunA");
        assert!(scoped.is_scope_complete());
        assert!(scoped.pins_scope_of(IncidentColumn::Neighborhood));
        assert!(scoped.pins_scope_of(IncidentColumn::Street));

        let municipality_only = Criteria::new().with(IncidentColumn::Municipality, "MunA");
        assert!(municipality_only.pins_scope_of(IncidentColumn::Neighborhood));
        assert!(!municipality_only.pins_scope_of(IncidentColumn::Street));

        let street_without_neighborhood = Criteria::new()
            .with(IncidentColumn::Municipality, "MunA")
            .with(IncidentColumn::Street, "RUA A");
        assert!(!street_without_neighborhood.is_scope_complete());
    }

    #[test]
    fn value_count_label_includes_scope() {
        let scoped = ValueCount {
            value: "CENTRO".to_string(),
            count: 3,
            within: vec!["VITÓRIA".to_string()],
        };
        assert_eq!(scoped.label(), "CENTRO (VITÓRIA)");

        let plain = ValueCount {
            value: "ROUBO".to_string(),
            count: 1,
            within: Vec::new(),
        };
        assert_eq!(plain.label(), "ROUBO");
    }

    #[test]
    fn criteria_serializes_as_column_map() {
        let criteria = Criteria::new()
            .with(IncidentColumn::Municipality, "MunA")
            .with(IncidentColumn::IncidentType, "ROBBERY");
        let json = serde_json::to_string(&criteria).unwrap();
        assert_eq!(json, r#"{"municipality":"MunA","incident_type":"ROBBERY"}"#);
    }

    #[test]
    fn deserialized_criteria_are_normalized() {
        let criteria: Criteria = serde_json::from_str(
            r#"{"municipality":" MunA ","incident_type":"CRIMES AGAINST PROPERTY: THEFT","location_type":""}"#,
        )
        .unwrap();
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria.get(IncidentColumn::Municipality), Some("MunA"));
        assert_eq!(criteria.get(IncidentColumn::IncidentType), Some("THEFT"));
        assert!(!criteria.contains(IncidentColumn::LocationType));
    }

    #[test]
    fn overview_filters_skip_empty_selections() {
        let filters = OverviewFilters {
            municipality: Some("MunA".to_string()),
            incident_type: Some(String::new()),
            location_type: None,
        };
        let criteria = filters.criteria();
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria.get(IncidentColumn::Municipality), Some("MunA"));
    }
}
