//! Dropdown choices for cascading selections.

use std::collections::BTreeSet;

use crime_dashboard_analytics_models::Criteria;
use crime_dashboard_dataset::Dataset;
use crime_dashboard_incident_models::IncidentColumn;

use crate::query::filter;

/// Distinct values of `column` among the records matching `scope`, sorted
/// ascending.
///
/// Missing values are never offered. If `scope` does not pin the columns
/// that `column` is scoped under (neighborhoods without a municipality),
/// there are no valid choices yet and the result is empty. The "no filter"
/// entry is the caller's to add.
#[must_use]
pub fn options_for(dataset: &Dataset, column: IncidentColumn, scope: &Criteria) -> Vec<String> {
    if !scope.pins_scope_of(column) {
        log::debug!("No {column} options until {:?} are chosen", column.enclosing_scope());
        return Vec::new();
    }

    let view = filter(dataset, scope);
    let values: BTreeSet<&str> = view.records().filter_map(|r| r.value(column)).collect();

    values.into_iter().map(ToString::to_string).collect()
}
