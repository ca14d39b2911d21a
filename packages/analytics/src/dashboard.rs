//! Chart data for the two dashboard pages.
//!
//! The overview page charts the whole dataset narrowed by municipality,
//! incident type, and location type. The streets page drills into a single
//! neighborhood and draws nothing until both municipality and neighborhood
//! are chosen.

use crime_dashboard_analytics_models::{
    Criteria, OverviewCharts, OverviewFilters, OverviewOptions, StreetCharts, StreetFilters,
    StreetOptions,
};
use crime_dashboard_dataset::Dataset;
use crime_dashboard_incident_models::IncidentColumn;

use crate::options::options_for;
use crate::query::{filter, frequency_by, time_series, top_n_by};

/// Number of bars in the "top N" charts.
pub const TOP_N: usize = 10;

/// Builds every overview chart for the given selections.
#[must_use]
pub fn overview(dataset: &Dataset, filters: &OverviewFilters) -> OverviewCharts {
    let view = filter(dataset, &filters.criteria());

    OverviewCharts {
        matched: view.len() as u64,
        top_neighborhoods: top_n_by(&view, IncidentColumn::Neighborhood, TOP_N),
        time_of_day: time_series(&view),
        incident_types: frequency_by(&view, IncidentColumn::IncidentType),
        location_types: frequency_by(&view, IncidentColumn::LocationType),
    }
}

/// Choices for the overview selects.
#[must_use]
pub fn overview_options(dataset: &Dataset) -> OverviewOptions {
    let all = Criteria::new();
    OverviewOptions {
        municipalities: options_for(dataset, IncidentColumn::Municipality, &all),
        incident_types: options_for(dataset, IncidentColumn::IncidentType, &all),
        location_types: options_for(dataset, IncidentColumn::LocationType, &all),
    }
}

/// Builds the streets page charts.
///
/// Returns `None` until both municipality and neighborhood are chosen.
#[must_use]
pub fn streets(dataset: &Dataset, filters: &StreetFilters) -> Option<StreetCharts> {
    let criteria = filters.criteria();
    if !(criteria.contains(IncidentColumn::Municipality)
        && criteria.contains(IncidentColumn::Neighborhood))
    {
        return None;
    }

    let view = filter(dataset, &criteria);

    Some(StreetCharts {
        matched: view.len() as u64,
        top_streets: top_n_by(&view, IncidentColumn::Street, TOP_N),
        time_of_day: time_series(&view),
    })
}

/// Cascading choices for the streets page.
///
/// Neighborhoods depend on the municipality; incident and location types
/// depend on both municipality and neighborhood. Anything whose upstream
/// selection is missing comes back empty.
#[must_use]
pub fn street_options(
    dataset: &Dataset,
    municipality: Option<&str>,
    neighborhood: Option<&str>,
) -> StreetOptions {
    let municipality_scope = Criteria::new().with_opt(IncidentColumn::Municipality, municipality);
    let neighborhood_scope = municipality_scope
        .clone()
        .with_opt(IncidentColumn::Neighborhood, neighborhood);

    let neighborhoods = options_for(dataset, IncidentColumn::Neighborhood, &municipality_scope);

    let (incident_types, location_types) = if neighborhood_scope
        .contains(IncidentColumn::Municipality)
        && neighborhood_scope.contains(IncidentColumn::Neighborhood)
    {
        (
            options_for(dataset, IncidentColumn::IncidentType, &neighborhood_scope),
            options_for(dataset, IncidentColumn::LocationType, &neighborhood_scope),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    StreetOptions {
        neighborhoods,
        incident_types,
        location_types,
    }
}
