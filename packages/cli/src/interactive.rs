//! Interactive dashboard session.
//!
//! Owns the user's selections and re-runs the query engine after each one.
//! Every select starts with a "no filter" entry; cascading selects only
//! offer values that exist under the choices made above them.

use crime_dashboard_analytics::{TOP_N, overview, overview_options, street_options, streets};
use crime_dashboard_analytics_models::{OverviewFilters, StreetFilters};
use crime_dashboard_dataset::Dataset;
use dialoguer::{Confirm, Select};
use serde::Serialize;

use crate::render::{bar_chart, time_chart};

/// First entry of every optional select.
const ANY: &str = "(all)";

/// Rows visible at once in long selects.
const MAX_VISIBLE: usize = 15;

/// Pages of the dashboard.
enum Page {
    Overview,
    Streets,
    Summary,
    Quit,
}

impl Page {
    const ALL: &[Self] = &[Self::Overview, Self::Streets, Self::Summary, Self::Quit];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview: neighborhoods, times, incident and location types",
            Self::Streets => "Streets: drill into one neighborhood",
            Self::Summary => "Dataset summary",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the page menu until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails (e.g., the terminal is not
/// interactive) or JSON export fails.
pub fn run(dataset: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Page::ALL.iter().map(Page::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("Which page?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Page::ALL[idx] {
            Page::Overview => overview_page(dataset)?,
            Page::Streets => streets_page(dataset)?,
            Page::Summary => summary_page(dataset),
            Page::Quit => return Ok(()),
        }
        println!();
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn overview_page(dataset: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
    let options = overview_options(dataset);

    let filters = OverviewFilters {
        municipality: select_optional("Municipality", &options.municipalities)?,
        incident_type: select_optional("Incident type", &options.incident_types)?,
        location_type: select_optional("Location type", &options.location_types)?,
    };
    log::debug!("Overview filters: {filters:?}");

    let charts = overview(dataset, &filters);

    println!();
    println!("{} matching incidents", charts.matched);
    println!();
    print!("{}", bar_chart(&format!("Top {TOP_N} neighborhoods"), &charts.top_neighborhoods));
    println!();
    print!("{}", time_chart("Incidents by time of day", &charts.time_of_day));
    println!();
    print!("{}", bar_chart("Incident types", &charts.incident_types));
    println!();
    print!("{}", bar_chart("Location types", &charts.location_types));

    offer_export(&charts)
}

fn streets_page(dataset: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
    let municipalities = overview_options(dataset).municipalities;
    let municipality = select_optional("Municipality", &municipalities)?;

    let neighborhoods = street_options(dataset, municipality.as_deref(), None).neighborhoods;
    let neighborhood = select_optional("Neighborhood", &neighborhoods)?;

    let scoped = street_options(dataset, municipality.as_deref(), neighborhood.as_deref());
    let filters = StreetFilters {
        municipality,
        neighborhood,
        incident_type: select_optional("Incident type (optional)", &scoped.incident_types)?,
        location_type: select_optional("Location type (optional)", &scoped.location_types)?,
    };
    log::debug!("Street filters: {filters:?}");

    let Some(charts) = streets(dataset, &filters) else {
        println!();
        println!("Choose a municipality and a neighborhood to see street charts.");
        return Ok(());
    };

    let place = format!(
        "{} ({})",
        filters.neighborhood.as_deref().unwrap_or_default(),
        filters.municipality.as_deref().unwrap_or_default()
    );

    println!();
    println!("{} matching incidents in {place}", charts.matched);
    println!();
    print!("{}", bar_chart(&format!("Top {TOP_N} streets in {place}"), &charts.top_streets));
    println!();
    print!(
        "{}",
        time_chart(&format!("Incidents by time of day in {place}"), &charts.time_of_day)
    );

    offer_export(&charts)
}

fn summary_page(dataset: &Dataset) {
    let summary = dataset.summary();

    println!();
    println!("Records:             {}", summary.rows);
    println!("Without a date:      {}", summary.missing_dates);
    println!("Without a time:      {}", summary.missing_times);
    match (summary.earliest_date, summary.latest_date) {
        (Some(earliest), Some(latest)) => println!("Dates:               {earliest} to {latest}"),
        _ => println!("Dates:               (none parsed)"),
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Prompts for one of `choices`, with a leading "no filter" entry.
///
/// Returns `None` when the user picks the "no filter" entry. When there are
/// no choices (an upstream selection is missing), the prompt is skipped.
fn select_optional(
    prompt: &str,
    choices: &[String],
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if choices.is_empty() {
        log::debug!("No choices for {prompt}; skipping");
        return Ok(None);
    }

    let mut items = Vec::with_capacity(choices.len() + 1);
    items.push(ANY);
    items.extend(choices.iter().map(String::as_str));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .max_length(MAX_VISIBLE)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| choices[i].clone()))
}

/// Asks whether to print the chart data as JSON.
fn offer_export<T: Serialize>(charts: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    let export = Confirm::new()
        .with_prompt("Print chart data as JSON?")
        .default(false)
        .interact()?;

    if export {
        println!("{}", serde_json::to_string_pretty(charts)?);
    }

    Ok(())
}
