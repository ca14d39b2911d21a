#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query engine for the crime dashboard.
//!
//! Every chart and every dropdown on the dashboard is a pure function of the
//! loaded [`Dataset`](crime_dashboard_dataset::Dataset) and the user's
//! current selections:
//!
//! * [`query`] filters the dataset and counts values within the result.
//! * [`options`] lists the valid choices for a column given upstream
//!   selections.
//! * [`dashboard`] assembles those into the chart bundles for each page.
//!
//! Incomplete selections (a neighborhood without its municipality) are not
//! errors; they simply produce empty results.

pub mod dashboard;
pub mod options;
pub mod query;

pub use dashboard::{TOP_N, overview, overview_options, street_options, streets};
pub use options::options_for;
pub use query::{FilteredView, filter, frequency_by, time_series, top_n_by};
