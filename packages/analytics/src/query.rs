//! Filtering and aggregation over the dataset.
//!
//! [`filter`] narrows the dataset to a [`FilteredView`]; the aggregate
//! functions count values within a view. Nothing here mutates the dataset,
//! and every function returns the same output for the same inputs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveTime;
use crime_dashboard_analytics_models::{Criteria, TimeOfDayCount, ValueCount};
use crime_dashboard_dataset::Dataset;
use crime_dashboard_incident_models::{IncidentColumn, IncidentRecord};

/// The records of a dataset that satisfy a set of criteria, in file order.
///
/// A view is defined by its criteria: refining a view with more criteria
/// gives the same rows as filtering the dataset with the combined criteria
/// in one step.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    criteria: Criteria,
    /// Set when two criteria constrained the same column to different
    /// values. Such a view is empty and stays empty when refined.
    unsatisfiable: bool,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    const fn empty(dataset: &'a Dataset, criteria: Criteria, unsatisfiable: bool) -> Self {
        Self {
            dataset,
            criteria,
            unsatisfiable,
            rows: Vec::new(),
        }
    }

    /// The criteria this view was built from.
    #[must_use]
    pub const fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no record matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Matching records in file order.
    pub fn records(&self) -> impl Iterator<Item = &'a IncidentRecord> {
        let records = self.dataset.records();
        self.rows.iter().map(move |idx| &records[*idx])
    }

    /// Narrows this view with additional criteria (logical AND).
    #[must_use]
    pub fn refine(&self, criteria: &Criteria) -> Self {
        if self.unsatisfiable {
            return Self::empty(self.dataset, self.criteria.clone(), true);
        }
        match self.criteria.merge(criteria) {
            Some(merged) => filter(self.dataset, &merged),
            None => {
                log::debug!("Criteria {criteria:?} conflict with {:?}", self.criteria);
                Self::empty(self.dataset, self.criteria.clone(), true)
            }
        }
    }
}

/// Returns the records satisfying every constraint in `criteria`.
///
/// A scoped constraint without its enclosing constraints (a neighborhood
/// without a municipality, a street without both) is an incomplete
/// selection and matches nothing.
#[must_use]
pub fn filter<'a>(dataset: &'a Dataset, criteria: &Criteria) -> FilteredView<'a> {
    if !criteria.is_scope_complete() {
        log::debug!("Criteria {criteria:?} leave a scoped column unanchored; returning no rows");
        return FilteredView::empty(dataset, criteria.clone(), false);
    }

    let rows: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(record, criteria))
        .map(|(idx, _)| idx)
        .collect();

    log::debug!(
        "Criteria {criteria:?} matched {} of {} records",
        rows.len(),
        dataset.len()
    );

    FilteredView {
        dataset,
        criteria: criteria.clone(),
        unsatisfiable: false,
        rows,
    }
}

fn matches(record: &IncidentRecord, criteria: &Criteria) -> bool {
    criteria
        .iter()
        .all(|(column, expected)| record.value(column) == Some(expected))
}

/// Counts the values of `column` in `view`, most frequent first.
///
/// Missing values are not counted. Incident types are counted without their
/// category prefix. Ties keep the order in which values first appear in the
/// view.
///
/// For a scoped column whose enclosing columns the view does not pin, each
/// value is counted per enclosing value (a neighborhood per municipality)
/// and the enclosing values are returned in [`ValueCount::within`]. Records
/// missing an enclosing value are skipped.
#[must_use]
pub fn frequency_by(view: &FilteredView<'_>, column: IncidentColumn) -> Vec<ValueCount> {
    let unpinned: Vec<IncidentColumn> = column
        .enclosing_scope()
        .iter()
        .copied()
        .filter(|enclosing| !view.criteria().contains(*enclosing))
        .collect();

    let mut positions: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut counts: Vec<(Vec<&str>, u64)> = Vec::new();

    for record in view.records() {
        let Some(key) = grouping_key(record, &unpinned, column) else {
            continue;
        };
        if let Some(&pos) = positions.get(&key) {
            counts[pos].1 += 1;
        } else {
            positions.insert(key.clone(), counts.len());
            counts.push((key, 1));
        }
    }

    // Stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(mut key, count)| {
            let value = key.pop().unwrap_or_default().to_string();
            ValueCount {
                value,
                count,
                within: key.into_iter().map(ToString::to_string).collect(),
            }
        })
        .collect()
}

/// Enclosing values followed by the column's own value, or `None` if any
/// of them is missing.
fn grouping_key<'r>(
    record: &'r IncidentRecord,
    unpinned: &[IncidentColumn],
    column: IncidentColumn,
) -> Option<Vec<&'r str>> {
    unpinned
        .iter()
        .chain(std::iter::once(&column))
        .map(|c| record.value(*c))
        .collect()
}

/// The `n` most frequent values of `column` in `view`.
///
/// Same counting and tie-breaking as [`frequency_by`].
#[must_use]
pub fn top_n_by(view: &FilteredView<'_>, column: IncidentColumn, n: usize) -> Vec<ValueCount> {
    let mut counts = frequency_by(view, column);
    counts.truncate(n);
    counts
}

/// Incidents per time of day, earliest first.
///
/// Records without a parsed time are skipped.
#[must_use]
pub fn time_series(view: &FilteredView<'_>) -> Vec<TimeOfDayCount> {
    let mut buckets: BTreeMap<NaiveTime, u64> = BTreeMap::new();
    for time in view.records().filter_map(|r| r.occurrence_time) {
        *buckets.entry(time).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(time, count)| TimeOfDayCount {
            time: time.format("%H:%M:%S").to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveTime;
    use crime_dashboard_dataset::parsing::parse_occurrence_time;

    use super::*;

    /// Builds a record from (municipality, neighborhood, incident type,
    /// location type, time).
    pub fn record(
        municipality: &str,
        neighborhood: &str,
        incident_type: &str,
        location_type: &str,
        time: &str,
    ) -> IncidentRecord {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
        IncidentRecord {
            occurrence_date: None,
            occurrence_time: parse_occurrence_time(time, "%H:%M:%S"),
            municipality: text(municipality),
            neighborhood: text(neighborhood),
            street: None,
            incident_type: text(incident_type),
            location_type: text(location_type),
        }
    }

    pub fn scenario() -> Dataset {
        Dataset::from_records(vec![
            record("MunA", "BairroX", "CRIMES AGAINST PROPERTY: THEFT", "STREET", "10:00:00"),
            record("MunA", "BairroX", "CRIMES AGAINST PROPERTY: THEFT", "STREET", "10:00:00"),
            record("MunA", "BairroY", "ROBBERY", "HOUSE", "23:00:00"),
        ])
    }

    pub fn mixed() -> Dataset {
        Dataset::from_records(vec![
            record("MunA", "CENTRO", "ROBBERY", "STREET", "08:30:00"),
            record("MunB", "CENTRO", "THEFT", "STREET", "25:99:00"),
            record("MunA", "PRAIA", "CRIMES AGAINST PROPERTY: ROBBERY", "HOUSE", "08:30:00"),
            record("MunB", "CENTRO", "ROBBERY", "", "01:15:00"),
            record("", "CENTRO", "ROBBERY", "STREET", "23:59:59"),
            record("MunA", "CENTRO", "", "SHOP", ""),
        ])
    }

    fn pairs(counts: &[ValueCount]) -> Vec<(&str, u64)> {
        counts.iter().map(|c| (c.value.as_str(), c.count)).collect()
    }

    #[test]
    fn frequency_of_incident_types_strips_prefix() {
        let dataset = scenario();
        let view = filter(
            &dataset,
            &Criteria::new().with(IncidentColumn::Municipality, "MunA"),
        );
        let counts = frequency_by(&view, IncidentColumn::IncidentType);
        assert_eq!(pairs(&counts), vec![("THEFT", 2), ("ROBBERY", 1)]);
    }

    #[test]
    fn empty_criteria_keep_every_row() {
        let dataset = mixed();
        let view = filter(&dataset, &Criteria::new());
        assert_eq!(view.len(), dataset.len());
    }

    #[test]
    fn filter_preserves_file_order() {
        let dataset = mixed();
        let view = filter(
            &dataset,
            &Criteria::new().with(IncidentColumn::Municipality, "MunB"),
        );
        let times: Vec<_> = view.records().map(|r| r.occurrence_time).collect();
        assert_eq!(times, vec![None, NaiveTime::from_hms_opt(1, 15, 0)]);
    }

    #[test]
    fn filter_matches_prefixed_and_unprefixed_incident_types() {
        let dataset = mixed();
        for selection in ["ROBBERY", "CRIMES AGAINST PROPERTY: ROBBERY"] {
            let view = filter(
                &dataset,
                &Criteria::new().with(IncidentColumn::IncidentType, selection),
            );
            assert_eq!(view.len(), 4, "{selection}");
        }
    }

    #[test]
    fn refining_equals_filtering_with_combined_criteria() {
        let dataset = mixed();
        let a = Criteria::new().with(IncidentColumn::Municipality, "MunA");
        let b = Criteria::new()
            .with(IncidentColumn::IncidentType, "ROBBERY")
            .with(IncidentColumn::LocationType, "STREET");
        let combined = a.merge(&b).unwrap();

        let at_once: Vec<_> = filter(&dataset, &combined).records().collect();
        let a_then_b: Vec<_> = filter(&dataset, &a).refine(&b).records().collect();
        let b_then_a: Vec<_> = filter(&dataset, &b).refine(&a).records().collect();

        assert_eq!(at_once.len(), 1);
        assert_eq!(at_once, a_then_b);
        assert_eq!(at_once, b_then_a);
    }

    #[test]
    fn refining_a_scoped_view_in_either_order() {
        let dataset = mixed();
        let neighborhood = Criteria::new().with(IncidentColumn::Neighborhood, "CENTRO");
        let municipality = Criteria::new().with(IncidentColumn::Municipality, "MunB");

        assert!(filter(&dataset, &neighborhood).is_empty());
        let a_then_b = filter(&dataset, &neighborhood).refine(&municipality);
        let b_then_a = filter(&dataset, &municipality).refine(&neighborhood);
        assert_eq!(a_then_b.len(), 2);
        assert_eq!(
            a_then_b.records().collect::<Vec<_>>(),
            b_then_a.records().collect::<Vec<_>>()
        );
    }

    #[test]
    fn conflicting_refinement_is_empty_for_good() {
        let dataset = mixed();
        let view = filter(
            &dataset,
            &Criteria::new().with(IncidentColumn::Municipality, "MunA"),
        )
        .refine(&Criteria::new().with(IncidentColumn::Municipality, "MunB"));
        assert!(view.is_empty());

        let still_empty = view.refine(&Criteria::new().with(IncidentColumn::LocationType, "STREET"));
        assert!(still_empty.is_empty());
    }

    #[test]
    fn unanchored_scoped_constraint_matches_nothing() {
        let dataset = mixed();
        let view = filter(
            &dataset,
            &Criteria::new().with(IncidentColumn::Neighborhood, "CENTRO"),
        );
        assert!(view.is_empty());
    }

    #[test]
    fn top_n_truncates_and_never_overcounts() {
        let dataset = mixed();
        let view = filter(&dataset, &Criteria::new());
        for n in 0..4 {
            let top = top_n_by(&view, IncidentColumn::LocationType, n);
            assert!(top.len() <= n);
            let non_null = view
                .records()
                .filter(|r| r.value(IncidentColumn::LocationType).is_some())
                .count() as u64;
            assert!(top.iter().map(|c| c.count).sum::<u64>() <= non_null);
        }
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let dataset = Dataset::from_records(vec![
            record("MunA", "N1", "B", "SHOP", ""),
            record("MunA", "N1", "A", "SHOP", ""),
            record("MunA", "N1", "C", "SHOP", ""),
            record("MunA", "N1", "A", "SHOP", ""),
            record("MunA", "N1", "C", "SHOP", ""),
        ]);
        let view = filter(&dataset, &Criteria::new());
        let counts = frequency_by(&view, IncidentColumn::IncidentType);
        assert_eq!(pairs(&counts), vec![("A", 2), ("C", 2), ("B", 1)]);
    }

    #[test]
    fn unpinned_neighborhoods_are_counted_per_municipality() {
        let dataset = mixed();
        let view = filter(&dataset, &Criteria::new());
        let counts = frequency_by(&view, IncidentColumn::Neighborhood);

        assert_eq!(counts[0].value, "CENTRO");
        assert_eq!(counts[0].within, vec!["MunA"]);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].value, "CENTRO");
        assert_eq!(counts[1].within, vec!["MunB"]);
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].value, "PRAIA");
        // The CENTRO record without a municipality is not counted.
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 5);
    }

    #[test]
    fn pinned_neighborhoods_have_no_scope_label() {
        let dataset = mixed();
        let view = filter(
            &dataset,
            &Criteria::new().with(IncidentColumn::Municipality, "MunA"),
        );
        let counts = frequency_by(&view, IncidentColumn::Neighborhood);
        assert_eq!(pairs(&counts), vec![("CENTRO", 2), ("PRAIA", 1)]);
        assert!(counts.iter().all(|c| c.within.is_empty()));
    }

    #[test]
    fn time_series_is_sorted_and_skips_bad_times() {
        let dataset = mixed();
        let view = filter(&dataset, &Criteria::new());
        let series = time_series(&view);

        let labels: Vec<(&str, u64)> = series.iter().map(|p| (p.time.as_str(), p.count)).collect();
        assert_eq!(
            labels,
            vec![("01:15:00", 1), ("08:30:00", 2), ("23:59:59", 1)]
        );
        assert!(series.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn unparseable_time_still_counts_toward_incident_types() {
        let dataset = Dataset::from_records(vec![
            record("MunA", "BairroX", "THEFT", "STREET", "25:99:00"),
            record("MunA", "BairroX", "THEFT", "STREET", "10:00:00"),
        ]);
        let view = filter(&dataset, &Criteria::new());
        assert_eq!(
            time_series(&view),
            vec![TimeOfDayCount {
                time: "10:00:00".to_string(),
                count: 1,
            }]
        );
        assert_eq!(
            pairs(&frequency_by(&view, IncidentColumn::IncidentType)),
            vec![("THEFT", 2)]
        );
    }

    #[test]
    fn leap_second_times_are_left_out_of_the_series() {
        let dataset = Dataset::from_records(vec![
            record("MunA", "BairroX", "THEFT", "STREET", "10:00:60"),
            record("MunA", "BairroX", "THEFT", "STREET", "10:00:00"),
        ]);
        let view = filter(&dataset, &Criteria::new());
        assert_eq!(
            time_series(&view),
            vec![TimeOfDayCount {
                time: "10:00:00".to_string(),
                count: 1,
            }]
        );
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn queries_are_repeatable() {
        let dataset = mixed();
        let criteria = Criteria::new().with(IncidentColumn::LocationType, "STREET");
        let first = frequency_by(&filter(&dataset, &criteria), IncidentColumn::Neighborhood);
        let second = frequency_by(&filter(&dataset, &criteria), IncidentColumn::Neighborhood);
        assert_eq!(first, second);
        assert_eq!(dataset.len(), 6);
    }
}
