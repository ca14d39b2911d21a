//! Plain-text charts for the terminal.
//!
//! Each function returns the chart as a `String` so the caller decides where
//! it goes. Empty inputs render a placeholder line instead of an empty
//! chart.

use crime_dashboard_analytics_models::{TimeOfDayCount, ValueCount};

/// Width of the longest bar, in characters.
const BAR_WIDTH: u64 = 40;

/// Labels longer than this are shortened with an ellipsis.
const MAX_LABEL_WIDTH: usize = 36;

const PLACEHOLDER: &str = "  (no data for this selection)";

/// Horizontal bar chart of value counts, in the order given.
#[must_use]
pub fn bar_chart(title: &str, counts: &[ValueCount]) -> String {
    let rows: Vec<(String, u64)> = counts.iter().map(|c| (c.label(), c.count)).collect();
    chart(title, &rows)
}

/// Occurrences per time of day as a vertical list of bars, earliest first.
#[must_use]
pub fn time_chart(title: &str, series: &[TimeOfDayCount]) -> String {
    let rows: Vec<(String, u64)> = series.iter().map(|p| (p.time.clone(), p.count)).collect();
    chart(title, &rows)
}

fn chart(title: &str, rows: &[(String, u64)]) -> String {
    let mut lines = vec![title.to_string(), "=".repeat(title.chars().count())];

    if rows.is_empty() {
        lines.push(PLACEHOLDER.to_string());
    } else {
        let labels: Vec<String> = rows.iter().map(|(label, _)| shorten(label)).collect();
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);

        lines.extend(labels.iter().zip(rows).map(|(label, (_, count))| {
            let padding = label_width - label.chars().count();
            format!(
                "  {label}{} | {} {count}",
                " ".repeat(padding),
                bar(*count, max)
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH / max).max(1);
    "#".repeat(usize::try_from(len).unwrap_or(0))
}

fn shorten(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_WIDTH {
        return label.to_string();
    }
    let kept: String = label.chars().take(MAX_LABEL_WIDTH - 3).collect();
    format!("{kept}...")
}
