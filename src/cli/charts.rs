//! Terminal charts for the dashboard views.
//!
//! [`ChartState`] holds the last series drawn for each chart. It belongs to
//! whoever renders the dashboard and is passed in explicitly; an update that
//! brings no data keeps the previous series on screen.

use serde::Serialize;

use crate::metrics::AggregatedMetrics;
use crate::utils::format::{format_number_with_spaces, truncate};

const BAR: char = '█';
const LABEL_WIDTH: usize = 16;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Labels and values of one chart, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Series currently shown by the status and timeline charts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartState {
    pub status: Option<ChartSeries>,
    pub timeline: Option<ChartSeries>,
}

/// Replace the status chart with the per-status totals of `metrics`.
///
/// Returns `false` and keeps the previous series when there is nothing to
/// show.
pub fn update_status_chart(state: &mut ChartState, metrics: &AggregatedMetrics) -> bool {
    if metrics.per_status_totals.is_empty() {
        log::warn!("no status data, keeping previous status chart");
        return false;
    }

    let (labels, values) = metrics
        .per_status_totals
        .iter()
        .map(|(status, count)| (status.label().to_string(), *count))
        .unzip();

    state.status = Some(ChartSeries { labels, values });
    true
}

/// Replace the timeline chart with the monthly series of `metrics`.
///
/// Returns `false` and keeps the previous series when there is nothing to
/// show.
pub fn update_timeline_chart(state: &mut ChartState, metrics: &AggregatedMetrics) -> bool {
    if metrics.monthly_series.is_empty() {
        log::warn!("no monthly data, keeping previous timeline chart");
        return false;
    }

    let (labels, values) = metrics
        .monthly_series
        .iter()
        .map(|entry| (entry.label.clone(), entry.count))
        .unzip();

    state.timeline = Some(ChartSeries { labels, values });
    true
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Number of bar cells for `value`, scaled so that `max` fills `width`.
/// Any non-zero value gets at least one cell.
pub fn bar_length(value: u64, max: u64, width: usize) -> usize {
    if value == 0 || max == 0 || width == 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

/// Render a series as horizontal bars, one uncolored line per entry.
pub fn render_bars(series: &ChartSeries, width: usize) -> Vec<String> {
    let max = series.max_value();

    series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, value)| {
            let bar: String = std::iter::repeat_n(BAR, bar_length(*value, max, width)).collect();
            format!(
                "{:<lw$} {:<bw$} {}",
                truncate(label, LABEL_WIDTH),
                bar,
                format_number_with_spaces(*value),
                lw = LABEL_WIDTH,
                bw = width,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{self, MonthObservation, StatusObservation};

    fn sample_metrics() -> AggregatedMetrics {
        metrics::aggregate(
            &[
                StatusObservation::new("En service", 10),
                StatusObservation::new("HS", 2),
            ],
            &[
                MonthObservation::new("2024-02-01", 3),
                MonthObservation::new("2024-01-05", 4),
            ],
        )
    }

    #[test]
    fn status_chart_follows_display_order() {
        let mut state = ChartState::default();
        assert!(update_status_chart(&mut state, &sample_metrics()));

        let series = state.status.unwrap();
        assert_eq!(series.labels, vec!["EN SERVICE", "HORS SERVICE"]);
        assert_eq!(series.values, vec![10, 2]);
    }

    #[test]
    fn timeline_chart_is_chronological() {
        let mut state = ChartState::default();
        assert!(update_timeline_chart(&mut state, &sample_metrics()));

        let series = state.timeline.unwrap();
        assert_eq!(series.labels, vec!["janv. 24", "févr. 24"]);
        assert_eq!(series.values, vec![4, 3]);
    }

    #[test]
    fn empty_update_keeps_previous_series() {
        let mut state = ChartState::default();
        update_status_chart(&mut state, &sample_metrics());
        update_timeline_chart(&mut state, &sample_metrics());
        let before = state.clone();

        let empty = AggregatedMetrics::default();
        assert!(!update_status_chart(&mut state, &empty));
        assert!(!update_timeline_chart(&mut state, &empty));
        assert_eq!(state, before);
    }

    #[test]
    fn empty_update_on_fresh_state_draws_nothing() {
        let mut state = ChartState::default();
        assert!(!update_status_chart(&mut state, &AggregatedMetrics::default()));
        assert!(state.status.is_none());
    }

    #[test]
    fn bar_length_scales_to_width() {
        assert_eq!(bar_length(10, 10, 40), 40);
        assert_eq!(bar_length(5, 10, 40), 20);
        assert_eq!(bar_length(1, 1000, 40), 1);
        assert_eq!(bar_length(0, 10, 40), 0);
        assert_eq!(bar_length(3, 0, 40), 0);
    }

    #[test]
    fn render_bars_one_line_per_entry() {
        let series = ChartSeries {
            labels: vec!["EN SERVICE".to_string(), "EN PANNE".to_string()],
            values: vec![1200, 600],
        };
        let lines = render_bars(&series, 10);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("EN SERVICE"));
        assert!(lines[0].contains(&"█".repeat(10)));
        assert!(lines[0].ends_with("1 200"));
        assert!(lines[1].contains(&"█".repeat(5)));
        assert!(!lines[1].contains(&"█".repeat(6)));
    }
}
