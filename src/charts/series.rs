//! Trend Chart Model
//! Line series per Sender ID over a categorical quarter axis.

use crate::data::{FilteredView, Volume};
use std::collections::{BTreeSet, HashMap};

pub const X_AXIS_LABEL: &str = "Quarter";
pub const Y_AXIS_LABEL: &str = "Total Message Volume";
pub const LEGEND_TITLE: &str = "Sender ID";

/// Color palette for series (RGB)
pub const PALETTE: [(u8, u8, u8); 10] = [
    (231, 76, 60),  // Red
    (52, 152, 219), // Blue
    (46, 204, 113), // Green
    (155, 89, 182), // Purple
    (243, 156, 18), // Orange
    (26, 188, 156), // Teal
    (233, 30, 99),  // Pink
    (0, 188, 212),  // Cyan
    (121, 85, 72),  // Brown
    (96, 125, 139), // Blue Grey
];

pub fn series_color(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// One Sender ID's volumes; `x` is the index into [`TrendChart::periods`].
///
/// A missing volume ends a segment, so lines are never drawn across it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub sender_id: String,
    pub segments: Vec<Vec<[f64; 2]>>,
}

impl TrendSeries {
    fn from_cells(sender_id: String, mut cells: Vec<(usize, Option<f64>)>) -> Self {
        cells.sort_by_key(|&(x, _)| x);

        let mut segments = Vec::new();
        let mut current: Vec<[f64; 2]> = Vec::new();
        for (x, volume) in cells {
            match volume {
                Some(v) => current.push([x as f64, v]),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        Self {
            sender_id,
            segments,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.segments.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub title: String,
    /// Quarter categories, ascending by label.
    pub periods: Vec<String>,
    /// Series in the order their Sender ID first appears (rank order).
    pub series: Vec<TrendSeries>,
}

impl TrendChart {
    pub fn from_view(view: &FilteredView) -> Self {
        let periods: Vec<String> = view
            .records
            .iter()
            .map(|r| r.period.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let period_index: HashMap<&str, usize> = periods
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let mut cells: Vec<(&str, Vec<(usize, Option<f64>)>)> = Vec::new();
        let mut series_index: HashMap<&str, usize> = HashMap::new();

        for record in &view.records {
            let sender_id = record.sender_id.as_str();
            let idx = *series_index.entry(sender_id).or_insert_with(|| {
                cells.push((sender_id, Vec::new()));
                cells.len() - 1
            });
            let x = period_index[record.period.as_str()];
            cells[idx].1.push((x, record.volume.map(Volume::as_f64)));
        }

        let series = cells
            .into_iter()
            .map(|(sender_id, cells)| TrendSeries::from_cells(sender_id.to_string(), cells))
            .collect();

        Self {
            title: view.title(),
            periods,
            series,
        }
    }

    /// Category label at an x position, empty between categories.
    pub fn period_label(&self, x: f64) -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        self.periods
            .get(rounded as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Padded y range over every point; `(0, 1)` when there are none.
    pub fn y_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in self.series.iter().flat_map(|s| s.points()) {
            if p[1].is_finite() {
                min = min.min(p[1]);
                max = max.max(p[1]);
            }
        }
        if min.is_infinite() {
            return (0.0, 1.0);
        }
        let pad = ((max - min) * 0.1).max(max.abs() * 0.05).max(1.0);
        (min - pad, max + pad)
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LongRecord, Selection, Tier};

    fn record(sid: &str, period: &str, volume: Option<f64>) -> LongRecord {
        LongRecord {
            sender_id: sid.to_string(),
            tier: Tier::from_rank(0, 10),
            period: period.to_string(),
            volume: volume.map(Volume::Float),
        }
    }

    fn view(records: Vec<LongRecord>) -> FilteredView {
        FilteredView {
            selection: Selection::Tier(Tier::from_rank(0, 10)),
            records,
        }
    }

    #[test]
    fn test_periods_sorted_ascending_by_label() {
        let chart = TrendChart::from_view(&view(vec![
            record("A", "Q3", Some(3.0)),
            record("A", "Q1", Some(1.0)),
            record("A", "Q2", Some(2.0)),
        ]));
        assert_eq!(chart.periods, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(
            chart.series[0].segments,
            vec![vec![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]]]
        );
    }

    #[test]
    fn test_one_series_per_sender_in_rank_order() {
        let chart = TrendChart::from_view(&view(vec![
            record("B", "Q1", Some(9.0)),
            record("B", "Q2", Some(8.0)),
            record("A", "Q1", Some(2.0)),
            record("A", "Q2", None),
        ]));

        let names: Vec<&str> = chart.series.iter().map(|s| s.sender_id.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(chart.series[1].segments, vec![vec![[0.0, 2.0]]]);
        assert_eq!(chart.point_count(), 3);
        assert_eq!(chart.title, "Volume trend per quarter for Tier 1 (Top 1-10)");
    }

    #[test]
    fn test_missing_volume_splits_line() {
        let chart = TrendChart::from_view(&view(vec![
            record("A", "Q1", Some(1.0)),
            record("A", "Q2", None),
            record("A", "Q3", Some(3.0)),
            record("A", "Q4", Some(4.0)),
        ]));

        assert_eq!(
            chart.series[0].segments,
            vec![vec![[0.0, 1.0]], vec![[2.0, 3.0], [3.0, 4.0]]]
        );
        assert_eq!(chart.point_count(), 3);
    }

    #[test]
    fn test_leading_and_trailing_gaps_add_no_segments() {
        let chart = TrendChart::from_view(&view(vec![
            record("A", "Q1", None),
            record("A", "Q2", Some(2.0)),
            record("A", "Q3", None),
        ]));
        assert_eq!(chart.series[0].segments, vec![vec![[1.0, 2.0]]]);
    }

    #[test]
    fn test_integer_volumes_plotted() {
        let mut exact = record("A", "Q1", None);
        exact.volume = Some(Volume::Int(42));
        let chart = TrendChart::from_view(&view(vec![exact]));
        assert_eq!(chart.series[0].segments, vec![vec![[0.0, 42.0]]]);
    }

    #[test]
    fn test_period_label() {
        let chart = TrendChart::from_view(&view(vec![
            record("A", "Q1", Some(1.0)),
            record("A", "Q2", Some(1.0)),
        ]));
        assert_eq!(chart.period_label(0.0), "Q1");
        assert_eq!(chart.period_label(1.0), "Q2");
        assert_eq!(chart.period_label(0.5), "");
        assert_eq!(chart.period_label(-1.0), "");
        assert_eq!(chart.period_label(7.0), "");
    }

    #[test]
    fn test_y_range_padding() {
        let chart = TrendChart::from_view(&view(vec![
            record("A", "Q1", Some(100.0)),
            record("A", "Q2", Some(200.0)),
        ]));
        let (lo, hi) = chart.y_range();
        assert!(lo < 100.0 && hi > 200.0);

        let empty = TrendChart::from_view(&view(vec![record("A", "Q1", None)]));
        assert_eq!(empty.y_range(), (0.0, 1.0));
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(series_color(0), series_color(PALETTE.len()));
    }
}
