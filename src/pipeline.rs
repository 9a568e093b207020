use log::debug;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::chart::{BoxPlotSpec, DensitySpec, HistogramSpec, RadarSpec, ScatterSpec};
use crate::distribution;
use crate::filter::{self, FilterCriteria};
use crate::schema::{Dataset, Dimension, Metric, Record};

/// Bin count used for every histogram section.
pub const DEFAULT_BIN_COUNT: usize = 20;

/// Which section of charts to produce for one interaction.
///
/// Constructed fresh per interaction by the UI collaborator; `All` carries
/// the user's metric selection for the density comparison view, which may
/// legitimately be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum ChartRequest {
    #[serde(rename_all = "camelCase")]
    All { density_metrics: Vec<Metric> },
    Math,
    Writing,
    Reading,
}

/// Headline means for the `All` section. `None` means the filtered sequence
/// was empty and there is nothing to average, which is distinct from 0.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub math: Option<f64>,
    pub reading: Option<f64>,
    pub writing: Option<f64>,
}

impl Kpis {
    fn compute(rows: &[&Record]) -> Self {
        let mean = |metric| {
            let value = aggregate::mean_of(rows, metric);
            if value.is_nan() {
                None
            } else {
                Some(value)
            }
        };
        Self {
            math: mean(Metric::Math),
            reading: mean(Metric::Reading),
            writing: mean(Metric::Writing),
        }
    }
}

/// Everything the rendering layer needs for the active section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum SectionCharts {
    #[serde(rename_all = "camelCase")]
    All {
        kpis: Kpis,
        histogram: HistogramSpec,
        density: DensitySpec,
        box_plot: BoxPlotSpec,
        scatter: ScatterSpec,
        radar: RadarSpec,
    },
    #[serde(rename_all = "camelCase")]
    Single {
        metric: Metric,
        histogram: HistogramSpec,
        density: DensitySpec,
        box_plot: BoxPlotSpec,
    },
}

/// One full, stateless pass: filter the dataset, aggregate and estimate
/// distributions, and reshape into chart-ready specs. Recomputed from the
/// immutable dataset on every interaction; no caching, no hidden state.
pub fn build_charts(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    request: &ChartRequest,
) -> SectionCharts {
    let rows = filter::apply(dataset, criteria);
    debug!(
        "building {:?} charts over {} of {} records",
        request,
        rows.len(),
        dataset.len()
    );

    match request {
        ChartRequest::All { density_metrics } => all_section(&rows, density_metrics),
        ChartRequest::Math => single_section(&rows, Metric::Math),
        ChartRequest::Writing => single_section(&rows, Metric::Writing),
        ChartRequest::Reading => single_section(&rows, Metric::Reading),
    }
}

fn all_section(rows: &[&Record], density_metrics: &[Metric]) -> SectionCharts {
    let averages = metric_values(rows, Metric::Average);
    SectionCharts::All {
        kpis: Kpis::compute(rows),
        histogram: HistogramSpec::from_histogram(&distribution::histogram(
            &averages,
            DEFAULT_BIN_COUNT,
        )),
        density: density_section(rows, density_metrics),
        box_plot: BoxPlotSpec::from_quartiles(aggregate::quartiles(
            rows,
            Dimension::Gender,
            Metric::Average,
        )),
        scatter: ScatterSpec::from_records(rows, Metric::Math, Metric::Reading, Dimension::Gender),
        radar: RadarSpec::from_group_means(&aggregate::group_means(
            rows,
            Dimension::Gender,
            &[Metric::Math, Metric::Reading, Metric::Writing],
        )),
    }
}

fn single_section(rows: &[&Record], metric: Metric) -> SectionCharts {
    let values = metric_values(rows, metric);
    SectionCharts::Single {
        metric,
        histogram: HistogramSpec::from_histogram(&distribution::histogram(
            &values,
            DEFAULT_BIN_COUNT,
        )),
        density: density_section(rows, &[metric]),
        box_plot: BoxPlotSpec::from_quartiles(aggregate::quartiles(
            rows,
            Dimension::Gender,
            metric,
        )),
    }
}

fn density_section(rows: &[&Record], metrics: &[Metric]) -> DensitySpec {
    if metrics.is_empty() {
        return DensitySpec::NoMetricSelected;
    }
    let results = metrics
        .iter()
        .map(|&metric| {
            (
                metric,
                distribution::density_curve(&metric_values(rows, metric)),
            )
        })
        .collect();
    DensitySpec::from_results(results)
}

fn metric_values(rows: &[&Record], metric: Metric) -> Vec<f64> {
    rows.iter().map(|record| metric.value(record)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_request_deserializes_from_ui_payload() {
        let request: ChartRequest =
            serde_json::from_str(r#"{"section": "all", "densityMetrics": ["math", "average"]}"#)
                .unwrap();
        assert_eq!(
            request,
            ChartRequest::All {
                density_metrics: vec![Metric::Math, Metric::Average]
            }
        );

        let request: ChartRequest = serde_json::from_str(r#"{"section": "reading"}"#).unwrap();
        assert_eq!(request, ChartRequest::Reading);
    }

    #[test]
    fn test_kpis_of_empty_rows_are_undefined() {
        let kpis = Kpis::compute(&[]);
        assert_eq!(kpis.math, None);
        assert_eq!(kpis.reading, None);
        assert_eq!(kpis.writing, None);
    }

    #[test]
    fn test_density_section_distinguishes_empty_selection() {
        // Zero metrics selected: nothing to render.
        assert_eq!(density_section(&[], &[]), DensitySpec::NoMetricSelected);

        // A metric selected over an empty filter result: requested but
        // unanswerable, reported per metric.
        match density_section(&[], &[Metric::Math]) {
            DensitySpec::Curves {
                points,
                insufficient,
            } => {
                assert!(points.is_empty());
                assert_eq!(insufficient, vec!["Math"]);
            }
            DensitySpec::NoMetricSelected => panic!("expected per-metric insufficiency"),
        }
    }
}
