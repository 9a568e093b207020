use serde::Serialize;

use crate::aggregate::{GroupMeans, GroupQuartiles};
use crate::distribution::{DensityCurve, Histogram, InsufficientData};
use crate::schema::{Dimension, Metric, Record};

// Renderer-facing shapes. Pure reshaping of aggregation/distribution
// outputs; no statistics are computed here.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSpec {
    pub bins: Vec<HistogramBin>,
}

impl HistogramSpec {
    pub fn from_histogram(histogram: &Histogram) -> Self {
        let bins = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(i, &count)| HistogramBin {
                bin_start: histogram.edges[i],
                bin_end: histogram.edges[i + 1],
                count,
            })
            .collect();
        Self { bins }
    }
}

/// One sample of one labeled density curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityPoint {
    pub metric_label: String,
    pub x: f64,
    pub y: f64,
}

/// The density comparison view.
///
/// `NoMetricSelected` is the caller deselecting every metric — nothing to
/// render, as opposed to metrics that were requested but had too little
/// data, which are listed in `insufficient` without aborting the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DensitySpec {
    NoMetricSelected,
    Curves {
        points: Vec<DensityPoint>,
        insufficient: Vec<String>,
    },
}

impl DensitySpec {
    /// Flatten per-metric estimation results into labeled point triples.
    pub fn from_results(results: Vec<(Metric, Result<DensityCurve, InsufficientData>)>) -> Self {
        let mut points = Vec::new();
        let mut insufficient = Vec::new();
        for (metric, result) in results {
            match result {
                Ok(curve) => {
                    points.extend(curve.x.iter().zip(curve.y.iter()).map(|(&x, &y)| {
                        DensityPoint {
                            metric_label: metric.label().to_string(),
                            x,
                            y,
                        }
                    }));
                }
                Err(_) => insufficient.push(metric.label().to_string()),
            }
        }
        DensitySpec::Curves {
            points,
            insufficient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlotRecord {
    pub group: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxPlotSpec {
    pub groups: Vec<BoxPlotRecord>,
}

impl BoxPlotSpec {
    pub fn from_quartiles(quartiles: Vec<GroupQuartiles>) -> Self {
        let groups = quartiles
            .into_iter()
            .map(|q| BoxPlotRecord {
                group: q.group,
                min: q.min,
                q1: q.q1,
                median: q.median,
                q3: q.q3,
                max: q.max,
            })
            .collect();
        Self { groups }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterSpec {
    pub points: Vec<ScatterPoint>,
}

impl ScatterSpec {
    /// Identity transform: one point per record over two metrics, tagged
    /// with the grouping dimension.
    pub fn from_records(rows: &[&Record], x: Metric, y: Metric, color: Dimension) -> Self {
        let points = rows
            .iter()
            .map(|record| ScatterPoint {
                x: x.value(record),
                y: y.value(record),
                color_group: color.value(record).to_string(),
            })
            .collect();
        Self { points }
    }
}

/// One row of the long-format table behind multi-series charts (radar).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarRow {
    pub group: String,
    pub subject: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSpec {
    pub rows: Vec<RadarRow>,
}

impl RadarSpec {
    /// Pivot wide group means into long form: one row per group x subject.
    pub fn from_group_means(means: &[GroupMeans]) -> Self {
        let mut rows = Vec::new();
        for gm in means {
            for &(metric, value) in &gm.means {
                rows.push(RadarRow {
                    group: gm.group.clone(),
                    subject: metric.label().to_string(),
                    value,
                });
            }
        }
        Self { rows }
    }
}
