use std::collections::BTreeMap;

use crate::schema::{Dimension, Metric, Record};

/// Arithmetic mean of one metric over the filtered sequence.
/// Empty input yields the NaN sentinel, never a panic.
pub fn mean_of(rows: &[&Record], metric: Metric) -> f64 {
    if rows.is_empty() {
        return f64::NAN;
    }
    rows.iter().map(|record| metric.value(record)).sum::<f64>() / rows.len() as f64
}

/// Per-metric means for one group of records.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeans {
    pub group: String,
    pub means: Vec<(Metric, f64)>,
}

/// Mean of each requested metric per distinct value of `dimension`.
/// Groups are sorted by key; values absent from the input are not emitted.
pub fn group_means<'a>(
    rows: &[&'a Record],
    dimension: Dimension,
    metrics: &[Metric],
) -> Vec<GroupMeans> {
    let mut groups: BTreeMap<&'a str, Vec<&'a Record>> = BTreeMap::new();
    for &record in rows {
        groups.entry(dimension.value(record)).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(group, members)| GroupMeans {
            group: group.to_string(),
            means: metrics
                .iter()
                .map(|&metric| (metric, mean_of(&members, metric)))
                .collect(),
        })
        .collect()
}

/// Five-number summary of one metric for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupQuartiles {
    pub group: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Min, quartiles, and max of `metric` per distinct value of `dimension`.
///
/// Quartiles use linear interpolation between order statistics
/// (`rank = p * (n - 1)`); a single observation collapses all five numbers
/// onto it. Min and max are the true extremes, not whisker fences.
pub fn quartiles(rows: &[&Record], dimension: Dimension, metric: Metric) -> Vec<GroupQuartiles> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for &record in rows {
        groups
            .entry(dimension.value(record))
            .or_default()
            .push(metric.value(record));
    }

    groups
        .into_iter()
        .map(|(group, mut values)| {
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            GroupQuartiles {
                group: group.to_string(),
                min: values[0],
                q1: percentile(&values, 0.25),
                median: percentile(&values, 0.50),
                q3: percentile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect()
}

/// Linear interpolation between order statistics. Input must be sorted.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(gender: &str, math: f64, reading: f64, writing: f64) -> Record {
        Record::new(
            gender.to_string(),
            "group A".to_string(),
            "high school".to_string(),
            math,
            reading,
            writing,
        )
    }

    #[test]
    fn test_mean_of_empty_is_nan() {
        assert!(mean_of(&[], Metric::Math).is_nan());
    }

    #[test]
    fn test_mean_of_subset() {
        let a = record("female", 70.0, 0.0, 0.0);
        let b = record("female", 90.0, 0.0, 0.0);
        let rows = vec![&a, &b];
        assert_relative_eq!(mean_of(&rows, Metric::Math), 80.0);
    }

    #[test]
    fn test_group_means_sorted_without_phantom_groups() {
        let a = record("male", 80.0, 70.0, 60.0);
        let b = record("female", 70.0, 80.0, 90.0);
        let c = record("female", 90.0, 90.0, 90.0);
        let rows = vec![&a, &b, &c];

        let groups = group_means(&rows, Dimension::Gender, &[Metric::Math, Metric::Reading]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, "female");
        assert_eq!(groups[1].group, "male");
        assert_relative_eq!(groups[0].means[0].1, 80.0);
        assert_relative_eq!(groups[0].means[1].1, 85.0);
        assert_relative_eq!(groups[1].means[0].1, 80.0);
    }

    #[test]
    fn test_group_means_empty_input() {
        assert!(group_means(&[], Dimension::Gender, &[Metric::Math]).is_empty());
    }

    #[test]
    fn test_quartiles_interpolation() {
        let records: Vec<Record> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .map(|&m| record("female", m, 0.0, 0.0))
            .collect();
        let rows: Vec<&Record> = records.iter().collect();

        let summary = quartiles(&rows, Dimension::Gender, Metric::Math);
        assert_eq!(summary.len(), 1);
        let q = &summary[0];
        assert_relative_eq!(q.min, 10.0);
        assert_relative_eq!(q.q1, 17.5);
        assert_relative_eq!(q.median, 25.0);
        assert_relative_eq!(q.q3, 32.5);
        assert_relative_eq!(q.max, 40.0);
    }

    #[test]
    fn test_quartiles_single_record_collapses() {
        let a = record("male", 55.0, 0.0, 0.0);
        let rows = vec![&a];
        let summary = quartiles(&rows, Dimension::Gender, Metric::Math);
        let q = &summary[0];
        assert_relative_eq!(q.min, 55.0);
        assert_relative_eq!(q.q1, 55.0);
        assert_relative_eq!(q.median, 55.0);
        assert_relative_eq!(q.q3, 55.0);
        assert_relative_eq!(q.max, 55.0);
    }

    #[test]
    fn test_percentile_exact_rank() {
        let sorted = [1.0, 2.0, 3.0];
        assert_relative_eq!(percentile(&sorted, 0.5), 2.0);
        assert_relative_eq!(percentile(&sorted, 0.0), 1.0);
        assert_relative_eq!(percentile(&sorted, 1.0), 3.0);
    }
}
