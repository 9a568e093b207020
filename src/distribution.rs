use thiserror::Error;

use crate::aggregate::percentile;

/// Resolution of a density curve.
const GRID_POINTS: usize = 128;

/// Fallback histogram range when there are no observations to span.
const SCORE_DOMAIN: (f64, f64) = (0.0, 100.0);

/// Equal-width bin counts over a metric's observed range.
/// `edges` is strictly increasing with `counts.len() + 1` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Partition the observed min-max range into `bin_count` equal-width bins.
///
/// Empty input yields all-zero counts over the fixed score domain; a
/// zero-width range is padded by ±0.5 so the edges stay strictly increasing.
/// Values on the top edge land in the last bin.
pub fn histogram(values: &[f64], bin_count: usize) -> Histogram {
    let bin_count = bin_count.max(1);

    let (min, max) = match observed_range(values) {
        Some(range) => range,
        None => SCORE_DOMAIN,
    };
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (max - min) / bin_count as f64;

    let mut edges = Vec::with_capacity(bin_count + 1);
    for i in 0..=bin_count {
        edges.push(min + i as f64 * width);
    }

    let mut counts = vec![0u64; bin_count];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

fn observed_range(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    Some((min, max))
}

/// A kernel density estimate evaluated over a sampling grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Density estimation is undefined for degenerate input: fewer than two
/// observations, or observations with zero spread (singular bandwidth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("density estimation needs at least two spread-out observations, got {observations}")]
pub struct InsufficientData {
    pub observations: usize,
}

/// Gaussian kernel density estimate with Silverman's rule-of-thumb
/// bandwidth, evaluated on a 128-point grid over the data range extended by
/// three bandwidths on each side.
pub fn density_curve(values: &[f64]) -> Result<DensityCurve, InsufficientData> {
    if values.len() < 2 {
        return Err(InsufficientData {
            observations: values.len(),
        });
    }

    let bandwidth = silverman_bandwidth(values);
    if !(bandwidth > 0.0) {
        return Err(InsufficientData {
            observations: values.len(),
        });
    }

    let (min, max) = observed_range(values).unwrap_or(SCORE_DOMAIN);
    let extend = 3.0 * bandwidth;
    let start = min - extend;
    let step = (max + extend - start) / (GRID_POINTS - 1) as f64;
    let n = values.len() as f64;

    let mut x = Vec::with_capacity(GRID_POINTS);
    let mut y = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_POINTS {
        let gx = start + i as f64 * step;
        let density = values
            .iter()
            .map(|&v| gaussian_kernel((gx - v) / bandwidth))
            .sum::<f64>()
            / (n * bandwidth);
        x.push(gx);
        y.push(density);
    }

    Ok(DensityCurve { x, y })
}

/// Silverman's rule: `h = 0.9 * min(std, IQR / 1.34) * n^(-1/5)`.
/// Returns 0 when the observations have no spread.
fn silverman_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);

    // IQR-based scale for robustness against outliers
    let scale = if iqr > 0.0 {
        std_dev.min(iqr / 1.34)
    } else {
        std_dev
    };
    0.9 * scale * n.powf(-0.2)
}

fn gaussian_kernel(u: f64) -> f64 {
    const SQRT_2PI: f64 = 2.5066282746310002;
    (-0.5 * u * u).exp() / SQRT_2PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let hist = histogram(&values, 4);
        assert_eq!(hist.counts.len(), 4);
        assert_eq!(hist.edges.len(), 5);
        assert_eq!(hist.counts.iter().sum::<u64>(), values.len() as u64);
        // Top-edge value lands in the last bin.
        assert_eq!(hist.counts[3], 2);
    }

    #[test]
    fn test_histogram_empty_input_is_all_zero() {
        let hist = histogram(&[], 20);
        assert_eq!(hist.counts, vec![0u64; 20]);
        assert_relative_eq!(hist.edges[0], 0.0);
        assert_relative_eq!(hist.edges[20], 100.0);
    }

    #[test]
    fn test_histogram_zero_width_range() {
        let hist = histogram(&[42.0, 42.0, 42.0], 10);
        assert_eq!(hist.counts.iter().sum::<u64>(), 3);
        assert!(hist.edges.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_density_rejects_fewer_than_two_points() {
        assert_eq!(density_curve(&[]).unwrap_err().observations, 0);
        assert_eq!(density_curve(&[50.0]).unwrap_err().observations, 1);
    }

    #[test]
    fn test_density_rejects_zero_spread() {
        assert!(density_curve(&[60.0, 60.0, 60.0]).is_err());
    }

    #[test]
    fn test_density_integrates_to_one() {
        let values = [55.0, 60.0, 62.0, 70.0, 71.0, 80.0, 85.0, 90.0];
        let curve = density_curve(&values).unwrap();
        assert_eq!(curve.x.len(), 128);

        // Trapezoidal integral of a proper density should be close to 1.
        let mut area = 0.0;
        for w in curve.x.windows(2).zip(curve.y.windows(2)) {
            let (xs, ys) = w;
            area += (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0;
        }
        assert_relative_eq!(area, 1.0, epsilon = 0.02);
    }

    #[test]
    fn test_density_grid_spans_extended_range() {
        let values = [10.0, 20.0, 30.0, 40.0];
        let curve = density_curve(&values).unwrap();
        assert!(curve.x[0] < 10.0);
        assert!(*curve.x.last().unwrap() > 40.0);
    }
}
