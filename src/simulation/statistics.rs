//! Summary statistics over simulated game totals.

use serde::Serialize;

/// Distribution summary of a batch of total scores.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// `std_dev / sqrt(count)`.
    pub std_error: f64,
    pub min: i32,
    pub max: i32,
    /// Upper median (`sorted[n / 2]`).
    pub median: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub lower: i32,
    pub upper: i32,
    pub count: usize,
}

/// Summarize a slice of scores. An empty slice gives all zeros.
pub fn summarize_scores(scores: &[i32]) -> ScoreStats {
    if scores.is_empty() {
        return ScoreStats::default();
    }

    let mut sorted = scores.to_vec();
    sorted.sort_unstable();

    let n = sorted.len() as f64;
    let mean = sorted.iter().map(|&s| s as f64).sum::<f64>() / n;
    let variance = sorted
        .iter()
        .map(|&s| (s as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    ScoreStats {
        count: sorted.len(),
        mean,
        std_dev,
        std_error: std_dev / n.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median: sorted[sorted.len() / 2],
    }
}

/// Fixed-width histogram covering `[min, max]`, bins aligned to multiples of
/// `bin_width`. Empty input gives no bins.
pub fn histogram(scores: &[i32], bin_width: i32) -> Vec<HistogramBin> {
    let bin_width = bin_width.max(1);
    let (min, max) = match (scores.iter().min(), scores.iter().max()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Vec::new(),
    };

    let first = min.div_euclid(bin_width) * bin_width;
    let num_bins = ((max - first) / bin_width + 1) as usize;
    let mut counts = vec![0usize; num_bins];
    for &s in scores {
        counts[((s - first) / bin_width) as usize] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = first + i as i32 * bin_width;
            HistogramBin {
                lower,
                upper: lower + bin_width,
                count,
            }
        })
        .collect()
}
