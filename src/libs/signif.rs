use indexmap::IndexMap;

/// Per-gene aggregate over its spatial neighborhood, produced upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSummary {
    /// Signed sum of correlations with the neighboring genes
    pub sum: f64,
    /// Sum of absolute correlations
    pub abs_sum: f64,
    /// The genes that contributed, in ranking order
    pub neighbors: Vec<String>,
}

/// Median of a sample. Empty input yields `None`.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Median absolute deviation, the robust counterpart of the standard
/// deviation. Unscaled (no normal-consistency constant).
pub fn mad(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&deviations)
}

/// Genes whose signed correlation sum is a robust outlier.
///
/// Thresholds are median +/- coefficient * MAD over all signed sums. A gene
/// qualifies above the upper threshold, or at/below the lower threshold when
/// its sum is also non-positive; a negative-leaning sum that never crosses
/// zero stays out of the lower tail. Output order is the input map's
/// insertion order.
///
/// Fewer than two summaries, or MAD of zero, yields an empty set. Both make
/// the threshold band meaningless, so nothing is flagged rather than
/// comparing against degenerate bounds.
pub fn detect_significant(
    summaries: &IndexMap<String, CorrelationSummary>,
    coefficient: f64,
) -> Vec<String> {
    if summaries.len() < 2 {
        return vec![];
    }
    let sums: Vec<f64> = summaries.values().map(|s| s.sum).collect();

    // len >= 2, so both are Some
    let med = median(&sums).unwrap();
    let mad = mad(&sums).unwrap();
    if mad == 0.0 {
        return vec![];
    }

    let upper = med + coefficient * mad;
    let lower = med - coefficient * mad;

    summaries
        .iter()
        .filter(|(_, s)| s.sum > upper || (s.sum <= lower && s.sum <= 0.0))
        .map(|(name, _)| name.clone())
        .collect()
}
