use serde::Serialize;

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation between order statistics (NumPy's default `linear` method).
///
/// With `idx = p/100 * (n - 1)`, an integral `idx` returns that element
/// directly; otherwise the two neighbours are blended with weight
/// `w = idx - floor(idx)` as `V[lo] * (1 - w) + V[hi] * w`.
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(len - 1);
    if lo == hi {
        return sorted_data[lo];
    }
    let weight = rank - lo as f64;
    sorted_data[lo] * (1.0 - weight) + sorted_data[hi] * weight
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Descriptive statistics of a non-empty sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub median: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Summary {
    /// Summarise an already-sorted sample. Returns `None` when it is empty.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        Some(Self {
            count: sorted.len(),
            min,
            max,
            average: mean(sorted),
            median: percentile(sorted, 50.0),
            p5: percentile(sorted, 5.0),
            p25: percentile(sorted, 25.0),
            p75: percentile(sorted, 75.0),
            p95: percentile(sorted, 95.0),
        })
    }

    /// Sort `values` ascending (total order) and summarise them.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
