use crate::EngineError;

/// Percentile of `values` using linear interpolation between order statistics.
///
/// With the sorted sample `x[0..n]`, the rank is `r = p * (n - 1) / 100` and the
/// result is `x[floor(r)] + (x[ceil(r)] - x[floor(r)]) * (r - floor(r))`.
/// This is the "linear" (type 7) definition, the default of most numeric
/// libraries, so results reproduce across implementations.
///
/// # Errors
///
/// `InvalidParameter` for an empty sample, a non-finite value, or `p` outside
/// `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(EngineError::invalid("values", "percentile of an empty sample"));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(EngineError::invalid(
            "percentile",
            format!("must be within [0, 100], got {p}"),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::invalid("values", "sample contains a non-finite value"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(percentile_sorted(&sorted, p))
}

/// Same as [`percentile`] for an already sorted, non-empty, finite sample.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64 / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
