//! Numeric helpers used by the indicator series.

/// Smoothing factor `2 / (span + 1)` for an exponential moving average.
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// One step of the recursive EMA.
pub fn ema_from_previous(value: f64, previous: f64, alpha: f64) -> f64 {
    value * alpha + previous * (1.0 - alpha)
}

/// Unadjusted recursive EMA seeded with the first value: `EMA[0] = x[0]`.
///
/// Returns one value per input so that `ema_series(x)[i]` lines up with `x[i]`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = ema_alpha(span);
    let mut out = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;

    for &value in values {
        let next = match previous {
            None => value,
            Some(prev) => ema_from_previous(value, prev, alpha),
        };
        out.push(next);
        previous = Some(next);
    }

    out
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Rolling simple moving average; `None` until `window` values are available.
pub fn sma_series(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Rolling sample standard deviation; `None` until `window` values are available.
pub fn std_series(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, sample_std)
}

/// Rolling mean over a series that itself has leading gaps.
///
/// A window is only defined when every value inside it is present.
pub fn rolling_mean_of(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let present: Vec<f64> = slice.iter().filter_map(|v| *v).collect();
            if present.len() == window {
                mean(&present)
            } else {
                None
            }
        })
        .collect()
}

fn rolling(values: &[f64], window: usize, f: fn(&[f64]) -> Option<f64>) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}
