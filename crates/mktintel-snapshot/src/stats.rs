//! Descriptive statistics over plain `f64` slices.

/// Trading days per year, used to annualize daily volatility.
pub const TRADING_DAYS: f64 = 252.0;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Daily volatility scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    sample_std(returns).map(|std| std * TRADING_DAYS.sqrt())
}

/// Pearson correlation coefficient; `NaN` for mismatched lengths, fewer than two points, or a
/// constant series.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Trailing mean over `window` values. The first `window - 1` outputs are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0_f64;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    first_by(values, |candidate, best| candidate > best)
}

/// Index of the smallest value; the first one wins on ties.
pub fn argmin(values: &[f64]) -> Option<usize> {
    first_by(values, |candidate, best| candidate < best)
}

fn first_by(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some(b) if !better(*value, values[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(std, 2.138_089_935_299_395, epsilon = 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn constant_returns_have_no_volatility() {
        assert_eq!(annualized_volatility(&[0.5, 0.5, 0.5]), Some(0.0));
    }

    #[test]
    fn volatility_scales_by_root_252() {
        let returns = [1.0, -1.0, 1.0, -1.0];
        let expected = sample_std(&returns).unwrap() * 252f64.sqrt();
        assert_relative_eq!(annualized_volatility(&returns).unwrap(), expected);
    }

    #[test]
    fn pearson_bounds() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0, epsilon = 1e-12);
        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_nan());
        assert!(pearson(&x, &[1.0]).is_nan());
    }

    #[test]
    fn rolling_mean_leaves_warmup_empty() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out[..2], [None, None]);
        assert_relative_eq!(out[2].unwrap(), 2.0);
        assert_relative_eq!(out[3].unwrap(), 3.0);
        assert_relative_eq!(out[4].unwrap(), 4.0);

        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }

    #[test]
    fn arg_extremes_prefer_first_on_ties() {
        let values = [3.0, 7.0, 7.0, -2.0, -2.0];
        assert_eq!(argmax(&values), Some(1));
        assert_eq!(argmin(&values), Some(3));
        assert_eq!(argmax(&[]), None);
    }
}
