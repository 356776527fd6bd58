//! Technical indicator helpers.
//!
//! All functions return a series aligned with the input; positions that
//! lack enough history hold `f64::NAN`. Callers gate on history length
//! before trusting the tail values.

/// Exponential moving average with the standard 2/(n+1) smoothing factor.
pub fn ema(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    for (i, &v) in values.iter().enumerate() {
        prev = if i == 0 { v } else { v * k + prev * (1.0 - k) };
        out.push(if i + 1 < window { f64::NAN } else { prev });
    }
    out
}

/// Relative Strength Index with Wilder smoothing.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if closes.len() <= period || period == 0 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += -delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// Stochastic oscillator of an arbitrary series (%K and its `smooth`-period
/// SMA, %D). Applied to an RSI series this yields the stochastic RSI.
pub fn stochastic(series: &[f64], window: usize, smooth: usize) -> (Vec<f64>, Vec<f64>) {
    let mut k_series = vec![f64::NAN; series.len()];

    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let visible: Vec<f64> = series[start..=i]
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if visible.len() < 2 || !series[i].is_finite() {
            continue;
        }

        let hi = visible.iter().copied().fold(f64::MIN, f64::max);
        let lo = visible.iter().copied().fold(f64::MAX, f64::min);
        k_series[i] = if hi == lo {
            50.0
        } else {
            (series[i] - lo) / (hi - lo) * 100.0
        };
    }

    let mut d_series = vec![f64::NAN; series.len()];
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(smooth);
        let visible: Vec<f64> = k_series[start..=i]
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if !visible.is_empty() {
            d_series[i] = visible.iter().sum::<f64>() / visible.len() as f64;
        }
    }

    (k_series, d_series)
}

/// Volume relative to its simple moving average.
pub fn volume_ratio(volumes: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; volumes.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..volumes.len() {
        let sma: f64 = volumes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
        if sma > 0.0 {
            out[i] = volumes[i] / sma;
        }
    }
    out
}
