//! Session VWAP benchmark.

use crate::domain::Bar;

/// Volume-weighted average price over a bar slice:
/// `sum(price_i * volume_i) / sum(volume_i)`.
///
/// Returns `None` when the benchmark is undefined: empty slice, zero (or
/// negative) total volume, or a non-finite result from corrupt inputs.
/// Callers treat `None` as "skip this session", never as an error.
pub fn session_vwap(bars: &[Bar]) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }

    let mut traded_value = 0.0;
    let mut total_volume = 0.0;
    for bar in bars {
        traded_value += bar.avg_price * bar.volume;
        total_volume += bar.volume;
    }

    if total_volume <= 0.0 {
        return None;
    }

    let vwap = traded_value / total_volume;
    vwap.is_finite().then_some(vwap)
}
