//! SessionRecord — one evaluated session's result row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of simulating one session: realized execution VWAP against the
/// session benchmark.
///
/// `slippage` is signed (`model_vwap - benchmark_vwap`); for a buy order,
/// negative slippage means the schedule beat the market. `slippage_bps` is
/// the same difference expressed in basis points of the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: NaiveDate,
    pub benchmark_vwap: f64,
    pub model_vwap: f64,
    pub slippage: f64,
    pub slippage_bps: f64,
}

impl SessionRecord {
    /// Build a record from the two VWAPs, deriving the slippage columns.
    ///
    /// `benchmark_vwap` must be nonzero; the simulator guarantees this by
    /// skipping sessions with an undefined benchmark before ever reaching
    /// record construction.
    pub fn from_vwaps(date: NaiveDate, benchmark_vwap: f64, model_vwap: f64) -> Self {
        let slippage = model_vwap - benchmark_vwap;
        SessionRecord {
            date,
            benchmark_vwap,
            model_vwap,
            slippage,
            slippage_bps: slippage / benchmark_vwap * 10_000.0,
        }
    }
}
