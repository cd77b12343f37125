//! Bar — the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One minute's market observation for a single instrument.
///
/// `avg_price` is the average traded price over the minute and `volume` the
/// total market volume. Bars are expected strictly increasing in `timestamp`
/// and gap-free within a session; the loader enforces ordering, gap-freeness
/// is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub avg_price: f64,
    pub volume: f64,
}

impl Bar {
    /// Calendar date of this bar, the session partition key.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Basic sanity check: finite positive price, finite non-negative volume.
    pub fn is_sane(&self) -> bool {
        self.avg_price.is_finite()
            && self.avg_price > 0.0
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}
