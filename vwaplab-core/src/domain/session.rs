//! Session partitioning — grouping a bar stream by calendar date.
//!
//! A session is one trading day's contiguous ordered run of minute bars.
//! Sessions are the unit of partitioning: no sequence window or simulation
//! step ever crosses a session boundary. The partition is computed once as
//! explicit immutable borrows into the ordered bar slice, never rebuilt
//! implicitly.

use chrono::NaiveDate;

use super::bar::Bar;

/// One trading day's bars, borrowed from the full ordered series.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    /// Calendar date shared by every bar in `bars`.
    pub date: NaiveDate,
    /// The session's bars, in timestamp order.
    pub bars: &'a [Bar],
}

impl<'a> Session<'a> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Partition an ordered bar slice into sessions by calendar date.
///
/// Consecutive bars sharing a date form one session; the input's order is
/// preserved. Input is assumed date-ordered (the loader enforces strictly
/// increasing timestamps), so each date appears as exactly one contiguous
/// run.
pub fn partition_sessions(bars: &[Bar]) -> Vec<Session<'_>> {
    let mut sessions = Vec::new();
    let mut start = 0;

    for i in 1..=bars.len() {
        let boundary = i == bars.len() || bars[i].date() != bars[start].date();
        if boundary {
            sessions.push(Session {
                date: bars[start].date(),
                bars: &bars[start..i],
            });
            start = i;
        }
    }

    sessions
}
