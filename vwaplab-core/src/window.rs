//! Window geometry — lookback/horizon configuration shared by the sequence
//! builder and the simulator.

use thiserror::Error;

/// Invalid window geometry. Surfaced at startup, before any per-session
/// processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("lookback must be positive")]
    ZeroLookback,
    #[error("horizon must be positive")]
    ZeroHorizon,
}

/// Validated lookback/horizon pair.
///
/// `lookback` is the number of past minutes fed to the scheduler as input;
/// `horizon` is the number of future minutes an allocation schedule covers.
/// Fields are private so the only way to obtain a `WindowConfig` is through
/// the validating constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    lookback: usize,
    horizon: usize,
}

impl WindowConfig {
    /// Construct a validated window; both sides must be positive.
    pub fn new(lookback: usize, horizon: usize) -> Result<Self, WindowError> {
        if lookback == 0 {
            return Err(WindowError::ZeroLookback);
        }
        if horizon == 0 {
            return Err(WindowError::ZeroHorizon);
        }
        Ok(WindowConfig { lookback, horizon })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Shortest session that can contribute a training pair or be simulated.
    pub fn min_session_len(&self) -> usize {
        self.lookback + self.horizon
    }

    /// Training pairs a session of `session_len` bars contributes:
    /// `max(0, len - lookback - horizon + 1)` with a stride-1 window.
    pub fn pair_count(&self, session_len: usize) -> usize {
        session_len.saturating_sub(self.min_session_len() - 1)
    }
}
