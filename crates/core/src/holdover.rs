//! Holdover lookback window
//!
//! Drier fuel (higher Drought Code) lets a lightning fire smoulder longer before it is
//! detected, so the replay for a query day reaches further back. In automatic mode the window
//! grows linearly in two regimes that meet at DC 200:
//!
//! ```text
//! DC < 200:   round(DC * 3/200 + 4)        4..7 days
//! DC >= 200:  round((DC - 200) * 7/300 + 7)  7..14 days (capped)
//! ```
//!
//! Whatever the mode, the window never reaches back before the first day of the season.

use serde::{Deserialize, Serialize};

/// Longest automatic window in days.
pub const MAX_AUTO_WINDOW: usize = 14;

/// DC at which the automatic formula switches regime.
const DC_REGIME_SPLIT: f64 = 200.0;

/// How the lookback window is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldoverMode {
    /// Derive the window from the cell's Drought Code on the query day
    #[default]
    Automatic,
    /// Use a fixed number of days for every cell
    Fixed(u32),
}

impl HoldoverMode {
    /// Interpret a signed lookback setting: negative selects automatic mode.
    pub fn from_lookback_days(days: i64) -> Self {
        match u32::try_from(days) {
            Ok(days) => Self::Fixed(days),
            Err(_) if days < 0 => Self::Automatic,
            Err(_) => Self::Fixed(u32::MAX),
        }
    }
}

/// Resolves per-cell lookback windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldoverWindowResolver {
    mode: HoldoverMode,
}

impl HoldoverWindowResolver {
    pub fn new(mode: HoldoverMode) -> Self {
        Self { mode }
    }

    /// Window length in days for a cell with Drought Code `dc` on season day `today_offset`.
    ///
    /// The replay covers offsets `today_offset - window ..= today_offset`.
    pub fn resolve(&self, dc: u32, today_offset: usize) -> usize {
        let window = match self.mode {
            HoldoverMode::Automatic => auto_window(dc),
            HoldoverMode::Fixed(days) => days as usize,
        };
        window.min(today_offset)
    }
}

/// Automatic window from Drought Code, rounded half up and capped.
pub fn auto_window(dc: u32) -> usize {
    let dc = f64::from(dc);
    let days = if dc < DC_REGIME_SPLIT {
        dc * 3.0 / 200.0 + 4.0
    } else {
        (dc - DC_REGIME_SPLIT) * 7.0 / 300.0 + 7.0
    };
    ((days + 0.5).floor() as usize).min(MAX_AUTO_WINDOW)
}
