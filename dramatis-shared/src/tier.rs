//! Cast importance tiers.
//!
//! A member's tier is derived from the share of episodes they appear in,
//! compared against an ordered set of cut points. The thresholds are
//! validated once at construction; classification itself is infallible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cut point for the main cast.
pub const DEFAULT_THRESH_MAIN: f64 = 0.700;

/// Default cut point for side characters.
pub const DEFAULT_THRESH_SIDE: f64 = 0.100;

/// Default cut point for recurring characters.
pub const DEFAULT_THRESH_RECURRING: f64 = 0.005;

/// Importance tier of a cast member, from most to least prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastTier {
    Main,
    Side,
    Recurring,
    Guest,
}

/// Errors raised when constructing tier thresholds.
#[derive(Debug, Clone, Error)]
pub enum TierError {
    /// Thresholds must satisfy 0 < recurring < side < main < 1.
    #[error("Invalid tier thresholds: recurring={recurring}, side={side}, main={main}")]
    InvalidThresholds {
        recurring: f64,
        side: f64,
        main: f64,
    },
}

/// Ordered cut points for tier classification.
///
/// Invariant (checked once at construction): 0 < recurring < side <
/// main < 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    main: f64,
    side: f64,
    recurring: f64,
}

impl TierThresholds {
    /// Create validated thresholds.
    pub fn new(main: f64, side: f64, recurring: f64) -> Result<Self, TierError> {
        if !(0.0 < recurring && recurring < side && side < main && main < 1.0) {
            return Err(TierError::InvalidThresholds {
                recurring,
                side,
                main,
            });
        }
        Ok(Self {
            main,
            side,
            recurring,
        })
    }

    /// Classify a member by the share of episodes they appear in.
    ///
    /// `ratio = count / total` (0 if `total` is 0); the first threshold
    /// met-or-exceeded wins, below all yields [`CastTier::Guest`].
    pub fn classify(&self, count: usize, total: usize) -> CastTier {
        let ratio = if total > 0 {
            count as f64 / total as f64
        } else {
            0.0
        };

        if ratio >= self.main {
            CastTier::Main
        } else if ratio >= self.side {
            CastTier::Side
        } else if ratio >= self.recurring {
            CastTier::Recurring
        } else {
            CastTier::Guest
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        // The defaults satisfy the construction invariant.
        Self {
            main: DEFAULT_THRESH_MAIN,
            side: DEFAULT_THRESH_SIDE,
            recurring: DEFAULT_THRESH_RECURRING,
        }
    }
}
