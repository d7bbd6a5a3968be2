// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Safe,
    Warning,
    Critical,
    Over,
}

impl Band {
    /// Highest threshold first; lower bounds are inclusive.
    pub fn for_ratio(ratio: Decimal) -> Band {
        if ratio >= Decimal::ONE {
            Band::Over
        } else if ratio >= Decimal::new(9, 1) {
            Band::Critical
        } else if ratio >= Decimal::new(8, 1) {
            Band::Warning
        } else {
            Band::Safe
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Band::Over => "budget exceeded.",
            Band::Critical => "near the limit.",
            Band::Warning => "on track, watch spending.",
            Band::Safe => "under control.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Safe => "safe",
            Band::Warning => "warning",
            Band::Critical => "critical",
            Band::Over => "over",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub ceiling: Decimal,
    pub spent: Decimal,
    /// Not clamped: negative once the ceiling is passed.
    pub remaining: Decimal,
    /// Not clamped: 1.3 means 30% over.
    pub ratio: Decimal,
    pub band: Band,
    pub message: &'static str,
    /// For progress bars only, always within 0..=100.
    pub display_percent: Decimal,
}

impl BudgetProgress {
    /// Whole-number percentage of the unclamped ratio, for labels.
    pub fn percent_display(&self) -> i64 {
        self.ratio
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|p| p.round().to_i64())
            .unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BudgetStatus {
    /// `ceiling` is `None` when no budget was ever set, `Some(0)` for a zero one.
    NotConfigured {
        ceiling: Option<Decimal>,
        spent: Decimal,
    },
    Tracking(BudgetProgress),
}

impl BudgetStatus {
    pub fn ratio(&self) -> Decimal {
        match self {
            BudgetStatus::NotConfigured { .. } => Decimal::ZERO,
            BudgetStatus::Tracking(p) => p.ratio,
        }
    }

    pub fn band(&self) -> Option<Band> {
        match self {
            BudgetStatus::NotConfigured { .. } => None,
            BudgetStatus::Tracking(p) => Some(p.band),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, BudgetStatus::Tracking(_))
    }
}

pub fn status(ceiling: Option<Decimal>, month_to_date_expense: Decimal) -> BudgetStatus {
    let limit = match ceiling {
        Some(c) if c > Decimal::ZERO => c,
        _ => {
            return BudgetStatus::NotConfigured {
                ceiling,
                spent: month_to_date_expense,
            };
        }
    };
    // A ceiling small enough to overflow the division saturates to Over.
    let ratio = month_to_date_expense
        .checked_div(limit)
        .unwrap_or(Decimal::MAX);
    let band = Band::for_ratio(ratio);
    let display_percent = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
        .max(Decimal::ZERO)
        .min(Decimal::ONE_HUNDRED);
    BudgetStatus::Tracking(BudgetProgress {
        ceiling: limit,
        spent: month_to_date_expense,
        remaining: limit
            .checked_sub(month_to_date_expense)
            .unwrap_or(-month_to_date_expense),
        ratio,
        band,
        message: band.message(),
        display_percent,
    })
}
