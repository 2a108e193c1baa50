//! Score range and the fixed category table.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCORE_MIN: i32 = 300;
pub const SCORE_MAX: i32 = 850;

/// Convert default probability to a score: `300 + (1 - p) * 550`, rounded.
pub fn probability_to_score(probability_of_default: f64) -> i32 {
    let p = probability_of_default.clamp(0.0, 1.0);
    let score = SCORE_MIN as f64 + (1.0 - p) * (SCORE_MAX - SCORE_MIN) as f64;
    (score.round() as i32).clamp(SCORE_MIN, SCORE_MAX)
}

/// Risk category, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Poor,
    Fair,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Excellent,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Poor,
        RiskCategory::Fair,
        RiskCategory::Good,
        RiskCategory::VeryGood,
        RiskCategory::Excellent,
    ];

    /// Inclusive score range. Ranges are contiguous and cover 300..=850.
    pub fn range(&self) -> (i32, i32) {
        match self {
            RiskCategory::Excellent => (800, 850),
            RiskCategory::VeryGood => (740, 799),
            RiskCategory::Good => (670, 739),
            RiskCategory::Fair => (580, 669),
            RiskCategory::Poor => (300, 579),
        }
    }

    /// Scores outside 300..=850 are clamped first.
    pub fn from_score(score: i32) -> Self {
        let score = score.clamp(SCORE_MIN, SCORE_MAX);
        Self::ALL
            .into_iter()
            .rev()
            .find(|c| score >= c.range().0)
            .unwrap_or(RiskCategory::Poor)
    }

    /// Next-better category; `None` at the top.
    pub fn next(&self) -> Option<Self> {
        match self {
            RiskCategory::Poor => Some(RiskCategory::Fair),
            RiskCategory::Fair => Some(RiskCategory::Good),
            RiskCategory::Good => Some(RiskCategory::VeryGood),
            RiskCategory::VeryGood => Some(RiskCategory::Excellent),
            RiskCategory::Excellent => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Excellent => "Excellent",
            RiskCategory::VeryGood => "Very Good",
            RiskCategory::Good => "Good",
            RiskCategory::Fair => "Fair",
            RiskCategory::Poor => "Poor",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
