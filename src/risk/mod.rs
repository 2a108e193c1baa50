//! Risk prediction: probability → score → capped score → category.

mod category;
mod engine;

pub use category::{probability_to_score, RiskCategory, SCORE_MAX, SCORE_MIN};
pub use engine::{
    apply_overrides, heuristic_probability, PredictionResult, PredictionSource, RiskEngine,
    ScoreCap,
};
