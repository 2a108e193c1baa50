//! Recommendation engine: citizen and bank bundles over one assessment.

mod bank;
mod citizen;
mod narrative;

pub use bank::{
    approval_conditions, bank_recommendations, confidence, limit_multiplier, monitoring_flags,
    suggested_limit, BankRecommendations, Confidence, Decision, MonitoringFlag, RateTier,
    RiskLevel,
};
pub use citizen::{
    estimate_percentile, financial_tips, narrative_prompt, next_steps, score_context,
    template_narrative, CitizenRecommendations, NarrativeSource, ScoreContext,
    NATIONAL_AVERAGE_SCORE,
};
pub use narrative::{extract_generated_text, HttpNarrativeClient, NarrativeGenerator};

use crate::config::NarrativeConfig;
use crate::counterfactual::Improvement;
use crate::explain::Explanation;
use crate::features::RawFeatureSet;
use crate::risk::RiskCategory;
use tracing::{debug, warn};

#[derive(Default)]
pub struct RecommendationEngine {
    narrator: Option<Box<dyn NarrativeGenerator>>,
}

impl RecommendationEngine {
    /// Template narratives only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the hosted text-generation service when enabled and a key is set.
    pub fn from_config(config: &NarrativeConfig) -> Self {
        match HttpNarrativeClient::new(config) {
            Some(client) => {
                debug!(url = client.url(), "narrative service configured");
                Self::new().with_narrator(client)
            }
            None => Self::new(),
        }
    }

    pub fn with_narrator(mut self, narrator: impl NarrativeGenerator + 'static) -> Self {
        self.narrator = Some(Box::new(narrator));
        self
    }

    pub fn generate_citizen_recommendations(
        &self,
        score: i32,
        category: RiskCategory,
        explanation: &Explanation,
        improvements: &[Improvement],
    ) -> CitizenRecommendations {
        let (narrative, narrative_source) =
            match self.generated_narrative(score, category, explanation, improvements) {
                Some(text) => (text, NarrativeSource::Generated),
                None => (
                    template_narrative(score, category, explanation, improvements),
                    NarrativeSource::Template,
                ),
            };

        CitizenRecommendations {
            narrative,
            narrative_source,
            tips: financial_tips(category, &explanation.negative),
            next_steps: next_steps(category, improvements),
            score_context: score_context(score, category),
        }
    }

    pub fn generate_bank_recommendations(
        &self,
        _score: i32,
        category: RiskCategory,
        probability_of_default: f64,
        explanation: &Explanation,
        raw: &RawFeatureSet,
    ) -> BankRecommendations {
        bank_recommendations(category, probability_of_default, explanation, raw)
    }

    fn generated_narrative(
        &self,
        score: i32,
        category: RiskCategory,
        explanation: &Explanation,
        improvements: &[Improvement],
    ) -> Option<String> {
        let narrator = self.narrator.as_ref()?;
        let prompt = narrative_prompt(score, category, explanation, improvements);
        match narrator.generate(&prompt) {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("narrative service returned empty text; using template");
                None
            }
            Err(e) => {
                warn!(error = %e, "narrative generation failed; using template");
                None
            }
        }
    }
}
