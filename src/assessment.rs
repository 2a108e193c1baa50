//! One assessment request end to end: transactions → features → prediction →
//! explanation and improvements → role-specific recommendations.

use crate::config::ScorerConfig;
use crate::counterfactual::{CounterfactualGenerator, Improvement, MAX_SUGGESTIONS};
use crate::error::{Result, ScoringError};
use crate::explain::Explainer;
use crate::features::{FeatureExtractor, RawFeatureSet};
use crate::ingest::{from_records, parse_csv, Transaction, TransactionRecord};
use crate::model::{init_shared, ModelArtifacts};
use crate::recommend::{
    limit_multiplier, BankRecommendations, CitizenRecommendations, Confidence, Decision,
    RateTier, RecommendationEngine, RiskLevel,
};
use crate::risk::{PredictionResult, PredictionSource, RiskCategory, RiskEngine};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    /// Short payment gaps without overdrafts read as improving; gaps over
    /// 40 days as declining.
    pub fn from_raw(raw: &RawFeatureSet) -> Self {
        if raw.payment_consistency < 20.0 && raw.overdraft_frequency == 0.0 {
            Trend::Improving
        } else if raw.payment_consistency > 40.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

/// Rewards go to Good-or-better profiles that are not trending down.
pub fn reward_eligible(category: RiskCategory, trend: Trend) -> bool {
    category >= RiskCategory::Good && trend != Trend::Declining
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factors {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenAssessment {
    pub assessment_id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub score: i32,
    pub category: RiskCategory,
    pub probability_of_default: f64,
    pub trend: Trend,
    pub reward_eligible: bool,
    pub explanations: Factors,
    pub improvements: Vec<Improvement>,
    pub recommendations: CitizenRecommendations,
    pub source: PredictionSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAssessment {
    pub assessment_id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub applicant_id: String,
    pub score: i32,
    pub category: RiskCategory,
    pub risk_level: RiskLevel,
    pub probability_of_default: f64,
    pub recommendation: BankRecommendations,
    pub risk_factors: Vec<String>,
    pub positive_factors: Vec<String>,
    pub feature_importance: BTreeMap<String, f64>,
    pub source: PredictionSource,
}

/// One applicant in a batch: JSON records or delimited text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantInput {
    #[serde(default)]
    pub applicant_id: Option<String>,
    #[serde(default)]
    pub transactions: Option<Vec<TransactionRecord>>,
    #[serde(default)]
    pub csv_content: Option<String>,
}

impl ApplicantInput {
    pub fn id(&self) -> &str {
        self.applicant_id.as_deref().unwrap_or("UNKNOWN")
    }

    /// Delimited text wins over records when both are present.
    pub fn parse_transactions(&self) -> Result<Vec<Transaction>> {
        let transactions = match (&self.csv_content, &self.transactions) {
            (Some(text), _) => parse_csv(text)?,
            (None, Some(records)) => from_records(records.clone()),
            (None, None) => return Err(ScoringError::NoTransactions),
        };
        if transactions.is_empty() {
            return Err(ScoringError::NoTransactions);
        }
        Ok(transactions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub applicant_id: String,
    pub score: i32,
    pub risk_level: RiskLevel,
    pub decision: Decision,
    pub suggested_limit: u64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Assessed(BatchResult),
    Failed { applicant_id: String, error: String },
}

/// `total` counts assessed applicants; failures are counted separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub approved: usize,
    pub conditional: usize,
    pub review: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAssessment {
    pub results: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryThreshold {
    pub category: RiskCategory,
    pub min_score: i32,
    pub max_score: i32,
    pub decision: Decision,
    pub rate_tier: RateTier,
    pub limit_multiplier: f64,
}

/// Fixed decision criteria per category, best first.
pub fn thresholds() -> Vec<CategoryThreshold> {
    RiskCategory::ALL
        .into_iter()
        .rev()
        .map(|category| {
            let (min_score, max_score) = category.range();
            CategoryThreshold {
                category,
                min_score,
                max_score,
                decision: Decision::for_category(category),
                rate_tier: RateTier::for_category(category),
                limit_multiplier: limit_multiplier(category),
            }
        })
        .collect()
}

pub struct Assessor {
    extractor: FeatureExtractor,
    engine: RiskEngine,
    explainer: Explainer,
    counterfactual: CounterfactualGenerator,
    recommender: RecommendationEngine,
}

impl Assessor {
    pub fn new(artifacts: Arc<ModelArtifacts>, recommender: RecommendationEngine) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            engine: RiskEngine::new(artifacts.clone()),
            explainer: Explainer::new(artifacts),
            counterfactual: CounterfactualGenerator,
            recommender,
        }
    }

    /// Installs the process-wide artifacts from config and wires the narrative service.
    pub fn from_config(config: &ScorerConfig) -> Self {
        let artifacts = init_shared(&config.artifacts);
        let assessor = Self::new(artifacts, RecommendationEngine::from_config(&config.narrative));
        info!(
            explanation = assessor.explainer.strategy_name(),
            "assessor ready"
        );
        assessor
    }

    /// Heuristic scoring with template narratives; no artifacts or network.
    pub fn offline() -> Self {
        Self::new(Arc::new(ModelArtifacts::empty()), RecommendationEngine::new())
    }

    fn predict(&self, transactions: &[Transaction]) -> Result<PredictionResult> {
        if transactions.is_empty() {
            return Err(ScoringError::NoTransactions);
        }
        let fv = self.extractor.extract(transactions);
        Ok(self.engine.predict(&fv))
    }

    pub fn assess_citizen(&self, transactions: &[Transaction]) -> Result<CitizenAssessment> {
        let prediction = self.predict(transactions)?;
        let values = &prediction.feature_values;
        let raw = &prediction.raw_features;

        let explanation = self
            .explainer
            .explain(&prediction.feature_vector, values, raw);
        let mut improvements =
            self.counterfactual
                .generate_improvements(values, raw, prediction.score);
        let recommendations = self.recommender.generate_citizen_recommendations(
            prediction.score,
            prediction.category,
            &explanation,
            &improvements,
        );
        improvements.truncate(MAX_SUGGESTIONS);

        let trend = Trend::from_raw(raw);
        let assessment = CitizenAssessment {
            assessment_id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            score: prediction.score,
            category: prediction.category,
            probability_of_default: prediction.probability_of_default,
            trend,
            reward_eligible: reward_eligible(prediction.category, trend),
            explanations: Factors {
                positive: explanation.positive,
                negative: explanation.negative,
            },
            improvements,
            recommendations,
            source: prediction.source,
        };
        info!(
            assessment_id = %assessment.assessment_id,
            score = assessment.score,
            category = %assessment.category,
            source = ?assessment.source,
            "citizen assessment"
        );
        Ok(assessment)
    }

    pub fn assess_applicant(
        &self,
        applicant_id: &str,
        transactions: &[Transaction],
    ) -> Result<BankAssessment> {
        let prediction = self.predict(transactions)?;
        let raw = &prediction.raw_features;
        let explanation =
            self.explainer
                .explain(&prediction.feature_vector, &prediction.feature_values, raw);
        let recommendation = self.recommender.generate_bank_recommendations(
            prediction.score,
            prediction.category,
            prediction.probability_of_default,
            &explanation,
            raw,
        );

        let assessment = BankAssessment {
            assessment_id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            applicant_id: applicant_id.to_string(),
            score: prediction.score,
            category: prediction.category,
            risk_level: recommendation.risk_level,
            probability_of_default: prediction.probability_of_default,
            recommendation,
            risk_factors: explanation.negative,
            positive_factors: explanation.positive,
            feature_importance: explanation.feature_importance,
            source: prediction.source,
        };
        info!(
            assessment_id = %assessment.assessment_id,
            applicant_id,
            score = assessment.score,
            decision = ?assessment.recommendation.decision,
            risk_level = ?assessment.risk_level,
            "applicant assessment"
        );
        Ok(assessment)
    }

    /// Every applicant gets an entry; one applicant's failure never stops the rest.
    pub fn assess_batch(&self, applicants: &[ApplicantInput]) -> BatchAssessment {
        let mut results = Vec::with_capacity(applicants.len());
        let mut summary = BatchSummary::default();

        for applicant in applicants {
            let id = applicant.id().to_string();
            let outcome = applicant
                .parse_transactions()
                .and_then(|txs| self.assess_applicant(&id, &txs));
            match outcome {
                Ok(a) => {
                    let rec = &a.recommendation;
                    match rec.decision {
                        Decision::Approve => summary.approved += 1,
                        Decision::ApproveWithConditions => summary.conditional += 1,
                        Decision::ManualReview => summary.review += 1,
                    }
                    summary.total += 1;
                    results.push(BatchEntry::Assessed(BatchResult {
                        applicant_id: id,
                        score: a.score,
                        risk_level: a.risk_level,
                        decision: rec.decision,
                        suggested_limit: rec.suggested_limit,
                        confidence: rec.confidence,
                    }));
                }
                Err(e) => {
                    warn!(applicant_id = %id, error = %e, "batch applicant failed");
                    summary.failed += 1;
                    results.push(BatchEntry::Failed {
                        applicant_id: id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            total = summary.total,
            approved = summary.approved,
            conditional = summary.conditional,
            review = summary.review,
            failed = summary.failed,
            "batch assessment"
        );
        BatchAssessment { results, summary }
    }
}

/// Two months of salary, rent, utilities and groceries for demo runs.
pub fn sample_transactions() -> Vec<Transaction> {
    let rows: [(u32, u32, f64, &str, bool, f64); 8] = [
        (1, 1, 5000.0, "salary", true, 5000.0),
        (1, 5, 1200.0, "rent", false, 3800.0),
        (1, 10, 200.0, "utilities", false, 3600.0),
        (1, 15, 500.0, "groceries", false, 3100.0),
        (2, 1, 5000.0, "salary", true, 8100.0),
        (2, 5, 1200.0, "rent", false, 6900.0),
        (2, 10, 200.0, "utilities", false, 6700.0),
        (2, 15, 450.0, "groceries", false, 6250.0),
    ];
    rows.iter()
        .filter_map(|&(month, day, amount, category, credit, balance)| {
            let date = NaiveDate::from_ymd_opt(2024, month, day)?;
            let tx = if credit {
                Transaction::credit(date, amount, balance)
            } else {
                Transaction::debit(date, amount, balance)
            };
            Some(tx.with_category(category))
        })
        .collect()
}
