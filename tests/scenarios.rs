//! End-to-end scoring scenarios through the public assessment API.

use chrono::{Duration, NaiveDate};
use ledgerscore::{
    assessment::{ApplicantInput, Assessor, BatchEntry},
    counterfactual::CounterfactualGenerator,
    error::{NarrativeError, Result},
    features::FeatureExtractor,
    ingest::{parse_csv, Transaction},
    model::{Attributor, Classifier, ModelArtifacts, StandardScaler},
    recommend::{Confidence, Decision, NarrativeGenerator, NarrativeSource, RecommendationEngine},
    risk::{PredictionSource, RiskCategory, RiskEngine},
};
use std::sync::Arc;

/// A classifier that is always confident the borrower will repay.
struct Optimistic;

impl Classifier for Optimistic {
    fn predict_probability(&self, _scaled: &[f64]) -> Result<f64> {
        Ok(0.01)
    }
}

struct Contributions(Vec<f64>);

impl Attributor for Contributions {
    fn attribute(&self, _scaled: &[f64]) -> Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}

struct Timeout;

impl NarrativeGenerator for Timeout {
    fn generate(&self, _prompt: &str) -> std::result::Result<String, NarrativeError> {
        Err(NarrativeError::Malformed("timed out".into()))
    }
}

struct Scripted;

impl NarrativeGenerator for Scripted {
    fn generate(&self, prompt: &str) -> std::result::Result<String, NarrativeError> {
        assert!(prompt.contains("Credit Score:"));
        Ok("Your finances look healthy.".into())
    }
}

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
}

fn optimistic_assessor() -> Assessor {
    let artifacts = ModelArtifacts::empty()
        .with_classifier(Optimistic)
        .with_scaler(StandardScaler::identity());
    Assessor::new(Arc::new(artifacts), RecommendationEngine::new())
}

/// Salary every 15 days with balance near 100, spending into the red between paydays.
fn risky_overdrafter() -> Vec<Transaction> {
    let mut txs = Vec::new();
    for i in 0..4 {
        txs.push(Transaction::credit(day(i * 15), 2000.0, 100.0).with_category("salary"));
    }
    for i in 0..10 {
        txs.push(Transaction::debit(day(i * 5 + 2), 50.0, -50.0).with_category("shopping"));
    }
    txs
}

fn steady_saver() -> Vec<Transaction> {
    let mut txs = Vec::new();
    let mut balance = 3000.0;
    for month in 0..6 {
        balance += 4000.0;
        txs.push(Transaction::credit(day(month * 30), 4000.0, balance).with_category("salary"));
        for (offset, amount, category) in [(3, 1200.0, "rent"), (9, 300.0, "utilities"), (16, 400.0, "groceries")] {
            balance -= amount;
            txs.push(Transaction::debit(day(month * 30 + offset), amount, balance).with_category(category));
        }
    }
    txs
}

#[test]
fn risky_overdrafter_scores_below_700_even_when_model_is_fooled() {
    let txs = risky_overdrafter();
    let fv = FeatureExtractor::new().extract(&txs);
    assert!(fv.raw.overdraft_frequency > 0.2);
    assert!(fv.raw.payment_consistency <= 15.0);

    for assessor in [optimistic_assessor(), Assessor::offline()] {
        let a = assessor.assess_citizen(&txs).unwrap();
        assert!(a.score < 700, "score {}", a.score);
        assert_eq!(a.category, RiskCategory::Poor);
    }
}

#[test]
fn two_month_gap_is_late_payment() {
    let txs = vec![
        Transaction::credit(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1000.0, 1000.0),
        Transaction::credit(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 1000.0, 2000.0),
    ];
    let fv = FeatureExtractor::new().extract(&txs);
    assert!(fv.features.pay_0 >= 1);

    let a = optimistic_assessor().assess_citizen(&txs).unwrap();
    assert_eq!(a.source, PredictionSource::Model);
    assert!(matches!(a.category, RiskCategory::Fair | RiskCategory::Poor));
}

#[test]
fn irregular_frequent_income_is_on_time() {
    let mut txs = Vec::new();
    let mut offset = 0;
    for gap in [7, 21, 11, 28, 14, 30, 9] {
        offset += gap;
        txs.push(Transaction::credit(day(offset), 800.0, 800.0).with_category("freelance"));
    }
    let fv = FeatureExtractor::new().extract(&txs);
    assert!(fv.raw.payment_consistency < 35.0);
    assert_eq!(fv.features.pay_0, -1);
}

#[test]
fn empty_input_gives_default_profile_and_valid_prediction() {
    let fv = FeatureExtractor::new().extract(&[]);
    assert_eq!(fv.raw.transaction_count, 0);
    assert_eq!(fv.features.limit_bal, 50_000.0);
    let r = RiskEngine::new(Arc::new(ModelArtifacts::empty())).predict(&fv);
    assert!((300..=850).contains(&r.score));
    assert!((0.0..=1.0).contains(&r.probability_of_default));
}

#[test]
fn improvements_sorted_and_bounded() {
    let txs = risky_overdrafter();
    let engine = RiskEngine::new(Arc::new(ModelArtifacts::empty()));
    let p = engine.predict(&FeatureExtractor::new().extract(&txs));
    let all = CounterfactualGenerator.generate_improvements(&p.feature_values, &p.raw_features, 845);
    assert!(!all.is_empty());
    assert!(all.windows(2).all(|w| w[0].impact_value >= w[1].impact_value));
    assert!(all.iter().all(|i| i.potential_score <= 850));

    let a = Assessor::offline().assess_citizen(&txs).unwrap();
    assert!(a.improvements.len() <= 5);
}

#[test]
fn steady_saver_is_approved_with_high_confidence() {
    let a = optimistic_assessor()
        .assess_applicant("APP-STEADY", &steady_saver())
        .unwrap();
    assert_eq!(a.applicant_id, "APP-STEADY");
    assert_eq!(a.recommendation.decision, Decision::Approve);
    assert_eq!(a.recommendation.confidence, Confidence::High);
    assert!(a.recommendation.suggested_limit > 0);
    assert!(a.recommendation.conditions.is_empty());
}

#[test]
fn few_transactions_mean_low_confidence() {
    let txs: Vec<Transaction> = steady_saver().into_iter().take(4).collect();
    let a = Assessor::offline().assess_applicant("APP-THIN", &txs).unwrap();
    assert_eq!(a.recommendation.confidence, Confidence::Low);
}

#[test]
fn csv_ingestion_feeds_the_pipeline() {
    let csv = "Transaction_Date,Transaction_Amount,Category\n\
               2024-01-01,2500,salary\n\
               2024-01-04,-900,rent\n\
               2024-01-31,2500,salary\n\
               2024-02-03,-900,rent\n\
               2024-02-10,-$120.50,utilities\n";
    let txs = parse_csv(csv).unwrap();
    assert_eq!(txs.len(), 5);
    let a = Assessor::offline().assess_citizen(&txs).unwrap();
    assert_eq!(a.category, RiskCategory::from_score(a.score));
}

#[test]
fn batch_reports_failures_without_aborting() {
    let applicants: Vec<ApplicantInput> = serde_json::from_value(serde_json::json!([
        {
            "applicant_id": "APP-1",
            "transactions": [
                {"date": "2024-01-01", "amount": 3000, "type": "credit", "category": "salary", "balance": 3000},
                {"date": "2024-01-05", "amount": 800, "type": "debit", "category": "rent", "balance": 2200},
                {"date": "2024-01-31", "amount": 3000, "type": "credit", "category": "salary", "balance": 5200}
            ]
        },
        { "applicant_id": "APP-2", "transactions": [] },
        { "applicant_id": "APP-3", "csv_content": "date,memo\n2024-01-01,hello\n" },
        { "transactions": [{"date": "2024-01-01", "amount": "-75.00"}] }
    ]))
    .unwrap();

    let batch = Assessor::offline().assess_batch(&applicants);
    assert_eq!(batch.results.len(), 4);
    assert_eq!(batch.summary.total, 2);
    assert_eq!(batch.summary.failed, 2);
    assert_eq!(
        batch.summary.approved + batch.summary.conditional + batch.summary.review,
        batch.summary.total
    );

    match &batch.results[1] {
        BatchEntry::Failed { applicant_id, error } => {
            assert_eq!(applicant_id, "APP-2");
            assert!(error.contains("no transaction data"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(matches!(&batch.results[2], BatchEntry::Failed { .. }));
    match &batch.results[3] {
        BatchEntry::Assessed(r) => assert_eq!(r.applicant_id, "UNKNOWN"),
        other => panic!("expected result, got {:?}", other),
    }
}

#[test]
fn narrative_service_is_optional() {
    let artifacts = Arc::new(ModelArtifacts::empty());
    let txs = steady_saver();

    let down = Assessor::new(artifacts.clone(), RecommendationEngine::new().with_narrator(Timeout));
    let a = down.assess_citizen(&txs).unwrap();
    assert_eq!(a.recommendations.narrative_source, NarrativeSource::Template);
    assert!(a.recommendations.narrative.contains(&a.score.to_string()));

    let up = Assessor::new(artifacts, RecommendationEngine::new().with_narrator(Scripted));
    let a = up.assess_citizen(&txs).unwrap();
    assert_eq!(a.recommendations.narrative, "Your finances look healthy.");
    assert_eq!(a.recommendations.narrative_source, NarrativeSource::Generated);
}

#[test]
fn attribution_explanations_expose_importance() {
    let mut weights = vec![0.0; 11];
    weights[0] = -0.6; // LIMIT_BAL
    weights[5] = 0.4; // BILL_AMT1
    let artifacts = ModelArtifacts::empty()
        .with_classifier(Optimistic)
        .with_attributor(Contributions(weights))
        .with_scaler(StandardScaler::identity());
    let assessor = Assessor::new(Arc::new(artifacts), RecommendationEngine::new());

    let a = assessor.assess_applicant("APP-ATTR", &steady_saver()).unwrap();
    assert_eq!(a.feature_importance.len(), 11);
    assert_eq!(a.feature_importance["LIMIT_BAL"], -0.6);
    assert!(a.positive_factors[0].starts_with("Good credit limit of $"));
    assert_eq!(a.risk_factors[0], "High outstanding balance");
    assert!(a.positive_factors.len() <= 3 && a.risk_factors.len() <= 3);
}
