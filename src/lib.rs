//! ledgerscore: credit scoring from bank-account transactions.
//!
//! Pipeline stages, leaves first:
//! - [`ingest`]: Transaction model, JSON record and delimited-text adapters
//! - [`features`]: Behavioral metrics and classifier-native feature mapping
//! - [`model`]: ONNX classifier, scaler and attribution artifacts
//! - [`risk`]: Probability → score, override caps, categories
//! - [`explain`]: Attribution or heuristic factor explanations
//! - [`counterfactual`]: Improvement suggestions with point impact
//! - [`recommend`]: Citizen and bank recommendation bundles
//! - [`assessment`]: Request orchestration and batch assessment
//! - [`logging`]: Structured logging and report lines

pub mod assessment;
pub mod config;
pub mod counterfactual;
pub mod error;
pub mod explain;
pub mod features;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod recommend;
pub mod risk;

pub use assessment::{ApplicantInput, Assessor, BankAssessment, BatchAssessment, CitizenAssessment};
pub use config::ScorerConfig;
pub use counterfactual::{CounterfactualGenerator, Improvement};
pub use error::{Result, ScoringError};
pub use explain::{Explainer, Explanation};
pub use features::{FeatureExtractor, ModelFeatureVector, RawFeatureSet};
pub use ingest::{parse_csv, Transaction, TransactionType};
pub use logging::StructuredLogger;
pub use model::ModelArtifacts;
pub use recommend::RecommendationEngine;
pub use risk::{PredictionResult, RiskCategory, RiskEngine};
