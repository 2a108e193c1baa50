//! Consumer-facing bundle: narrative, tips, next steps and score context.

use crate::counterfactual::Improvement;
use crate::explain::{Explanation, NO_NEGATIVE_FACTORS};
use crate::risk::RiskCategory;
use serde::{Deserialize, Serialize};

pub const NATIONAL_AVERAGE_SCORE: i32 = 711;
const MAX_TIPS: usize = 5;
const MAX_STEPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Generated,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContext {
    pub national_average: i32,
    pub your_percentile: u8,
    pub category_range: (i32, i32),
    pub points_to_next_category: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecommendations {
    pub narrative: String,
    pub narrative_source: NarrativeSource,
    pub tips: Vec<String>,
    pub next_steps: Vec<String>,
    pub score_context: ScoreContext,
}

/// Prompt for the text-generation service.
pub fn narrative_prompt(
    score: i32,
    category: RiskCategory,
    explanation: &Explanation,
    improvements: &[Improvement],
) -> String {
    let positive = if explanation.positive.is_empty() {
        "Good standing".to_string()
    } else {
        explanation.positive.join(", ")
    };
    let negative = if explanation.negative.is_empty() {
        "None significant".to_string()
    } else {
        explanation.negative.join(", ")
    };
    let top = improvements
        .first()
        .map(|i| i.action.as_str())
        .unwrap_or("Maintain current habits");
    format!(
        "Given the following credit assessment:\n\
         - Credit Score: {score}\n\
         - Risk Category: {category}\n\
         - Positive Factors: {positive}\n\
         - Negative Factors: {negative}\n\
         - Top Improvement: {top}\n\n\
         Generate a 2-3 sentence plain-language explanation suitable for a borrower \
         with limited financial literacy. Be encouraging but honest."
    )
}

/// Deterministic per-category narrative.
pub fn template_narrative(
    score: i32,
    category: RiskCategory,
    explanation: &Explanation,
    improvements: &[Improvement],
) -> String {
    let top_action = improvements.first().map(|i| i.action.as_str());
    match category {
        RiskCategory::Excellent => format!(
            "Outstanding work! Your credit score of {score} places you in the top tier of financial health. \
             You've demonstrated exceptional reliability and credit management. \
             Lenders view you as a VIP - expect approval for premium cards and the lowest interest rates available."
        ),
        RiskCategory::VeryGood => format!(
            "Great job! Your score of {score} is well above average. \
             You are effectively managing your credit and are in a strong position. \
             You will qualify for most loans at competitive rates. \
             With just a bit more {}, you could reach the 'Excellent' tier.",
            top_action
                .map(str::to_lowercase)
                .unwrap_or_else(|| "consistency".to_string())
        ),
        RiskCategory::Good => format!(
            "You are on the right track! A score of {score} is solid and shows you are a responsible borrower. \
             Most lenders will see you as a safe bet. \
             To unlock the very best rates, focus on {}.",
            top_action
                .map(str::to_lowercase)
                .unwrap_or_else(|| "lowering your utilization slightly".to_string())
        ),
        RiskCategory::Fair => format!(
            "You have a foundation to build on. Your score of {score} means you can get credit, though it might come with higher rates. \
             The good news is that your score is dynamic. \
             Addressing {} is your quickest path to a better score.",
            explanation
                .negative
                .first()
                .filter(|f| f.as_str() != NO_NEGATIVE_FACTORS)
                .map(|f| f.to_lowercase())
                .unwrap_or_else(|| "recent payment gaps".to_string())
        ),
        RiskCategory::Poor => format!(
            "Your score of {score} suggests currently high financial stress, but this is temporary if you take action. \
             The most impactful change you can make right now is: {}. \
             Small, consistent steps will start rebuilding your score immediately.",
            top_action.unwrap_or("avoiding any new missed payments")
        ),
    }
}

fn push_distinct(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|t| t == item) {
        list.push(item.to_string());
    }
}

/// Up to five distinct tips, category tips first, then tips keyed on the
/// negative factors.
pub fn financial_tips(category: RiskCategory, negative: &[String]) -> Vec<String> {
    let mut tips = Vec::new();

    if matches!(category, RiskCategory::Poor | RiskCategory::Fair) {
        push_distinct(&mut tips, "Set up automatic payments to avoid missing due dates");
        push_distinct(
            &mut tips,
            "Check your credit report annually for errors at annualcreditreport.com",
        );
    }
    if category == RiskCategory::Poor {
        push_distinct(&mut tips, "Consider a secured credit card to rebuild credit");
        push_distinct(&mut tips, "Keep credit utilization below 30% of your limit");
    }

    for factor in negative {
        let f = factor.to_lowercase();
        if f.contains("payment") || f.contains("late") {
            push_distinct(
                &mut tips,
                "Payment history is the biggest factor - prioritize on-time payments",
            );
        }
        if f.contains("utilization") || f.contains("balance") {
            push_distinct(&mut tips, "High balances hurt your score - try to pay down debt");
        }
        if f.contains("overdraft") {
            push_distinct(&mut tips, "Maintain an emergency fund to avoid overdrafts");
        }
    }

    push_distinct(&mut tips, "Avoid opening too many new accounts in a short period");
    tips.truncate(MAX_TIPS);
    tips
}

/// Top three improvements with their timelines, then two category steps.
pub fn next_steps(category: RiskCategory, improvements: &[Improvement]) -> Vec<String> {
    let mut steps: Vec<String> = improvements
        .iter()
        .take(3)
        .map(|i| format!("{} ({})", i.action, i.timeline))
        .collect();

    let extra: [&str; 2] = match category {
        RiskCategory::Excellent => [
            "Leverage your score for premium rewards cards",
            "Negotiate lower rates on existing loans",
        ],
        RiskCategory::VeryGood => [
            "Consider requesting a credit limit increase",
            "Avoid new hard inquiries to protect your score",
        ],
        RiskCategory::Good => [
            "Review your credit report for any errors",
            "Maintain current good habits to reach the next tier",
        ],
        RiskCategory::Fair => [
            "Create a debt paydown plan",
            "Consider credit counseling if needed",
        ],
        RiskCategory::Poor => [
            "Consult with a nonprofit credit counselor",
            "Focus on building emergency savings",
        ],
    };
    steps.extend(extra.iter().map(|s| s.to_string()));
    steps.truncate(MAX_STEPS);
    steps
}

pub fn estimate_percentile(score: i32) -> u8 {
    match score {
        s if s >= 800 => 95,
        s if s >= 750 => 85,
        s if s >= 700 => 65,
        s if s >= 650 => 45,
        s if s >= 600 => 25,
        s if s >= 550 => 15,
        _ => 5,
    }
}

pub fn score_context(score: i32, category: RiskCategory) -> ScoreContext {
    let points_to_next_category = category
        .next()
        .map(|next| (next.range().0 - score).max(0))
        .unwrap_or(0);
    ScoreContext {
        national_average: NATIONAL_AVERAGE_SCORE,
        your_percentile: estimate_percentile(score),
        category_range: category.range(),
        points_to_next_category,
    }
}
