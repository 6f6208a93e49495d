use crate::domain::recommendation::{Recommendation, Sentiment};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub sentiment: Sentiment,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub top_stocks: Vec<ScoredCandidate>,
    pub best_pick: Option<ScoredCandidate>,
}

/// One appended row of the `stocks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub volume: u64,
    pub score: Option<f64>,
    pub sentiment: Sentiment,
    pub recommendation: Recommendation,
    pub policy: String,
}

impl StoredRecord {
    pub fn from_candidate(date: NaiveDate, policy: &str, candidate: &ScoredCandidate) -> Self {
        Self {
            date,
            symbol: candidate.symbol.clone(),
            name: candidate.name.clone(),
            price: candidate.price,
            volume: candidate.volume,
            score: candidate.score,
            sentiment: candidate.sentiment,
            recommendation: candidate.recommendation,
            policy: policy.to_string(),
        }
    }
}
