use crate::domain::quote::{RankingResult, ScoredCandidate, StoredRecord};
use crate::ingest::QuoteProvider;
use crate::scoring::{PennyScoreRules, PriceTierRules, ScoringPolicy};
use crate::storage::RecordSink;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionRule {
    // Last Strong Buy in fetch order wins, else the first candidate.
    FirstStrongBuy,
    TopByScore { max_results: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePolicy {
    pub scoring: ScoringPolicy,
    pub selection: SelectionRule,
    pub price_ceiling: Option<f64>,
}

impl PipelinePolicy {
    pub fn price_tier() -> Self {
        Self {
            scoring: ScoringPolicy::PriceTier(PriceTierRules::default()),
            selection: SelectionRule::FirstStrongBuy,
            price_ceiling: None,
        }
    }

    pub fn penny_stock(max_results: usize, price_ceiling: f64) -> Self {
        Self {
            scoring: ScoringPolicy::PennyScore(PennyScoreRules::default()),
            selection: SelectionRule::TopByScore { max_results },
            price_ceiling: Some(price_ceiling),
        }
    }

    pub fn name(&self) -> &'static str {
        self.scoring.name()
    }

    fn admits(&self, price: f64) -> bool {
        self.price_ceiling.map_or(true, |ceiling| price < ceiling)
    }
}

pub struct RankingPipeline {
    provider: Arc<dyn QuoteProvider>,
    sink: Option<Arc<dyn RecordSink>>,
}

impl RankingPipeline {
    pub fn new(provider: Arc<dyn QuoteProvider>, sink: Option<Arc<dyn RecordSink>>) -> Self {
        Self { provider, sink }
    }

    /// Fetch failures drop the symbol; persistence failures are only logged.
    pub async fn run(
        &self,
        symbols: &[String],
        policy: &PipelinePolicy,
        run_date: NaiveDate,
    ) -> RankingResult {
        let mut candidates = Vec::with_capacity(symbols.len());
        let mut failures: usize = 0;
        let mut filtered: usize = 0;

        for symbol in symbols {
            let quote = match self.provider.fetch_quote(symbol).await {
                Ok(quote) => quote,
                Err(err) => {
                    failures += 1;
                    tracing::warn!(
                        %symbol,
                        provider = self.provider.provider_name(),
                        error = %format!("{err:#}"),
                        "quote fetch failed; skipping symbol"
                    );
                    continue;
                }
            };

            if !policy.admits(quote.price) {
                filtered += 1;
                tracing::debug!(%symbol, price = quote.price, "quote above price ceiling");
                continue;
            }

            candidates.push(policy.scoring.evaluate(&quote));
        }

        let result = select(candidates, &policy.selection);

        tracing::info!(
            policy = policy.name(),
            %run_date,
            requested = symbols.len(),
            failures,
            filtered,
            selected = result.top_stocks.len(),
            best_pick = result.best_pick.as_ref().map(|c| c.symbol.as_str()),
            "ranking run finished"
        );

        self.persist(&result, policy.name(), run_date).await;
        result
    }

    async fn persist(&self, result: &RankingResult, policy: &str, run_date: NaiveDate) {
        let Some(sink) = &self.sink else {
            return;
        };

        let records = to_records(result, policy, run_date);
        if records.is_empty() {
            return;
        }

        match sink.append(&records).await {
            Ok(inserted) => {
                tracing::debug!(policy, %run_date, inserted, "persisted ranking run");
            }
            Err(err) => {
                tracing::error!(
                    policy,
                    %run_date,
                    error = %format!("{err:#}"),
                    "failed to persist ranking run"
                );
            }
        }
    }
}

pub fn select(candidates: Vec<ScoredCandidate>, rule: &SelectionRule) -> RankingResult {
    match rule {
        SelectionRule::FirstStrongBuy => {
            let mut best_pick: Option<&ScoredCandidate> = None;
            for candidate in &candidates {
                if best_pick.is_none() || candidate.recommendation.is_strong_buy() {
                    best_pick = Some(candidate);
                }
            }
            let best_pick = best_pick.cloned();
            RankingResult {
                top_stocks: candidates,
                best_pick,
            }
        }
        SelectionRule::TopByScore { max_results } => {
            let mut top_stocks = candidates;
            // Vec::sort_by is stable: equal scores keep fetch order.
            top_stocks.sort_by(|a, b| compare_scores_desc(a.score, b.score));
            top_stocks.truncate(*max_results);
            let best_pick = top_stocks.first().cloned();
            RankingResult {
                top_stocks,
                best_pick,
            }
        }
    }
}

fn compare_scores_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn to_records(result: &RankingResult, policy: &str, run_date: NaiveDate) -> Vec<StoredRecord> {
    result
        .top_stocks
        .iter()
        .map(|candidate| StoredRecord::from_candidate(run_date, policy, candidate))
        .collect()
}
