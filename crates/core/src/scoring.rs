use crate::domain::quote::{Quote, ScoredCandidate};
use crate::domain::recommendation::{Action, Recommendation, Sentiment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTierRules {
    pub bullish_above: f64,
    pub positive_above: f64,
    pub neutral_above: f64,
    pub high_volume_above: u64,
}

impl Default for PriceTierRules {
    fn default() -> Self {
        Self {
            bullish_above: 300.0,
            positive_above: 200.0,
            neutral_above: 100.0,
            high_volume_above: 50_000_000,
        }
    }
}

impl PriceTierRules {
    pub fn classify(&self, price: f64, volume: u64) -> (Sentiment, Recommendation) {
        let (sentiment, action) = if price > self.bullish_above {
            (Sentiment::Bullish, Action::StrongBuy)
        } else if price > self.positive_above {
            (Sentiment::Positive, Action::Buy)
        } else if price > self.neutral_above {
            (Sentiment::Neutral, Action::Hold)
        } else {
            (Sentiment::Bearish, Action::Sell)
        };

        let mut recommendation = Recommendation::new(action);
        if volume > self.high_volume_above {
            recommendation = recommendation.with_high_volume();
        }
        (sentiment, recommendation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PennyScoreRules {
    pub sub_dollar_below: f64,
    pub sub_dollar_penalty: f64,
    pub reward_ceiling: f64,
    pub reward_factor: f64,
    pub heavy_volume_above: u64,
    pub heavy_volume_bonus: f64,
    pub active_volume_above: u64,
    pub active_volume_bonus: f64,
    pub bullish_above: f64,
    pub bearish_below: f64,
}

impl Default for PennyScoreRules {
    fn default() -> Self {
        Self {
            sub_dollar_below: 1.0,
            sub_dollar_penalty: 1.0,
            reward_ceiling: 5.0,
            reward_factor: 0.5,
            heavy_volume_above: 10_000_000,
            heavy_volume_bonus: 2.0,
            active_volume_above: 1_000_000,
            active_volume_bonus: 1.0,
            bullish_above: 2.0,
            bearish_below: 0.0,
        }
    }
}

impl PennyScoreRules {
    pub fn raw_score(&self, price: f64, volume: u64) -> f64 {
        let mut score = 0.0;

        if price < self.sub_dollar_below {
            score -= self.sub_dollar_penalty;
        } else if price < self.reward_ceiling {
            score += (self.reward_ceiling - price) * self.reward_factor;
        }

        // Volume bonuses do not stack; the higher tier wins.
        if volume > self.heavy_volume_above {
            score += self.heavy_volume_bonus;
        } else if volume > self.active_volume_above {
            score += self.active_volume_bonus;
        }

        score
    }

    pub fn score(&self, price: f64, volume: u64) -> f64 {
        round2(self.raw_score(price, volume))
    }

    pub fn label(&self, score: f64) -> (Sentiment, Recommendation) {
        if score > self.bullish_above {
            (Sentiment::Bullish, Recommendation::new(Action::Buy))
        } else if score < self.bearish_below {
            (Sentiment::Bearish, Recommendation::new(Action::Sell))
        } else {
            (Sentiment::Neutral, Recommendation::new(Action::Hold))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringPolicy {
    PriceTier(PriceTierRules),
    PennyScore(PennyScoreRules),
}

impl ScoringPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ScoringPolicy::PriceTier(_) => "price_tier",
            ScoringPolicy::PennyScore(_) => "penny_stock",
        }
    }

    /// Rounded to 2 decimal places; labels use the unrounded value.
    pub fn score(&self, price: f64, volume: u64) -> Option<f64> {
        match self {
            ScoringPolicy::PriceTier(_) => None,
            ScoringPolicy::PennyScore(rules) => Some(rules.score(price, volume)),
        }
    }

    pub fn classify(&self, price: f64, volume: u64) -> (Sentiment, Recommendation) {
        match self {
            ScoringPolicy::PriceTier(rules) => rules.classify(price, volume),
            ScoringPolicy::PennyScore(rules) => rules.label(rules.raw_score(price, volume)),
        }
    }

    pub fn evaluate(&self, quote: &Quote) -> ScoredCandidate {
        let (sentiment, recommendation) = self.classify(quote.price, quote.volume);
        ScoredCandidate {
            symbol: quote.symbol.clone(),
            name: quote.symbol.clone(),
            price: quote.price,
            volume: quote.volume,
            score: self.score(quote.price, quote.volume),
            sentiment,
            recommendation,
        }
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price_tier() -> ScoringPolicy {
        ScoringPolicy::PriceTier(PriceTierRules::default())
    }

    fn penny() -> ScoringPolicy {
        ScoringPolicy::PennyScore(PennyScoreRules::default())
    }

    #[test]
    fn price_tier_top_tier_is_strong_buy() {
        let (sentiment, rec) = price_tier().classify(301.0, 1_000);
        assert_eq!(sentiment, Sentiment::Bullish);
        assert!(rec.to_string().starts_with("Strong Buy"));
        assert_eq!(rec.to_string(), "Strong Buy");
    }

    #[test]
    fn price_tier_high_volume_qualifier() {
        let (_, rec) = price_tier().classify(301.0, 60_000_000);
        assert_eq!(rec.to_string(), "Strong Buy - High Volume");

        // Exactly at the threshold is not high volume.
        let (_, rec) = price_tier().classify(301.0, 50_000_000);
        assert_eq!(rec.to_string(), "Strong Buy");
    }

    #[test]
    fn price_tier_boundaries_fall_to_lower_tier() {
        let cases = [
            (300.0, Sentiment::Positive, "Buy"),
            (250.0, Sentiment::Positive, "Buy"),
            (200.0, Sentiment::Neutral, "Hold"),
            (100.01, Sentiment::Neutral, "Hold"),
            (100.0, Sentiment::Bearish, "Sell"),
            (0.0, Sentiment::Bearish, "Sell"),
        ];
        for (price, sentiment, rec) in cases {
            let (s, r) = price_tier().classify(price, 0);
            assert_eq!(s, sentiment, "price={price}");
            assert_eq!(r.to_string(), rec, "price={price}");
        }
    }

    #[test]
    fn price_tier_has_no_numeric_score() {
        assert_eq!(price_tier().score(500.0, 100_000_000), None);
    }

    #[test]
    fn penny_sub_dollar_takes_only_the_penalty() {
        assert_eq!(penny().score(0.5, 0), Some(-1.0));
        assert_eq!(penny().score(0.0, 0), Some(-1.0));
        let (s, r) = penny().classify(0.5, 0);
        assert_eq!((s, r.to_string().as_str()), (Sentiment::Bearish, "Sell"));
    }

    #[test]
    fn penny_reward_and_volume_bonuses() {
        assert_eq!(penny().score(3.0, 0), Some(1.0));
        assert_eq!(penny().score(3.0, 2_000_000), Some(2.0));
        assert_eq!(penny().score(3.0, 15_000_000), Some(3.0));

        // Exactly 2 is not bullish.
        let (s, r) = penny().classify(3.0, 2_000_000);
        assert_eq!((s, r.to_string().as_str()), (Sentiment::Neutral, "Hold"));

        let (s, r) = penny().classify(3.0, 15_000_000);
        assert_eq!((s, r.to_string().as_str()), (Sentiment::Bullish, "Buy"));
    }

    #[test]
    fn penny_volume_thresholds_are_strict_and_do_not_stack() {
        let rules = PennyScoreRules::default();
        assert_eq!(rules.raw_score(5.0, 1_000_000), 0.0);
        assert_eq!(rules.raw_score(5.0, 1_000_001), 1.0);
        assert_eq!(rules.raw_score(5.0, 10_000_000), 1.0);
        assert_eq!(rules.raw_score(5.0, 10_000_001), 2.0);
    }

    #[test]
    fn penny_score_is_rounded_to_cents() {
        // (5 - 1.2345) * 0.5 = 1.88275
        assert_eq!(penny().score(1.2345, 0), Some(1.88));
        assert_eq!(round2(2.005_000_1), 2.01);
    }

    #[test]
    fn penny_labels_come_from_the_unrounded_score() {
        // raw score 2.0025 displays as 2.0 but is still above the bullish line.
        let (s, r) = penny().classify(4.995, 15_000_000);
        assert_eq!((s, r.to_string().as_str()), (Sentiment::Bullish, "Buy"));
        assert_eq!(penny().score(4.995, 15_000_000), Some(2.0));

        let quote = Quote {
            symbol: "EDGE".to_string(),
            price: 4.995,
            volume: 15_000_000,
        };
        let candidate = penny().evaluate(&quote);
        assert_eq!(candidate.score, Some(2.0));
        assert_eq!(candidate.sentiment, Sentiment::Bullish);
    }

    #[test]
    fn evaluate_is_deterministic_and_names_default_to_symbol() {
        let quote = Quote {
            symbol: "SNDL".to_string(),
            price: 1.5,
            volume: 12_000_000,
        };
        let a = penny().evaluate(&quote);
        let b = penny().evaluate(&quote);
        assert_eq!(a, b);
        assert_eq!(a.name, "SNDL");
        assert_eq!(a.score, Some(3.75));
        assert_eq!(a.sentiment, Sentiment::Bullish);
    }
}
