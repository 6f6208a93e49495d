use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HIGH_VOLUME_SUFFIX: &str = " - High Volume";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Positive,
    Neutral,
    Bearish,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.trim() {
            "Bullish" => Sentiment::Bullish,
            "Positive" => Sentiment::Positive,
            "Neutral" => Sentiment::Neutral,
            "Bearish" => Sentiment::Bearish,
            other => bail!("unknown sentiment label: {other:?}"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::StrongBuy => "Strong Buy",
            Action::Buy => "Buy",
            Action::Hold => "Hold",
            Action::Sell => "Sell",
        }
    }
}

/// Action label plus the optional "High Volume" qualifier.
///
/// On the wire and in the store this is a single string such as
/// `"Strong Buy - High Volume"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Recommendation {
    pub action: Action,
    pub high_volume: bool,
}

impl Recommendation {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            high_volume: false,
        }
    }

    pub fn with_high_volume(mut self) -> Self {
        self.high_volume = true;
        self
    }

    pub fn is_strong_buy(&self) -> bool {
        self.action == Action::StrongBuy
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action.as_str())?;
        if self.high_volume {
            f.write_str(HIGH_VOLUME_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for Recommendation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let (label, high_volume) = match s.strip_suffix(HIGH_VOLUME_SUFFIX) {
            Some(label) => (label, true),
            None => (s, false),
        };
        let action = match label {
            "Strong Buy" => Action::StrongBuy,
            "Buy" => Action::Buy,
            "Hold" => Action::Hold,
            "Sell" => Action::Sell,
            other => bail!("unknown recommendation label: {other:?}"),
        };
        Ok(Self {
            action,
            high_volume,
        })
    }
}

impl From<Recommendation> for String {
    fn from(value: Recommendation) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Recommendation {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        value.parse()
    }
}
