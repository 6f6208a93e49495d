use serde::Deserialize;

/// `GLOBAL_QUOTE` response. Alpha Vantage reports throttling and bad requests
/// with HTTP 200 and one of the message keys instead of `Global Quote`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    pub global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Information", default)]
    pub information: Option<String>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "05. price", default)]
    pub price: Option<String>,
    #[serde(rename = "06. volume", default)]
    pub volume: Option<String>,
}

impl GlobalQuoteResponse {
    pub fn provider_message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}
