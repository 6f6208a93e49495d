use crate::config::Settings;
use crate::domain::quote::Quote;
use crate::ingest::types::{GlobalQuote, GlobalQuoteResponse};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const QUERY_PATH: &str = "/query";

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_alpha_vantage_api_key()?;
        Self::new(
            &settings.alpha_vantage_base_url,
            api_key,
            Duration::from_secs(settings.quote_timeout_secs),
        )
    }

    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build alpha vantage http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, QUERY_PATH)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let res = self
            .http
            .get(self.url())
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("alpha vantage request failed for {symbol}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read alpha vantage response")?;

        if !status.is_success() {
            anyhow::bail!("alpha vantage HTTP {status} for {symbol}");
        }

        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("alpha vantage response is not valid JSON: {text}"))?;

        parse_global_quote(symbol, raw_json)
    }
}

/// Turns a raw `GLOBAL_QUOTE` body into a [`Quote`], rejecting any other shape.
pub fn parse_global_quote(symbol: &str, raw_json: Value) -> Result<Quote> {
    anyhow::ensure!(
        raw_json.is_object(),
        "unexpected response structure for {symbol}: {raw_json}"
    );

    let parsed = serde_json::from_value::<GlobalQuoteResponse>(raw_json.clone())
        .with_context(|| format!("unexpected response structure for {symbol}: {raw_json}"))?;

    if let Some(message) = parsed.provider_message() {
        anyhow::bail!("alpha vantage rejected {symbol}: {message}");
    }

    let quote = parsed
        .global_quote
        .with_context(|| format!("missing \"Global Quote\" for {symbol}: {raw_json}"))?;

    quote_from_fields(symbol, &quote)
}

fn quote_from_fields(symbol: &str, quote: &GlobalQuote) -> Result<Quote> {
    let price_raw = quote
        .price
        .as_deref()
        .with_context(|| format!("missing price for {symbol}"))?;
    let volume_raw = quote
        .volume
        .as_deref()
        .with_context(|| format!("missing volume for {symbol}"))?;

    let price = price_raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid price for {symbol}: {price_raw:?}"))?;
    anyhow::ensure!(
        price.is_finite() && price >= 0.0,
        "invalid price for {symbol}: {price}"
    );

    let volume = volume_raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid volume for {symbol}: {volume_raw:?}"))?;

    // The requested symbol wins; the provider echo may differ in case.
    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> AlphaVantageClient {
        AlphaVantageClient::new(&server.base_url(), "demo", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn parses_expected_shape() {
        let v = json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "02. open": "142.0000",
                "05. price": "143.5400",
                "06. volume": "3214567",
                "07. latest trading day": "2026-10-16"
            }
        });
        let quote = parse_global_quote("IBM", v).unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert_eq!(quote.price, 143.54);
        assert_eq!(quote.volume, 3_214_567);
    }

    #[test]
    fn rejects_empty_global_quote() {
        let v = json!({"Global Quote": {}});
        let err = parse_global_quote("NOPE", v).unwrap_err();
        assert!(format!("{err:#}").contains("missing price"));
    }

    #[test]
    fn rejects_throttling_notes() {
        let v = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"});
        let err = parse_global_quote("AAPL", v).unwrap_err();
        assert!(err.to_string().contains("call frequency"));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let v = json!({"Global Quote": {"05. price": "n/a", "06. volume": "10"}});
        assert!(parse_global_quote("AAPL", v).is_err());

        let v = json!({"Global Quote": {"05. price": "1.00", "06. volume": "-10"}});
        assert!(parse_global_quote("AAPL", v).is_err());

        let v = json!(["not", "an", "object"]);
        assert!(parse_global_quote("AAPL", v).is_err());
    }

    #[tokio::test]
    async fn fetches_quote_over_http() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "GLOBAL_QUOTE")
                    .query_param("symbol", "TSLA")
                    .query_param("apikey", "demo");
                then.status(200).json_body(json!({
                    "Global Quote": {
                        "01. symbol": "TSLA",
                        "05. price": "251.1000",
                        "06. volume": "98765432"
                    }
                }));
            })
            .await;

        let quote = client(&server).fetch_quote("TSLA").await.unwrap();
        mock.assert_async().await;
        assert_eq!(quote.price, 251.1);
        assert_eq!(quote.volume, 98_765_432);
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(503).body("upstream unavailable");
            })
            .await;

        let err = client(&server).fetch_quote("AAPL").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        assert!(client(&server).fetch_quote("AAPL").await.is_err());
    }
}
