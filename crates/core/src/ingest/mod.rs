pub mod provider;
pub mod types;

pub use provider::{AlphaVantageClient, QuoteProvider};
