//! HTTP quote provider backed by the public advice API.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use teamwork_core::{ExternalError, Quote, QuoteProvider};

pub const ADVICE_API_URL: &str = "https://korean-advice-open-api.vercel.app/api/advice";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    message: String,
    author: String,
}

/// Blocking client for a `{ "message", "author" }` JSON endpoint.
pub struct AdviceApiClient {
    client: Client,
    url: String,
}

impl AdviceApiClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ExternalError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ExternalError::new(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl QuoteProvider for AdviceApiClient {
    fn fetch_quote(&self) -> Result<Quote, ExternalError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| ExternalError::new(format!("quote request failed: {err}")))?;
        let body: AdviceResponse = response
            .json()
            .map_err(|err| ExternalError::new(format!("quote response unreadable: {err}")))?;
        Ok(Quote::new(body.message, body.author))
    }
}

/// Provider that always fails, forcing the built-in quotes.
pub struct Offline;

impl QuoteProvider for Offline {
    fn fetch_quote(&self) -> Result<Quote, ExternalError> {
        Err(ExternalError::new("offline mode"))
    }
}
