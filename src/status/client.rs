use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::domain::PaymentState;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("status request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches the payment state from the fixed poll target.
#[derive(Clone)]
pub struct StatusClient {
    http: Client,
    state_url: Url,
}

impl StatusClient {
    pub fn new(http: Client, state_url: Url) -> Self {
        Self { http, state_url }
    }

    /// One GET against the poll target. The HTTP status code is not checked:
    /// an error page fails the JSON decode and takes the retry path, while a
    /// non-2xx body that still carries the state contract is acted on.
    /// No request timeout either; a hung request keeps its cycle open.
    pub async fn fetch_state(&self) -> Result<PaymentState, PollError> {
        let response = self.http.get(self.state_url.clone()).send().await?;
        let body = response.text().await?;
        Ok(PaymentState::decode(&body)?)
    }
}
