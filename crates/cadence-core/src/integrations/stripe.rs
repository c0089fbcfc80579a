//! Stripe checkout integration -- create hosted checkout sessions.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CheckoutRequest, CheckoutSession, PaymentProvider};
use crate::error::PaymentError;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

pub struct StripeCheckout {
    api_key: String,
    api_base: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

impl StripeCheckout {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at a different API base (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
    fn name(&self) -> &str {
        "stripe"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if !self.is_configured() {
            return Err(PaymentError::NotConfigured);
        }

        let amount = request.amount_cents.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &request.success_url),
            ("cancel_url", &request.cancel_url),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", &request.currency),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][price_data][product_data][name]", &request.name),
        ];

        let resp = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.api_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PaymentError::ProviderRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SessionResponse = resp
            .json()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        let url = body.url.ok_or(PaymentError::MalformedResponse("url"))?;
        Ok(CheckoutSession { id: body.id, url })
    }
}
