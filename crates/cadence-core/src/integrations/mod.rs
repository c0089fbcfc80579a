//! External service collaborators.
//!
//! Payment processing is delegated to a provider behind the
//! [`PaymentProvider`] trait; this crate only creates checkout sessions
//! and hands the session URL back to the caller.

pub mod stripe;

pub use stripe::StripeCheckout;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// What the caller wants to charge for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Line-item name shown on the provider's hosted page.
    pub name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A provider-hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Every payment collaborator implements this trait.
/// Implementations are stateless between calls.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Unique identifier (e.g. "stripe").
    fn name(&self) -> &str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Create a hosted checkout session for the request.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}
