use std::sync::Arc;

use tokio::sync::Mutex;

use cadence_core::storage::PaymentConfig;
use cadence_core::{Config, PaymentProvider, Store, StripeCheckout, TokenVerifier};

/// Shared state for all handlers.
///
/// The store sits behind an async mutex: one request at a time touches
/// SQLite, which matches the last-write-wins document model.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub verifier: Arc<TokenVerifier>,
    pub payments: Arc<dyn PaymentProvider>,
    pub payment_config: PaymentConfig,
}

impl AppState {
    /// Build state from a store and configuration.
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            verifier: Arc::new(TokenVerifier::new(&config.auth.secret)),
            payments: Arc::new(StripeCheckout::new(config.payment.stripe_api_key.clone())),
            payment_config: config.payment.clone(),
        }
    }

    /// Swap in a different payment collaborator (tests).
    pub fn with_payments(mut self, payments: Arc<dyn PaymentProvider>) -> Self {
        self.payments = payments;
        self
    }
}
