//! Seam to the external payment processor.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Processor-side handle for collecting a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    /// Handed to the client to confirm the payment.
    pub client_secret: String,
}

/// References attached to an intent so processor records can be traced back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentMetadata {
    pub booking_id: Uuid,
    pub pet_id: Uuid,
    pub user_id: Uuid,
}

impl IntentMetadata {
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            ("bookingId", self.booking_id.to_string()),
            ("petId", self.pet_id.to_string()),
            ("userId", self.user_id.to_string()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Payment processor unreachable: {0}")]
    Transport(String),

    #[error("Payment processor rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, ProcessorError>;

    /// Refunds the full amount of an intent.
    async fn refund(&self, intent_id: &str) -> Result<(), ProcessorError>;
}

/// In-process processor for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentProcessor {
    pub simulate_failure: bool,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, ProcessorError> {
        if self.simulate_failure {
            return Err(ProcessorError::Transport(
                "mock processor simulating failure".to_string(),
            ));
        }

        let id = format!("pi_mock_{}", Uuid::new_v4().simple());
        info!(
            intent_id = %id,
            amount_minor,
            currency,
            booking_id = %metadata.booking_id,
            "Mock: created payment intent"
        );

        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, Uuid::new_v4().simple()),
            id,
        })
    }

    async fn refund(&self, intent_id: &str) -> Result<(), ProcessorError> {
        if self.simulate_failure {
            return Err(ProcessorError::Transport(
                "mock processor simulating failure".to_string(),
            ));
        }
        info!(intent_id, "Mock: refunded payment intent");
        Ok(())
    }
}
