//! Stripe-backed [`PaymentProcessor`].

use async_trait::async_trait;
use domain::services::{IntentMetadata, PaymentIntent, PaymentProcessor, ProcessorError};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct StripePaymentProcessor {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: String,
}

impl StripePaymentProcessor {
    pub fn new(api_base: &str, secret_key: &str) -> Result<Self, ProcessorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        body: String,
        idempotency_key: Option<&str>,
    ) -> Result<reqwest::Response, ProcessorError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_default();
        warn!(status = %status, path, message = %message, "Stripe request rejected");

        if status.is_server_error() {
            Err(ProcessorError::Transport(format!("Stripe returned {}", status)))
        } else {
            Err(ProcessorError::Rejected(message))
        }
    }
}

fn intent_form(amount_minor: i64, currency: &str, metadata: &IntentMetadata) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    form.append_pair("amount", &amount_minor.to_string())
        .append_pair("currency", currency)
        .append_pair("automatic_payment_methods[enabled]", "true");
    for (key, value) in metadata.pairs() {
        form.append_pair(&format!("metadata[{}]", key), &value);
    }
    form.finish()
}

fn refund_form(intent_id: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payment_intent", intent_id)
        .finish()
}

#[async_trait]
impl PaymentProcessor for StripePaymentProcessor {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, ProcessorError> {
        let idempotency_key = format!("intent-{}", metadata.booking_id);
        let response = self
            .post_form(
                "/v1/payment_intents",
                intent_form(amount_minor, currency, metadata),
                Some(&idempotency_key),
            )
            .await?;

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        info!(intent_id = %intent.id, booking_id = %metadata.booking_id, "Stripe payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn refund(&self, intent_id: &str) -> Result<(), ProcessorError> {
        self.post_form("/v1/refunds", refund_form(intent_id), None)
            .await?;
        info!(intent_id, "Stripe refund issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_intent_form_encoding() {
        let metadata = IntentMetadata {
            booking_id: Uuid::nil(),
            pet_id: Uuid::nil(),
            user_id: Uuid::nil(),
        };
        let form = intent_form(15000, "usd", &metadata);

        assert!(form.starts_with("amount=15000&currency=usd"));
        assert!(form.contains("metadata%5BbookingId%5D=00000000-0000-0000-0000-000000000000"));
        assert!(form.contains("metadata%5BpetId%5D="));
        assert!(form.contains("metadata%5BuserId%5D="));
    }

    #[test]
    fn test_refund_form_encoding() {
        assert_eq!(refund_form("pi_123"), "payment_intent=pi_123");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let processor = StripePaymentProcessor::new("https://api.stripe.com/", "sk_test").unwrap();
        assert_eq!(processor.api_base, "https://api.stripe.com");
        assert_eq!(processor.name(), "stripe");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let processor = StripePaymentProcessor::new("http://127.0.0.1:9", "sk_test").unwrap();
        let err = processor.refund("pi_123").await.unwrap_err();
        assert!(matches!(err, ProcessorError::Transport(_)));
    }
}
