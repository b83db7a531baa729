//! Payment endpoints and the processor webhook.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::models::payment::{CreatePaymentRequest, CreatePaymentResponse, Payment};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::services::payments::{verify_webhook_signature, WebhookEvent};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/v1/payments
pub async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<CreatePaymentResponse>), ApiError> {
    let response = state
        .payment_service()
        .create(&auth, request.booking_id)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/payments/:booking_id
pub async fn get_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(
        state.payment_service().get_status(&auth, booking_id).await?,
    ))
}

/// POST /api/v1/payments/:booking_id/refund
pub async fn refund_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.payment_service().refund(&auth, booking_id).await?))
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/v1/payments/webhook
///
/// Authenticated by the processor signature, not by a bearer token.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let payments = &state.config.payments;
    if payments.webhook_secret.is_empty() {
        warn!("Webhook received but payments.webhook_secret is not set");
        return Err(ApiError::Unauthorized(
            "Webhook signing is not configured".to_string(),
        ));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    verify_webhook_signature(
        &payments.webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
        payments.webhook_tolerance_secs,
    )
    .map_err(|e| {
        warn!(reason = %e, "Rejected webhook");
        ApiError::Unauthorized(e.to_string())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Malformed webhook payload: {}", e)))?;

    state.payment_service().apply_event(&event).await?;

    Ok(Json(WebhookAck { received: true }))
}
