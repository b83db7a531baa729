//! Payment bridge: intent creation, status lookup, refunds and processor
//! webhooks.

use domain::models::{
    payment::CreatePaymentResponse, Booking, BookingStatus, Facility, Payment, PaymentStatus,
    Role,
};
use domain::services::{
    pricing, AccessDenied, Caller, IntentMetadata, PaymentProcessor, ProcessorError,
};
use persistence::repositories::{
    BookingRepository, FacilityRepository, PaymentRepository, PetRepository,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::{record_payment_initiated, record_payment_refunded};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error("Payment requires an APPROVED or CHECKED_IN booking (booking is {0})")]
    NotPayable(BookingStatus),

    #[error("Payment already exists for this booking")]
    AlreadyExists,

    #[error("Only completed payments can be refunded (payment is {0})")]
    NotRefundable(PaymentStatus),

    #[error("Payment changed while the refund was in flight")]
    RefundRaced,

    #[error("Payment has no processor reference")]
    MissingReference,

    #[error("Facility configuration not found")]
    FacilityMissing,

    #[error("Amount {0} cannot be expressed in minor units")]
    AmountOutOfRange(rust_decimal::Decimal),

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::BookingNotFound | PaymentError::PaymentNotFound => {
                ApiError::NotFound(err.to_string())
            }
            PaymentError::Access(denied) => denied.into(),
            PaymentError::NotPayable(_) | PaymentError::NotRefundable(_) => {
                ApiError::Validation(err.to_string())
            }
            PaymentError::AlreadyExists | PaymentError::RefundRaced => {
                ApiError::Conflict(err.to_string())
            }
            PaymentError::MissingReference
            | PaymentError::FacilityMissing
            | PaymentError::AmountOutOfRange(_) => ApiError::Internal(err.to_string()),
            PaymentError::Processor(e) => e.into(),
            PaymentError::Database(e) if is_unique_violation(&e) => {
                ApiError::Conflict(PaymentError::AlreadyExists.to_string())
            }
            PaymentError::Database(e) => e.into(),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub struct PaymentService {
    pool: PgPool,
    bookings: BookingRepository,
    pets: PetRepository,
    payments: PaymentRepository,
    facility: FacilityRepository,
    processor: Arc<dyn PaymentProcessor>,
    currency: String,
}

impl PaymentService {
    pub fn new(pool: PgPool, processor: Arc<dyn PaymentProcessor>, currency: &str) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            pets: PetRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            facility: FacilityRepository::new(pool.clone()),
            pool,
            processor,
            currency: currency.to_string(),
        }
    }

    /// Owner of the booking, owner of the pet, or `required` and above.
    async fn authorize(
        &self,
        caller: &Caller,
        booking: &Booking,
        required: Role,
    ) -> Result<(), PaymentError> {
        if booking.user_id == caller.user_id {
            return Ok(());
        }
        let pet_owner = self
            .pets
            .find_by_id(booking.pet_id)
            .await?
            .map(|p| p.owner_id);
        match pet_owner {
            Some(owner) => caller.require_owner_or(owner, required)?,
            None => caller.require_role(required)?,
        }
        Ok(())
    }

    /// Prices the stay, opens a processor intent and records an INITIATED
    /// payment, with the booking row locked throughout.
    pub async fn create(
        &self,
        caller: &Caller,
        booking_id: Uuid,
    ) -> Result<CreatePaymentResponse, PaymentError> {
        let mut tx = self.pool.begin().await?;

        let booking: Booking = BookingRepository::lock(&mut tx, booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound)?
            .into();

        self.authorize(caller, &booking, Role::Staff).await?;

        if !booking.status.accepts_payment() {
            return Err(PaymentError::NotPayable(booking.status));
        }

        if PaymentRepository::find_by_booking_in(&mut tx, booking.id)
            .await?
            .is_some()
        {
            return Err(PaymentError::AlreadyExists);
        }

        let facility: Facility = self
            .facility
            .current()
            .await?
            .ok_or(PaymentError::FacilityMissing)?
            .into();

        let amount = pricing::quote(facility.pricing, booking.start_date, booking.end_date);
        let amount_minor =
            pricing::to_minor_units(amount).ok_or(PaymentError::AmountOutOfRange(amount))?;

        let metadata = IntentMetadata {
            booking_id: booking.id,
            pet_id: booking.pet_id,
            user_id: booking.user_id,
        };
        let intent = self
            .processor
            .create_payment_intent(amount_minor, &self.currency, &metadata)
            .await?;

        let payment: Payment =
            match PaymentRepository::insert_initiated(&mut tx, booking.id, amount, &intent.id).await
            {
                Ok(entity) => entity.into(),
                Err(e) => {
                    error!(
                        booking_id = %booking.id,
                        intent_id = %intent.id,
                        error = %e,
                        "Payment insert failed after intent creation"
                    );
                    return Err(e.into());
                }
            };

        tx.commit().await?;

        record_payment_initiated();
        info!(
            booking_id = %booking.id,
            payment_id = %payment.id,
            amount = %amount,
            processor = self.processor.name(),
            "Payment initiated"
        );

        Ok(CreatePaymentResponse {
            client_secret: intent.client_secret,
            payment,
        })
    }

    pub async fn get_status(
        &self,
        caller: &Caller,
        booking_id: Uuid,
    ) -> Result<Payment, PaymentError> {
        let booking: Booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound)?
            .into();

        self.authorize(caller, &booking, Role::Staff).await?;

        self.payments
            .find_by_booking(booking_id)
            .await?
            .map(Payment::from)
            .ok_or(PaymentError::PaymentNotFound)
    }

    /// Full refund of a COMPLETED payment.
    pub async fn refund(&self, caller: &Caller, booking_id: Uuid) -> Result<Payment, PaymentError> {
        caller.require_role(Role::Staff)?;

        let payment: Payment = self
            .payments
            .find_by_booking(booking_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?
            .into();

        if payment.status != PaymentStatus::Completed {
            return Err(PaymentError::NotRefundable(payment.status));
        }

        let intent_id = payment
            .external_id
            .as_deref()
            .ok_or(PaymentError::MissingReference)?;

        self.processor.refund(intent_id).await?;

        let refunded: Payment = self
            .payments
            .transition(payment.id, PaymentStatus::Completed, PaymentStatus::Refunded)
            .await?
            .ok_or(PaymentError::RefundRaced)?
            .into();

        record_payment_refunded();
        info!(booking_id = %booking_id, payment_id = %payment.id, by = %caller.user_id, "Payment refunded");
        Ok(refunded)
    }

    /// Applies a verified processor event. Unknown events and events for
    /// payments no longer INITIATED are acknowledged without effect.
    pub async fn apply_event(&self, event: &WebhookEvent) -> Result<Option<Payment>, PaymentError> {
        let Some(target) = event.settled_status() else {
            info!(event_type = %event.event_type, "Ignoring processor event");
            return Ok(None);
        };

        let updated = self
            .payments
            .settle_by_external_id(&event.data.object.id, target)
            .await?
            .map(Payment::from);

        match &updated {
            Some(payment) => info!(
                payment_id = %payment.id,
                status = %payment.status,
                "Payment settled by processor event"
            ),
            None => warn!(
                intent_id = %event.data.object.id,
                event_type = %event.event_type,
                "Processor event matched no initiated payment"
            ),
        }

        Ok(updated)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: String,
}

impl WebhookEvent {
    pub fn settled_status(&self) -> Option<PaymentStatus> {
        match self.event_type.as_str() {
            "payment_intent.succeeded" => Some(PaymentStatus::Completed),
            "payment_intent.payment_failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Missing signature header")]
    Missing,

    #[error("Malformed signature header")]
    Malformed,

    #[error("Signature timestamp outside tolerance")]
    Stale,

    #[error("Signature mismatch")]
    Mismatch,
}

/// Checks a `t=<unix>,v1=<hex>` header against HMAC-SHA256 of `"{t}.{body}"`.
pub fn verify_webhook_signature(
    secret: &str,
    header: Option<&str>,
    body: &[u8],
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now_unix - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Stale);
    }

    let mut payload = format!("{}.", timestamp).into_bytes();
    payload.extend_from_slice(body);

    if signatures
        .iter()
        .any(|sig| shared::crypto::verify_hmac_sha256_hex(secret.as_bytes(), &payload, sig))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
