use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{MockPaymentProcessor, PaymentProcessor, ProcessorError};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, PaymentProviderKind};
use crate::middleware::{
    auth_rate_limit, metrics_handler, metrics_middleware, trace_id, RateLimiterState,
};
use crate::routes::{auth, bookings, facility, health, payments, pets, users};
use crate::services::{
    AuthService, EmailService, PaymentService, ReservationService, StripePaymentProcessor,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub processor: Arc<dyn PaymentProcessor>,
    pub email: EmailService,
    pub auth_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.pool.clone(), self.jwt.clone(), self.email.clone())
    }

    pub fn reservation_service(&self) -> ReservationService {
        ReservationService::new(self.pool.clone(), self.config.booking.capacity_mode)
    }

    pub fn payment_service(&self) -> PaymentService {
        PaymentService::new(
            self.pool.clone(),
            self.processor.clone(),
            &self.config.payments.currency,
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppBuildError {
    #[error("JWT configuration error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Payment processor error: {0}")]
    Processor(#[from] ProcessorError),
}

/// Processor selected by `payments.provider`.
pub fn build_processor(config: &Config) -> Result<Arc<dyn PaymentProcessor>, ProcessorError> {
    Ok(match config.payments.provider {
        PaymentProviderKind::Mock => Arc::new(MockPaymentProcessor::new()),
        PaymentProviderKind::Stripe => Arc::new(StripePaymentProcessor::new(
            &config.payments.stripe_api_base,
            &config.payments.stripe_secret_key,
        )?),
    })
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, AppBuildError> {
    let processor = build_processor(&config)?;
    create_app_with_processor(config, pool, processor)
}

/// Like [`create_app`] with an injected processor.
pub fn create_app_with_processor(
    config: Config,
    pool: PgPool,
    processor: Arc<dyn PaymentProcessor>,
) -> Result<Router, AppBuildError> {
    let config = Arc::new(config);
    let jwt = JwtConfig::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry_secs,
        config.jwt.leeway_secs,
    )?;

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: Arc::new(jwt),
        processor,
        email: EmailService::new(config.email.clone()),
        auth_limiter: RateLimiterState::new(config.security.auth_rate_limit_per_minute)
            .map(Arc::new),
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public, rate limited per client address
    let auth_routes = Router::new()
        .route("/api/v1/auth/signup", post(auth::sign_up))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit,
        ));

    // Bearer token checked by the AuthUser extractor in each handler
    let api_routes = Router::new()
        .route("/api/v1/users/me", get(users::me))
        .route(
            "/api/v1/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/v1/users/:id",
            axum::routing::patch(users::update_user).delete(users::delete_user),
        )
        .route("/api/v1/pets", get(pets::list_pets).post(pets::create_pet))
        .route("/api/v1/pets/mine", get(pets::my_pets))
        .route(
            "/api/v1/pets/:id",
            get(pets::get_pet)
                .patch(pets::update_pet)
                .delete(pets::delete_pet),
        )
        .route(
            "/api/v1/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/v1/bookings/mine", get(bookings::my_bookings))
        .route("/api/v1/bookings/upcoming", get(bookings::upcoming_bookings))
        .route(
            "/api/v1/bookings/:id",
            get(bookings::get_booking).patch(bookings::update_booking),
        )
        .route(
            "/api/v1/facility",
            get(facility::get_facility).patch(facility::update_facility),
        )
        .route("/api/v1/facility/availability", get(facility::availability))
        .route("/api/v1/payments", post(payments::create_payment))
        .route("/api/v1/payments/webhook", post(payments::webhook))
        .route("/api/v1/payments/:booking_id", get(payments::get_payment))
        .route(
            "/api/v1/payments/:booking_id/refund",
            post(payments::refund_payment),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(overrides: &[(&str, &str)]) -> Config {
        let mut all = vec![("database.url", "postgres://unused@localhost/unused")];
        all.extend_from_slice(overrides);
        Config::load_for_test(&all).unwrap()
    }

    #[test]
    fn test_build_processor_mock() {
        let processor = build_processor(&config(&[])).unwrap();
        assert_eq!(processor.name(), "mock");
    }

    #[test]
    fn test_build_processor_stripe() {
        let processor = build_processor(&config(&[
            ("payments.provider", "stripe"),
            ("payments.stripe_secret_key", "sk_test_123"),
        ]))
        .unwrap();
        assert_eq!(processor.name(), "stripe");
    }

    #[tokio::test]
    async fn test_create_app_rejects_weak_jwt_secret() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://unused@127.0.0.1:1/unused")
            .unwrap();
        let result = create_app(config(&[("jwt.secret", "short")]), pool);
        assert!(matches!(result, Err(AppBuildError::Jwt(JwtError::WeakSecret))));
    }
}
