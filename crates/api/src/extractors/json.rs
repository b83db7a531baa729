//! JSON body extractor whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` that rejects malformed bodies with [`ApiError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Counter {
        count: u32,
    }

    fn request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_valid_body() {
        let ApiJson(value) = ApiJson::<Counter>::from_request(request(r#"{"count":3}"#), &())
            .await
            .unwrap();
        assert_eq!(value.count, 3);
    }

    #[tokio::test]
    async fn test_wrong_type_is_validation_error() {
        let result = ApiJson::<Counter>::from_request(request(r#"{"count":"three"}"#), &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_syntax_error_is_validation_error() {
        let result = ApiJson::<Counter>::from_request(request("{"), &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
