//! Outbound transactional email.
//!
//! Providers:
//! - `console`: writes the message to the log (development)
//! - `sendgrid`: SendGrid v3 mail API

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{EmailConfig, EmailProvider};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email provider not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Link embedded in reset emails.
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/auth/reset-password?token={}",
            self.config.base_url.trim_end_matches('/'),
            token
        )
    }

    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(subject = %message.subject, "Email disabled, skipping send");
            return Ok(());
        }

        match self.config.provider {
            EmailProvider::Console => {
                self.send_console(&message);
                Ok(())
            }
            EmailProvider::Sendgrid => self.send_sendgrid(&message).await,
        }
    }

    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        token: &str,
    ) -> Result<(), EmailError> {
        let body_text = format!(
            "Hi{name},\n\n\
             We received a request to reset the password of your Pet Boarding account.\n\
             Use the link below to choose a new one:\n\n\
             {url}\n\n\
             The link expires in 1 hour and can be used once.\n\
             If you did not ask for this, ignore this message.\n",
            name = to_name.map(|n| format!(" {}", n)).unwrap_or_default(),
            url = self.reset_link(token),
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(str::to_string),
            subject: "Reset your Pet Boarding password".to_string(),
            body_text,
        })
        .await
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to,
            subject = %message.subject,
            from = %self.config.sender_email,
            body = %message.body_text,
            "Email (console provider)"
        );
    }

    async fn send_sendgrid(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&sendgrid_payload(&self.config, message))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(subject = %message.subject, "Email sent via SendGrid");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, error = %body, "SendGrid API error");
        Err(EmailError::ProviderError(format!(
            "SendGrid returned {}",
            status
        )))
    }
}

fn sendgrid_payload(config: &EmailConfig, message: &EmailMessage) -> serde_json::Value {
    let mut recipient = serde_json::json!({ "email": message.to });
    if let Some(name) = &message.to_name {
        recipient["name"] = serde_json::json!(name);
    }

    serde_json::json!({
        "personalizations": [{ "to": [recipient] }],
        "from": {
            "email": config.sender_email,
            "name": config.sender_name
        },
        "subject": message.subject,
        "content": [{
            "type": "text/plain",
            "value": message.body_text
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, provider: EmailProvider) -> EmailConfig {
        EmailConfig {
            enabled,
            provider,
            base_url: "https://boarding.example.com/".to_string(),
            ..EmailConfig::default()
        }
    }

    #[test]
    fn test_reset_link() {
        let service = EmailService::new(config(true, EmailProvider::Console));
        assert_eq!(
            service.reset_link("abc123"),
            "https://boarding.example.com/auth/reset-password?token=abc123"
        );
    }

    #[tokio::test]
    async fn test_disabled_service_is_noop() {
        let service = EmailService::new(config(false, EmailProvider::Sendgrid));
        assert!(!service.is_enabled());
        assert!(service
            .send_password_reset_email("a@example.com", None, "tok")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_console_provider() {
        let service = EmailService::new(config(true, EmailProvider::Console));
        assert!(service
            .send_password_reset_email("a@example.com", Some("Ann"), "tok")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sendgrid_without_key() {
        let service = EmailService::new(config(true, EmailProvider::Sendgrid));
        let err = service
            .send_password_reset_email("a@example.com", None, "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::NotConfigured));
    }

    #[test]
    fn test_sendgrid_payload() {
        let cfg = config(true, EmailProvider::Sendgrid);
        let message = EmailMessage {
            to: "owner@example.com".to_string(),
            to_name: Some("Owner".to_string()),
            subject: "Hello".to_string(),
            body_text: "Body".to_string(),
        };

        let payload = sendgrid_payload(&cfg, &message);
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "owner@example.com");
        assert_eq!(payload["personalizations"][0]["to"][0]["name"], "Owner");
        assert_eq!(payload["from"]["email"], cfg.sender_email);
        assert_eq!(payload["content"][0]["value"], "Body");
    }
}
