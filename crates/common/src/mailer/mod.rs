//! Outbound mail client
//!
//! Posts messages to the configured mail provider's HTTP API. Delivery
//! happens from the queue worker, never from the request path.

use crate::config::MailerConfig;
use crate::errors::{AppError, Result};
use base64::Engine;
use serde::Serialize;
use std::time::Duration;

/// A file attached to an outbound message
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct SendMessageRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload>,
}

#[derive(Serialize)]
struct AttachmentPayload {
    filename: String,
    content_type: String,
    /// Base64-encoded file body
    content: String,
}

/// Mail provider API client
pub struct MailClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    from_address: String,
    max_retries: u32,
}

impl MailClient {
    /// Create a client from mailer configuration
    pub fn from_config(config: &MailerConfig) -> Result<Self> {
        let api_base = config.api_base.clone().ok_or_else(|| AppError::Configuration {
            message: "mailer.api_base is not configured".to_string(),
        })?;
        let api_key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
            message: "mailer.api_key is not configured".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base,
            api_key,
            from_address: config.from_address.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    /// Send a message, retrying transient failures
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<&EmailAttachment>,
    ) -> Result<()> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * (2_u64.pow(attempt)));
                tokio::time::sleep(delay).await;
            }

            match self.send_once(to, subject, body, attachment).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Email send failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::EmailDeliveryError {
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn send_once(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<&EmailAttachment>,
    ) -> Result<()> {
        let url = format!("{}/messages", self.api_base);

        let attachments = attachment
            .map(|a| {
                vec![AttachmentPayload {
                    filename: a.filename.clone(),
                    content_type: a.content_type.clone(),
                    content: base64::engine::general_purpose::STANDARD.encode(&a.bytes),
                }]
            })
            .unwrap_or_default();

        let request = SendMessageRequest {
            from: self.from_address.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            text: body.to_string(),
            attachments,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmailDeliveryError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::EmailDeliveryError {
                message: format!("Mail API error {}: {}", status, text),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailerConfig;

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = MailerConfig {
            api_base: None,
            api_key: Some("key".to_string()),
            from_address: "cv@cvforge.local".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        };
        assert!(MailClient::from_config(&config).is_err());
    }

    #[test]
    fn test_attachment_payload_encodes_base64() {
        let attachment = EmailAttachment {
            filename: "Jane_Doe_CV.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.5".to_vec(),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(&attachment.bytes);
        assert_eq!(encoded, "JVBERi0xLjU=");
    }
}
