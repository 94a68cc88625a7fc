// --- File: crates/meetslot_gmail/src/service.rs ---
use chrono::Utc;
use meetslot_common::http::client::HTTP_CLIENT;
use meetslot_common::services::{
    BoxFuture, BoxedError, CredentialProvider, EmailMessage, NotificationResult,
    NotificationService,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::message::encode_raw;

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";
const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Gmail-specific error types.
#[derive(Error, Debug)]
pub enum GmailError {
    /// Error occurred during a Gmail API request
    #[error("Gmail API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Gmail API
    #[error("Gmail API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to obtain access token: {0}")]
    TokenError(BoxedError),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: String,
    #[serde(default)]
    label_ids: Vec<String>,
}

/// Sends mail as the service account principal (or its delegated user).
pub struct GmailNotificationService {
    credentials: Arc<dyn CredentialProvider>,
    client: Client,
    endpoint: String,
}

impl GmailNotificationService {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            client: HTTP_CLIENT.clone(),
            endpoint: GMAIL_SEND_URL.to_string(),
        }
    }

    /// Point the service at another send endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl NotificationService for GmailNotificationService {
    type Error = GmailError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            // Encode first: a malformed message should not cost a token round trip
            let raw = encode_raw(&message, Utc::now())?;

            let token = self
                .credentials
                .access_token(&[GMAIL_SEND_SCOPE])
                .await
                .map_err(GmailError::TokenError)?;

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(token)
                .json(&json!({ "raw": raw }))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                error!("Gmail returned {}: {}", status, body);
                return Err(GmailError::ApiError {
                    status_code: status.as_u16(),
                    message: body,
                });
            }

            let sent: SendResponse = resp.json().await?;
            info!("Email sent to {} (id {})", message.to, sent.id);

            Ok(NotificationResult {
                id: sent.id,
                status: if sent.label_ids.iter().any(|l| l == "SENT") {
                    "sent".to_string()
                } else {
                    "accepted".to_string()
                },
            })
        })
    }
}
