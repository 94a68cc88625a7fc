// File: crates/meetslot_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{authenticator::Authenticator, read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use meetslot_common::services::{BoxFuture, BoxedError, CredentialProvider};
use meetslot_config::GoogleConfig;
use meetslot_config::env_vars::SECRET_MARKER;
use std::{error::Error, path::Path};
use tracing::{debug, info};

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;
pub type AuthType = Authenticator<Connector>;

/// Everything built from one service account key.
///
/// The hub and the credentials share the same authenticator, so one token
/// cache serves both Calendar and Gmail calls.
pub struct GoogleClients {
    pub hub: HubType,
    pub credentials: ServiceAccountCredentials,
}

/// Resolves the key path, rejecting a missing value or an unreplaced secret marker.
pub fn key_path(config: &GoogleConfig) -> Result<&str, Box<dyn Error + Send + Sync>> {
    match config.key_path.as_deref() {
        None => Err("Missing key_path in GoogleConfig".into()),
        Some(SECRET_MARKER) => Err("key_path still points to an unresolved secret".into()),
        Some(path) => Ok(path),
    }
}

pub async fn create_google_clients(
    config: &GoogleConfig,
) -> Result<GoogleClients, Box<dyn Error + Send + Sync>> {
    let key_path = key_path(config)?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;
    let principal = config
        .delegated_user
        .clone()
        .unwrap_or_else(|| sa_key.client_email.clone());

    let mut builder = ServiceAccountAuthenticator::builder(sa_key);
    if let Some(user) = config.delegated_user.as_deref() {
        debug!("Using domain-wide delegation for {}", user);
        builder = builder.subject(user);
    }
    let auth = builder.build().await?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    let hub = CalendarHub::new(client, auth.clone());
    info!("Google client created for {}", principal);

    Ok(GoogleClients {
        hub,
        credentials: ServiceAccountCredentials { auth, principal },
    })
}

/// Bearer tokens for the service account, for APIs without a generated hub.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    auth: AuthType,
    principal: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Token response did not contain an access token")]
pub struct MissingTokenError;

impl CredentialProvider for ServiceAccountCredentials {
    fn access_token<'a>(&'a self, scopes: &'a [&'a str]) -> BoxFuture<'a, String, BoxedError> {
        Box::pin(async move {
            let token = self.auth.token(scopes).await.map_err(BoxedError::new)?;
            token
                .token()
                .map(str::to_string)
                .ok_or_else(|| BoxedError::new(MissingTokenError))
        })
    }

    fn principal(&self) -> Option<String> {
        Some(self.principal.clone())
    }
}
