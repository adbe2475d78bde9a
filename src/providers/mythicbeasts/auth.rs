// Token lifecycle for the Mythic Beasts auth endpoint.
//
// A bearer token is obtained lazily via a client-credentials exchange and
// cached on the provider behind its session mutex. There is no background
// refresh: the next call that finds the token missing or about to expire
// performs the exchange inline, under the same lock that serializes the
// API calls themselves.

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::Deserialize;

use crate::providers::mythicbeasts::client::MythicBeastsProvider;
use crate::providers::mythicbeasts::error::MythicBeastsError;

/// A token within this margin of expiry is treated as already expired, so
/// it cannot lapse mid-request.
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(30);

/// Used when the auth endpoint reports a non-positive `expires_in`; the
/// token is never treated as eternal.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// The cached bearer token and its expiry. Empty at construction; only ever
/// touched with the provider's session lock held.
#[derive(Debug, Default)]
pub(crate) struct Session {
    token: String,
    expires_at: Option<Instant>,
}

impl Session {
    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// True while the token exists and stays valid past the slack window.
    pub(crate) fn is_valid_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) if !self.token.is_empty() => now + TOKEN_EXPIRY_SLACK < expires_at,
            _ => false,
        }
    }

    fn store(&mut self, token: String, lifetime: Duration, now: Instant) {
        self.token = token;
        self.expires_at = Some(now + lifetime);
    }

    /// Forgets the token so the next operation re-authenticates. Called by
    /// the request executor when the API rejects a call as unauthenticated.
    pub(crate) fn invalidate(&mut self) {
        self.token.clear();
        self.expires_at = None;
    }
}

/// Success body of the login endpoint.
#[derive(Debug, Deserialize)]
struct MythicAuthResponse {
    access_token: String,
    expires_in: i64,
    token_type: String,
}

/// 4xx body of the login endpoint.
#[derive(Debug, Deserialize)]
struct MythicAuthError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

impl MythicBeastsProvider {
    /// Returns immediately while the cached token is still valid; otherwise
    /// performs the credential exchange. Two calls inside the validity
    /// window make exactly one auth request.
    pub(crate) async fn ensure_token(
        &self,
        session: &mut Session,
    ) -> Result<(), MythicBeastsError> {
        if session.is_valid_at(Instant::now()) {
            return Ok(());
        }
        self.login(session).await
    }

    async fn login(&self, session: &mut Session) -> Result<(), MythicBeastsError> {
        debug!("logging in at {}", self.config.auth_url);

        let resp = self
            .http
            .post(&self.config.auth_url)
            .basic_auth(&self.config.key_id, Some(&self.config.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if status.as_u16() != 200 {
            if status.is_client_error() {
                let err: MythicAuthError = serde_json::from_slice(&body)?;
                let message = if err.error_description.is_empty() {
                    err.error
                } else {
                    format!("{}: {}", err.error, err.error_description)
                };
                return Err(MythicBeastsError::Auth {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(MythicBeastsError::Auth {
                status: status.as_u16(),
                message: "unexpected error in auth API".to_string(),
            });
        }

        let auth: MythicAuthResponse = serde_json::from_slice(&body)?;
        if auth.token_type != "bearer" {
            return Err(MythicBeastsError::TokenType(auth.token_type));
        }

        let lifetime = if auth.expires_in > 0 {
            Duration::from_secs(auth.expires_in as u64)
        } else {
            warn!(
                "auth endpoint reported expires_in={}, assuming {}s",
                auth.expires_in,
                DEFAULT_TOKEN_LIFETIME.as_secs()
            );
            DEFAULT_TOKEN_LIFETIME
        };

        session.store(auth.access_token, lifetime, Instant::now());
        debug!("login successful, token valid for {}s", lifetime.as_secs());
        Ok(())
    }
}
