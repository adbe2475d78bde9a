use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, Method, StatusCode};
use tokio::sync::Mutex;

use crate::core::record::Record;
use crate::providers::mythicbeasts::auth::Session;
use crate::providers::mythicbeasts::error::MythicBeastsError;
use crate::providers::mythicbeasts::types::{
    MythicError, MythicErrors, MythicRecord, MythicRecordUpdate, MythicRecordsRequest,
    MythicRecordsResponse, decode_records, encode_record, encode_records,
};

pub const DEFAULT_API_URL: &str = "https://api.mythic-beasts.com/dns/v2";
pub const DEFAULT_AUTH_URL: &str = "https://auth.mythic-beasts.com/login";

pub struct MythicBeastsConfig {
    /// API key ID, used as the basic-auth username for the token exchange.
    pub key_id: String,
    /// API key secret.
    pub secret: String,
    /// Records API base, without a trailing slash.
    pub api_url: String,
    /// Token exchange endpoint.
    pub auth_url: String,
}

impl MythicBeastsConfig {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
        }
    }
}

/// DNS record management against the Mythic Beasts DNS API v2.
///
/// The session mutex serializes every API interaction from one instance:
/// whoever holds it owns the token for the full duration of their
/// operation, so concurrent callers block instead of racing to
/// re-authenticate. A cancelled call releases the lock when its guard
/// drops.
pub struct MythicBeastsProvider {
    pub(crate) config: MythicBeastsConfig,
    pub(crate) http: Client,
    pub(crate) session: Mutex<Session>,
}

impl MythicBeastsProvider {
    /// Builds the provider. No I/O happens here; the first operation
    /// triggers the token exchange.
    pub fn new(config: MythicBeastsConfig) -> Result<Self, MythicBeastsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            http,
            session: Mutex::new(Session::default()),
        })
    }

    // ── Request executor ─────────────────────────────────────────────

    /// Sends one authenticated request and returns the raw success body.
    ///
    /// A 401 clears the cached token as a side effect before the error is
    /// returned; the call itself still fails, and the next top-level
    /// operation re-authenticates. 2xx responses without a meaningful body
    /// (201, 204) come back as empty bytes.
    pub(crate) async fn request(
        &self,
        session: &mut Session,
        method: Method,
        url: String,
        body: Option<&MythicRecordsRequest>,
    ) -> Result<Vec<u8>, MythicBeastsError> {
        debug!("{method} {url}");

        let mut builder = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json")
            .bearer_auth(session.token());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.as_u16() >= 400 {
            if status == StatusCode::UNAUTHORIZED {
                warn!("authentication rejected, clearing cached token");
                session.invalidate();
            }
            return Err(decode_api_error(status.as_u16(), &bytes));
        }

        Ok(bytes.to_vec())
    }

    // ── Batch mutation engine ────────────────────────────────────────

    /// GET every record in the zone, decoded through the codec.
    pub(crate) async fn fetch_records(
        &self,
        session: &mut Session,
        zone: &str,
    ) -> Result<Vec<Record>, MythicBeastsError> {
        let url = format!("{}/zones/{zone}/records", self.config.api_url);
        let body = self.request(session, Method::GET, url, None).await?;
        let resp: MythicRecordsResponse = serde_json::from_slice(&body)?;
        decode_records(&resp.records)
    }

    /// POST all records as one batch. The response only reports a count,
    /// not which records it covers, so the caller treats the whole input
    /// as added; a mismatched count is logged and nothing more.
    pub(crate) async fn create_records(
        &self,
        session: &mut Session,
        zone: &str,
        records: &[Record],
    ) -> Result<(), MythicBeastsError> {
        let payload = MythicRecordsRequest {
            records: encode_records(records)?,
        };
        let url = format!("{}/zones/{zone}/records", self.config.api_url);
        let body = self.request(session, Method::POST, url, Some(&payload)).await?;

        let update = parse_update(&body)?;
        if update.records_added as usize != records.len() {
            debug!(
                "batch add reported {} of {} records",
                update.records_added,
                records.len()
            );
        }
        Ok(())
    }

    /// One PUT that atomically replaces every record matching the
    /// deduplicated `(host, type)` selectors with exactly the payload.
    /// The caller has already ruled out an empty batch.
    pub(crate) async fn replace_records(
        &self,
        session: &mut Session,
        zone: &str,
        records: &[Record],
    ) -> Result<(), MythicBeastsError> {
        let encoded = encode_records(records)?;
        let query = selector_pairs(&encoded)
            .into_iter()
            .map(|(host, rtype)| format!("host={host}&type={rtype}"))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}/zones/{zone}/records?{query}", self.config.api_url);
        let payload = MythicRecordsRequest { records: encoded };
        let body = self.request(session, Method::PUT, url, Some(&payload)).await?;

        let update = parse_update(&body)?;
        debug!(
            "replace: {} added, {} removed",
            update.records_added, update.records_removed
        );
        Ok(())
    }

    /// One DELETE for a single record, addressed by its encoded host and
    /// type. Template- and auto-generated records are excluded from the
    /// delete scope. Returns whether the API actually removed a record.
    pub(crate) async fn remove_record(
        &self,
        session: &mut Session,
        zone: &str,
        record: &Record,
    ) -> Result<bool, MythicBeastsError> {
        let encoded = encode_record(record)?;
        let host = if encoded.host.is_empty() {
            "@"
        } else {
            encoded.host.as_str()
        };
        let url = format!(
            "{}/zones/{zone}/records/{host}/{}?exclude-template&exclude-generated",
            self.config.api_url, encoded.rtype
        );
        let body = self.request(session, Method::DELETE, url, None).await?;

        let update = parse_update(&body)?;
        Ok(update.records_removed == 1)
    }
}

/// Selector set for atomic replacement: one `(host, type)` pair per input
/// record, apex spelled `@`, duplicates collapsed with the first
/// occurrence winning.
pub(crate) fn selector_pairs(records: &[MythicRecord]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for record in records {
        let host = if record.host.is_empty() {
            "@".to_string()
        } else {
            record.host.clone()
        };
        let pair = (host, record.rtype.clone());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Mutation responses are `{records_added, records_removed}` on 200 and
/// absent on 201/204.
fn parse_update(body: &[u8]) -> Result<MythicRecordUpdate, MythicBeastsError> {
    if body.is_empty() {
        return Ok(MythicRecordUpdate::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Error bodies come in two shapes: a list (`{"errors": [...]}`), or a
/// single message (`{"error": "..."}`). Anything else degrades to an
/// opaque status-code error.
fn decode_api_error(status: u16, body: &[u8]) -> MythicBeastsError {
    if let Ok(list) = serde_json::from_slice::<MythicErrors>(body) {
        return MythicBeastsError::Api {
            status,
            message: list.errors.join("; "),
        };
    }
    if let Ok(single) = serde_json::from_slice::<MythicError>(body) {
        return MythicBeastsError::Api {
            status,
            message: single.error,
        };
    }
    MythicBeastsError::Api {
        status,
        message: format!("unknown error ({status})"),
    }
}
