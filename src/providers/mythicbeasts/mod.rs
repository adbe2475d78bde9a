//! Mythic Beasts DNS provider implementation
//!
//! Adapts the generic record operations to the Mythic Beasts DNS API v2:
//! bearer-token auth with lazy renewal, batch create, atomic
//! replace-by-selector, and per-record delete.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{DEFAULT_API_URL, DEFAULT_AUTH_URL, MythicBeastsConfig, MythicBeastsProvider};
pub use error::MythicBeastsError;
pub use types::MythicRecord;

use async_trait::async_trait;

use crate::core::provider::{RecordAppender, RecordDeleter, RecordGetter, RecordSetter};
use crate::core::record::Record;
use crate::error::Error;
use crate::providers::mythicbeasts::error::map_error;

/// Reduces a zone argument to the registrable domain the API expects.
///
/// The trailing dot is trimmed and the name is cut down to its effective
/// TLD plus one label, so a request for `deep.sub.example.co.uk.` is served
/// against `example.co.uk`. Callers managing subdomain-delegated zones
/// should pass the registrable parent explicitly. A name with no
/// registrable form (empty, a bare public suffix) fails before any network
/// activity.
pub(crate) fn normalize_zone(zone: &str) -> Result<String, MythicBeastsError> {
    let trimmed = zone.trim_end_matches('.').to_ascii_lowercase();
    psl::domain_str(&trimmed)
        .map(str::to_string)
        .ok_or_else(|| MythicBeastsError::InvalidZone(zone.to_string()))
}

#[async_trait]
impl RecordGetter for MythicBeastsProvider {
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Error> {
        let zone = normalize_zone(zone).map_err(map_error)?;
        let mut session = self.session.lock().await;
        self.ensure_token(&mut session).await.map_err(map_error)?;
        self.fetch_records(&mut session, &zone)
            .await
            .map_err(map_error)
    }
}

#[async_trait]
impl RecordAppender for MythicBeastsProvider {
    async fn append_records(
        &self,
        zone: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, Error> {
        let zone = normalize_zone(zone).map_err(map_error)?;
        let mut session = self.session.lock().await;
        self.ensure_token(&mut session).await.map_err(map_error)?;
        self.create_records(&mut session, &zone, &records)
            .await
            .map_err(map_error)?;
        // The batch response does not say which records it covered, so the
        // whole input counts as added.
        Ok(records)
    }
}

#[async_trait]
impl RecordSetter for MythicBeastsProvider {
    async fn set_records(&self, zone: &str, records: Vec<Record>) -> Result<Vec<Record>, Error> {
        let zone = normalize_zone(zone).map_err(map_error)?;
        // A PUT with no selectors would be ambiguous; an empty set is a no-op.
        if records.is_empty() {
            return Ok(records);
        }
        let mut session = self.session.lock().await;
        self.ensure_token(&mut session).await.map_err(map_error)?;
        self.replace_records(&mut session, &zone, &records)
            .await
            .map_err(map_error)?;
        Ok(records)
    }
}

#[async_trait]
impl RecordDeleter for MythicBeastsProvider {
    async fn delete_records(
        &self,
        zone: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, Error> {
        let zone = normalize_zone(zone).map_err(map_error)?;
        let mut session = self.session.lock().await;
        self.ensure_token(&mut session).await.map_err(map_error)?;

        let mut deleted = Vec::new();
        for record in records {
            match self.remove_record(&mut session, &zone, &record).await {
                Ok(true) => deleted.push(record),
                // Nothing matched; not a failure, just not deleted.
                Ok(false) => {}
                Err(e) => {
                    return Err(Error::Partial {
                        done: deleted,
                        source: Box::new(map_error(e)),
                    });
                }
            }
        }
        Ok(deleted)
    }
}
