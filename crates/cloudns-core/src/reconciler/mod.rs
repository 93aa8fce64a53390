//! Record reconciler
//!
//! The [`Reconciler`] drives one record through its lifecycle against the
//! provider:
//!
//! ```text
//! Absent ──create──▶ Pending ──listed──▶ Confirmed ──delete──▶ Destroyed
//!                       │                    │
//!                       │ deadline passed    │ no longer listed
//!                       ▼                    ▼
//!             ConfirmationTimeout          Stale
//! ```
//!
//! ## Call discipline
//!
//! Every remote call first takes a slot from the shared
//! [`RateLimiter`]. Waiting for a slot and sleeping between confirmation
//! polls both stop as soon as the reconciler's cancellation token fires;
//! the operation then fails with [`Error::Cancelled`]. A cancelled create is
//! not rolled back.
//!
//! ## Retries
//!
//! Only the post-create confirmation poll repeats a call. Failed create,
//! update, destroy and list calls are surfaced immediately.

mod poll;

pub use poll::ConfirmationPolicy;

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::ReconcilerConfig;
use crate::error::{ApiError, Error, Result};
use crate::import::ImportReference;
use crate::rate_limit::RateLimiter;
use crate::record::{Record, RecordState};
use crate::traits::ZoneApi;
use crate::zone_index;

use poll::Backoff;

/// Result of looking a record up in its zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The record is listed; this is its authoritative content
    Confirmed(Record),
    /// The record is not listed (deleted outside of this client)
    ///
    /// Callers should forget the stored id.
    Stale,
}

impl Observation {
    /// Lifecycle state this observation puts the record in
    pub fn state(&self) -> RecordState {
        match self {
            Observation::Confirmed(_) => RecordState::Confirmed,
            Observation::Stale => RecordState::Stale,
        }
    }

    /// The observed record, if it is still listed
    pub fn record(&self) -> Option<&Record> {
        match self {
            Observation::Confirmed(record) => Some(record),
            Observation::Stale => None,
        }
    }

    /// Consume into the observed record, if it is still listed
    pub fn into_record(self) -> Option<Record> {
        match self {
            Observation::Confirmed(record) => Some(record),
            Observation::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Observation::Stale)
    }
}

/// Reconciles declared records against a provider zone
///
/// Operations take `&self`; share one reconciler (e.g. behind an `Arc`)
/// between tasks to keep their calls under one rate ceiling. Concurrent
/// operations on the *same* record id are not serialized.
pub struct Reconciler {
    /// Provider calls
    api: Arc<dyn ZoneApi>,

    /// Gate in front of every provider call
    limiter: Arc<RateLimiter>,

    /// Post-create visibility polling
    confirmation: ConfirmationPolicy,

    /// Caller-controlled cancellation
    cancel: CancellationToken,
}

impl Reconciler {
    /// Create a reconciler
    ///
    /// The configuration is validated first; invalid credentials or settings
    /// fail here with [`Error::Config`]. The reconciler gets its own
    /// [`RateLimiter`] sized by `config.requests_per_second`.
    pub fn new(api: Arc<dyn ZoneApi>, config: &ReconcilerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            api,
            limiter: Arc::new(RateLimiter::new(config.rate()?)),
            confirmation: ConfirmationPolicy {
                timeout: config.confirmation_timeout(),
                initial_interval: config.poll_initial_interval(),
                max_interval: config.poll_max_interval(),
            },
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the rate limiter, e.g. to share one between reconcilers
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Use a caller-supplied cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Override the confirmation poll settings
    pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    /// The limiter every call goes through
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// The token that cancels in-flight waits
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Create a record and wait until the provider lists it
    ///
    /// Returns the record as listed, including its new id. Fails with
    /// [`Error::ConfirmationTimeout`] if it does not appear within the
    /// confirmation timeout; the record then exists remotely but unconfirmed.
    pub async fn create(&self, desired: &Record) -> Result<Record> {
        let mut wire = codec::encode(desired)?;
        wire.id = None;

        debug!(
            zone = %desired.zone,
            host = %desired.host,
            record_type = %desired.record_type,
            ttl = desired.ttl,
            value = %desired.value,
            "CREATE {}",
            desired
        );

        self.gate("create", None).await?;
        let created = self
            .api
            .create_record(&wire)
            .await
            .map_err(|source| Error::CreateFailed {
                zone: desired.zone.clone(),
                source,
            })?;

        let id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::CreateFailed {
                zone: desired.zone.clone(),
                source: ApiError::invalid_response("create response carried no record id"),
            })?;

        info!(
            zone = %desired.zone,
            id = %id,
            state = ?RecordState::Pending,
            "Record created, waiting for it to be listed"
        );

        self.confirm(&desired.zone, &id).await
    }

    /// Look a record up by id
    ///
    /// A record missing from the listing is not an error: the result is
    /// [`Observation::Stale`].
    pub async fn read(&self, zone: &str, id: &str) -> Result<Observation> {
        debug!(zone, id, "READ");

        match self.lookup(zone, id, "read").await? {
            Some(record) => Ok(Observation::Confirmed(record)),
            None => {
                info!(
                    zone,
                    id,
                    state = ?RecordState::Stale,
                    "Record is no longer listed, treating it as deleted remotely"
                );
                Ok(Observation::Stale)
            }
        }
    }

    /// Replace a record and read back its authoritative state
    ///
    /// `desired` must carry the id of the existing record. The whole record
    /// is sent; nothing is patched field by field.
    pub async fn update(&self, desired: &Record) -> Result<Observation> {
        let id = desired
            .materialized_id()
            .ok_or_else(|| Error::missing_field(desired.record_type, "id"))?;
        let wire = codec::encode(desired)?;

        debug!(
            zone = %desired.zone,
            id,
            host = %desired.host,
            record_type = %desired.record_type,
            ttl = desired.ttl,
            value = %desired.value,
            "UPDATE {}",
            desired
        );

        self.gate("update", Some(id)).await?;
        let updated = self
            .api
            .update_record(&wire)
            .await
            .map_err(|source| Error::UpdateFailed {
                zone: desired.zone.clone(),
                id: id.to_string(),
                source,
            })?;

        let id = updated.id.as_deref().filter(|new| !new.is_empty()).unwrap_or(id);
        self.read(&desired.zone, id).await
    }

    /// Delete a record and verify it is gone
    ///
    /// Fails with [`Error::DeleteNotObserved`] if the provider accepted the
    /// delete but still lists the record.
    pub async fn delete(&self, zone: &str, id: &str) -> Result<()> {
        debug!(zone, id, "DELETE");

        self.gate("delete", Some(id)).await?;
        self.api
            .destroy_record(zone, id)
            .await
            .map_err(|source| Error::DeleteFailed {
                zone: zone.to_string(),
                id: id.to_string(),
                source,
            })?;

        match self.read(zone, id).await? {
            Observation::Stale => {
                info!(zone, id, state = ?RecordState::Destroyed, "Record deleted");
                Ok(())
            }
            Observation::Confirmed(_) => {
                warn!(zone, id, "Record still listed after a successful delete");
                Err(Error::DeleteNotObserved {
                    zone: zone.to_string(),
                    id: id.to_string(),
                })
            }
        }
    }

    /// Adopt an existing record from a `<zone>/<record-id>` identifier
    ///
    /// Unlike [`Reconciler::read`], a missing record is an error here.
    pub async fn import(&self, raw: &str) -> Result<Record> {
        let reference = ImportReference::parse(raw)?;
        debug!(zone = %reference.zone, id = %reference.record_id, "IMPORT");

        match self.read(&reference.zone, &reference.record_id).await? {
            Observation::Confirmed(record) => Ok(record),
            Observation::Stale => Err(Error::ImportRecordNotFound {
                zone: reference.zone,
                id: reference.record_id,
            }),
        }
    }

    /// Poll the zone until `id` is listed or the deadline passes
    async fn confirm(&self, zone: &str, id: &str) -> Result<Record> {
        let timeout = self.confirmation.timeout;
        let deadline = Instant::now() + timeout;
        let mut backoff = Backoff::new(&self.confirmation);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            if let Some(record) = self.lookup(zone, id, "create").await? {
                info!(zone, id, attempt, state = ?RecordState::Confirmed, "Record confirmed");
                return Ok(record);
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(zone, id, attempt, ?timeout, "Record was not listed before the deadline");
                return Err(Error::ConfirmationTimeout {
                    zone: zone.to_string(),
                    id: id.to_string(),
                    timeout,
                });
            }

            let wake = (now + backoff.next_delay()).min(deadline);
            debug!(zone, id, attempt, "Record not listed yet");

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!(zone, id, "Confirmation cancelled, record may exist unconfirmed");
                    return Err(Error::cancelled("create", Some(id.to_string())));
                }
                _ = tokio::time::sleep_until(wake) => {}
            }
        }
    }

    /// List `zone` and decode the record with `id`, if any
    async fn lookup(&self, zone: &str, id: &str, operation: &'static str) -> Result<Option<Record>> {
        self.gate(operation, Some(id)).await?;

        let listing = self
            .api
            .list_zone(zone)
            .await
            .map_err(|source| Error::ReadFailed {
                zone: zone.to_string(),
                source,
            })?;

        debug!(zone, records = listing.len(), "Zone listed");

        zone_index::find(&listing, id).map(codec::decode).transpose()
    }

    /// Wait for a rate limit slot unless cancelled first
    async fn gate(&self, operation: &'static str, id: Option<&str>) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(Error::cancelled(operation, id.map(str::to_string)))
            }
            _ = self.limiter.acquire() => Ok(()),
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("provider", &self.api.provider_name())
            .field("limiter", &self.limiter)
            .field("confirmation", &self.confirmation)
            .finish()
    }
}
