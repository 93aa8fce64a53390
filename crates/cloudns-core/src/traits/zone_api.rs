// # Zone API Trait
//
// Defines the provider calls the reconciler is built on.
//
// ## Implementations
//
// - ClouDNS HTTP API: `cloudns-api` crate
// - In-memory fake: `tests/common` of this crate
//
// ## Usage
//
// ```rust,ignore
// use cloudns_core::ZoneApi;
//
// async fn dump(api: &dyn ZoneApi) -> Result<(), cloudns_core::ApiError> {
//     for record in api.list_zone("example.com").await? {
//         println!("{:?} {} {}", record.id, record.record_type, record.record);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::error::ApiError;
use crate::record::WireRecord;

/// Provider zone and record operations
///
/// Each method is a single remote call. Implementations do not retry, pace or
/// cache: pacing belongs to the [`RateLimiter`](crate::RateLimiter) in front
/// of every call and retrying belongs to the
/// [`Reconciler`](crate::Reconciler).
///
/// # Thread Safety
///
/// Implementations must be usable from concurrent tasks.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List every record of a zone
    ///
    /// The provider offers no lookup by id; this is the only read.
    async fn list_zone(&self, zone: &str) -> Result<Vec<WireRecord>, ApiError>;

    /// Create a record and return it with its provider-assigned id
    async fn create_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError>;

    /// Replace a whole record, identified by `record.id`
    async fn update_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError>;

    /// Delete a record
    async fn destroy_record(&self, zone: &str, id: &str) -> Result<(), ApiError>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
