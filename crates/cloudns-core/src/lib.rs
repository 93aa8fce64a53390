// # cloudns-core
//
// Core library for reconciling a declared DNS record against the record set a
// ClouDNS zone actually holds.
//
// ## Architecture Overview
//
// - **RateLimiter**: paces every outbound call to N per second, no bursts
// - **codec**: maps the generic `Record` onto the provider's `WireRecord`
//   (MX priority, SRV priority/weight/port) and back
// - **zone_index**: finds a record by id in a full zone listing
// - **ImportReference**: parses `<zone>/<record-id>` import identifiers
// - **Reconciler**: create / read / update / delete / import, including the
//   post-create confirmation poll
// - **ZoneApi**: the provider calls, implemented by `cloudns-api`
//
// ## Design Principles
//
// 1. **Identity by id**: records are matched on their provider id only
// 2. **Validate before calling**: input errors never reach the network
// 3. **Bounded waiting**: pacing and confirmation are the only waits, both
//    cancellable, the latter with a hard deadline
// 4. **Library-First**: the command-line caller is a thin layer on top

pub mod codec;
pub mod config;
pub mod error;
pub mod import;
pub mod rate_limit;
pub mod reconciler;
pub mod record;
pub mod traits;
pub mod zone_index;

// Re-export core types for convenience
pub use config::{AuthIdentity, Credentials, ReconcilerConfig};
pub use error::{ApiError, Error, Result};
pub use import::ImportReference;
pub use rate_limit::RateLimiter;
pub use reconciler::{ConfirmationPolicy, Observation, Reconciler};
pub use record::{Record, RecordState, RecordType, WireRecord};
pub use traits::ZoneApi;
