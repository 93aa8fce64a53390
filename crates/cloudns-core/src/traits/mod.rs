//! Core traits for reconciliation
//!
//! - [`ZoneApi`]: the provider's zone and record RPCs

pub mod zone_api;

pub use zone_api::ZoneApi;
