//! Id lookup inside a zone listing
//!
//! The provider can only list a whole zone, so locating one record is a
//! linear scan. Matching is strictly by id: the provider lets records with
//! identical host, type and content coexist, so no other attribute can tell
//! them apart.

use tracing::warn;

use crate::record::{Record, WireRecord};

/// Anything that carries a provider record id
pub trait Identified {
    /// The record id, if any
    fn record_id(&self) -> Option<&str>;
}

impl Identified for Record {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for WireRecord {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Find the record with id `want_id` in a zone listing
///
/// Returns `None` when nothing matches, which callers treat as "deleted
/// remotely" rather than as a failure. An empty `want_id` never matches.
pub fn find<'a, R: Identified>(records: &'a [R], want_id: &str) -> Option<&'a R> {
    if want_id.is_empty() {
        return None;
    }

    let mut matches = records
        .iter()
        .filter(|record| record.record_id() == Some(want_id));

    let first = matches.next()?;

    let extra = matches.count();
    if extra > 0 {
        warn!(
            record_id = want_id,
            duplicates = extra,
            "Zone listing contains the same record id more than once, using the first"
        );
    }

    Some(first)
}
