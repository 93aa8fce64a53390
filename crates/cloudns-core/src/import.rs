//! Import identifier parsing
//!
//! Pre-existing records are referenced as `<zone>/<record-id>`. The zone is
//! taken verbatim: no case folding and no trailing-dot stripping.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A parsed `<zone>/<record-id>` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    /// Zone to list
    pub zone: String,
    /// Id of the record inside the zone
    pub record_id: String,
}

impl ImportReference {
    /// Parse a composite identifier
    ///
    /// Succeeds only when `raw` splits on `/` into exactly two non-empty parts.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut parts = raw.split('/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(zone), Some(record_id), None) if !zone.is_empty() && !record_id.is_empty() => {
                Ok(Self {
                    zone: zone.to_string(),
                    record_id: record_id.to_string(),
                })
            }
            _ => Err(Error::MalformedIdentifier(raw.to_string())),
        }
    }
}

impl FromStr for ImportReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImportReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.record_id)
    }
}
