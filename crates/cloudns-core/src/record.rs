//! Record data model
//!
//! [`Record`] is the generic, caller-facing shape of one DNS resource record.
//! [`WireRecord`] is what crosses the [`ZoneApi`](crate::traits::ZoneApi)
//! boundary. The two are converted by the [`codec`](crate::codec).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchanger (carries a priority)
    Mx,
    /// Name server
    Ns,
    /// Reverse pointer
    Ptr,
    /// Service locator (carries priority, weight and port)
    Srv,
    /// Free text
    Txt,
    /// Certification authority authorization
    Caa,
    /// ClouDNS apex alias
    Alias,
}

impl RecordType {
    /// Upper-case mnemonic as used by the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
            RecordType::Caa => "CAA",
            RecordType::Alias => "ALIAS",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "NS" => Ok(RecordType::Ns),
            "PTR" => Ok(RecordType::Ptr),
            "SRV" => Ok(RecordType::Srv),
            "TXT" => Ok(RecordType::Txt),
            "CAA" => Ok(RecordType::Caa),
            "ALIAS" => Ok(RecordType::Alias),
            _ => Err(Error::UnsupportedRecordType(s.to_string())),
        }
    }
}

/// Lifecycle of a record as seen by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Only known locally, no id yet
    Absent,
    /// Id assigned by the provider, not yet seen in a zone listing
    Pending,
    /// Seen in a zone listing
    Confirmed,
    /// Referenced locally but missing from the listing (deleted remotely)
    Stale,
    /// Deleted by us and confirmed gone
    Destroyed,
}

/// A DNS record in a zone
///
/// `priority` is only meaningful for MX and SRV, `weight` and `port` only for
/// SRV. `None` means "not applicable" and is distinct from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-assigned id, `None` until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Zone the record lives in (immutable once created)
    pub zone: String,

    /// Name of the record inside the zone (empty for the apex)
    pub host: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record content (address, target host, text, ...)
    pub value: String,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// MX/SRV priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    /// SRV weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,

    /// SRV port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Record {
    /// Create a record without type-specific fields
    pub fn new(
        zone: impl Into<String>,
        host: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            id: None,
            zone: zone.into(),
            host: host.into(),
            record_type,
            value: value.into(),
            ttl,
            priority: None,
            weight: None,
            port: None,
        }
    }

    /// Set the provider id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the MX/SRV priority
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the SRV weight
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the SRV port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Provider id, treating an empty string as "not yet materialized"
    pub fn materialized_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Fully qualified name, e.g. `www.example.com`
    pub fn fqdn(&self) -> String {
        if self.host.is_empty() || self.host == "@" {
            self.zone.clone()
        } else {
            format!("{}.{}", self.host, self.zone)
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} in {} {}",
            self.fqdn(),
            self.ttl,
            self.record_type,
            self.value
        )
    }
}

/// Provider-side representation of a record
///
/// Type-specific fields are omitted from the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Record id, absent on create requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Zone (`domain-name` on the ClouDNS API)
    pub zone: String,

    /// Host part
    pub host: String,

    /// Type mnemonic, kept as a string so foreign types survive listing
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record content
    pub record: String,

    /// TTL in seconds
    pub ttl: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}
