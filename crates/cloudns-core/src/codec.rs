//! Record codec
//!
//! Maps a generic [`Record`] onto the provider's [`WireRecord`] and back.
//! Which optional fields travel is decided by one exhaustive match over the
//! record type ([`TypeFields`]); fields that do not apply to a type are
//! omitted on the wire rather than sent as zero.

use crate::error::{Error, Result};
use crate::record::{Record, RecordType, WireRecord};

/// Type-specific fields of a record, keyed by record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFields {
    /// No type-specific fields
    Plain,
    /// MX priority
    Mx { priority: u16 },
    /// SRV priority, weight and port
    Srv { priority: u16, weight: u16, port: u16 },
}

impl TypeFields {
    /// Project a record onto its type-specific fields
    ///
    /// Fails with [`Error::MissingRequiredField`] when the type needs a field
    /// the record does not carry. Stray fields on types that do not use them
    /// are ignored.
    pub fn of(record: &Record) -> Result<Self> {
        let required = |value: Option<u16>, field: &'static str| {
            value.ok_or_else(|| Error::missing_field(record.record_type, field))
        };

        match record.record_type {
            RecordType::Mx => Ok(TypeFields::Mx {
                priority: required(record.priority, "priority")?,
            }),
            RecordType::Srv => Ok(TypeFields::Srv {
                priority: required(record.priority, "priority")?,
                weight: required(record.weight, "weight")?,
                port: required(record.port, "port")?,
            }),
            RecordType::A
            | RecordType::Aaaa
            | RecordType::Cname
            | RecordType::Ns
            | RecordType::Ptr
            | RecordType::Txt
            | RecordType::Caa
            | RecordType::Alias => Ok(TypeFields::Plain),
        }
    }

    fn priority(&self) -> Option<u16> {
        match self {
            TypeFields::Plain => None,
            TypeFields::Mx { priority } | TypeFields::Srv { priority, .. } => Some(*priority),
        }
    }

    fn weight(&self) -> Option<u16> {
        match self {
            TypeFields::Srv { weight, .. } => Some(*weight),
            TypeFields::Plain | TypeFields::Mx { .. } => None,
        }
    }

    fn port(&self) -> Option<u16> {
        match self {
            TypeFields::Srv { port, .. } => Some(*port),
            TypeFields::Plain | TypeFields::Mx { .. } => None,
        }
    }
}

/// Encode a record for the provider
///
/// Validation happens here, so a record that cannot be encoded never reaches
/// the network.
pub fn encode(record: &Record) -> Result<WireRecord> {
    let fields = TypeFields::of(record)?;

    Ok(WireRecord {
        id: record.materialized_id().map(str::to_string),
        zone: record.zone.clone(),
        host: record.host.clone(),
        record_type: record.record_type.as_str().to_string(),
        record: record.value.clone(),
        ttl: record.ttl,
        priority: fields.priority(),
        weight: fields.weight(),
        port: fields.port(),
    })
}

/// Decode a provider record
///
/// Only the fields the wire type warrants are copied; anything else the
/// provider sent is dropped.
pub fn decode(wire: &WireRecord) -> Result<Record> {
    let record_type: RecordType = wire.record_type.parse()?;

    let (priority, weight, port) = match record_type {
        RecordType::Mx => (wire.priority, None, None),
        RecordType::Srv => (wire.priority, wire.weight, wire.port),
        RecordType::A
        | RecordType::Aaaa
        | RecordType::Cname
        | RecordType::Ns
        | RecordType::Ptr
        | RecordType::Txt
        | RecordType::Caa
        | RecordType::Alias => (None, None, None),
    };

    Ok(Record {
        id: wire.id.clone().filter(|id| !id.is_empty()),
        zone: wire.zone.clone(),
        host: wire.host.clone(),
        record_type,
        value: wire.record.clone(),
        ttl: wire.ttl,
        priority,
        weight,
        port,
    })
}
