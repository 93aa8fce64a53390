//! ClouDNS response shapes
//!
//! The API is loose about JSON types: ids, TTLs and SRV/MX numbers arrive as
//! numbers or as strings depending on the endpoint, and optional numbers may
//! be `""` or `null`. The helpers here accept all of those.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde::de::Error as _;
use serde_json::Value;

/// A number the API may encode as a string
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(u64),
    String(String),
}

/// Deserialize an id given as number or string
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Number(n)) => Some(n.to_string()),
        Some(Lenient::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Number(n)) => Ok(Some(n)),
        Some(Lenient::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Lenient::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("expected a number, got {s:?}: {e}"))),
        None => Ok(None),
    }
}

fn ttl<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_u64(deserializer)?.ok_or_else(|| D::Error::custom("missing ttl"))?;
    u32::try_from(value).map_err(|_| D::Error::custom(format!("ttl out of range: {value}")))
}

fn optional_u16<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_u64(deserializer)?
        .map(|value| {
            u16::try_from(value).map_err(|_| D::Error::custom(format!("value out of range: {value}")))
        })
        .transpose()
}

/// One entry of `records.json`
#[derive(Debug, Deserialize)]
pub(crate) struct ListedRecord {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub host: String,
    pub record: String,
    #[serde(deserialize_with = "ttl")]
    pub ttl: u32,
    #[serde(default, deserialize_with = "optional_u16")]
    pub priority: Option<u16>,
    #[serde(default, deserialize_with = "optional_u16")]
    pub weight: Option<u16>,
    #[serde(default, deserialize_with = "optional_u16")]
    pub port: Option<u16>,
}

/// `records.json` body: an object keyed by id, or `[]` for an empty zone
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing {
    Records(BTreeMap<String, ListedRecord>),
    Empty(Vec<Value>),
}

impl Listing {
    /// Entries paired with their map key, which stands in for a missing id
    pub(crate) fn into_records(self) -> Vec<(String, ListedRecord)> {
        match self {
            Listing::Records(records) => records.into_iter().collect(),
            Listing::Empty(_) => Vec::new(),
        }
    }
}

/// Body of the mutating endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: String,
    #[serde(rename = "statusDescription", default)]
    pub status_description: String,
    #[serde(default)]
    pub data: Option<MutationData>,
}

impl StatusResponse {
    pub(crate) fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MutationData {
    #[serde(default, deserialize_with = "id_string")]
    pub id: Option<String>,
}

/// Description of a `{"status":"Failed",...}` body, if `body` is one
pub(crate) fn failure_description(body: &Value) -> Option<String> {
    let status = body.get("status")?.as_str()?;
    if !status.eq_ignore_ascii_case("failed") {
        return None;
    }
    Some(
        body.get("statusDescription")
            .and_then(Value::as_str)
            .unwrap_or("request failed without a description")
            .to_string(),
    )
}
