use serde::Deserialize;

use crate::json;

use super::NOT_AVAILABLE;

/// Static identity of an airframe as returned by the lookup service
/// (`/v2/hex/<hex>` on an adsb.lol compatible API).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AircraftMetadata {
    #[serde(rename = "r", default, deserialize_with = "json::text")]
    pub registration: Option<String>,
    #[serde(rename = "t", default, deserialize_with = "json::text")]
    pub type_code: Option<String>,
    #[serde(rename = "ownOp", default, deserialize_with = "json::text")]
    pub operator: Option<String>,
}

impl AircraftMetadata {
    pub fn registration_or_default(&self) -> &str {
        self.registration.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn type_code_or_default(&self) -> &str {
        self.type_code.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn operator_or_default(&self) -> &str {
        self.operator.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Envelope of a lookup response. Only the first `ac` entry is used.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default, deserialize_with = "json::records")]
    ac: Vec<AircraftMetadata>,
}

/// Decode a lookup response body.
///
/// Returns `None` when the service had no match: the body is not JSON,
/// is not an object, or `ac` is missing or empty. A match whose fields
/// are blank is still `Some`.
pub fn parse_lookup(body: &[u8]) -> Option<AircraftMetadata> {
    serde_json::from_slice::<LookupResponse>(body)
        .ok()?
        .ac
        .into_iter()
        .next()
}
