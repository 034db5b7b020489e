use serde::{Deserialize, Serialize};

/// Geolocation of one inbound request.
///
/// Produced per request and threaded explicitly into referral resolution;
/// there is no process-wide slot. A failed lookup yields an empty snapshot,
/// which the rule engine resolves through its wildcard fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeoSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pais: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
}

impl GeoSnapshot {
    /// Snapshot with no location data; resolves through the wildcard rule.
    pub fn vacio() -> Self {
        Self::default()
    }

    pub fn nuevo(pais: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            ip: None,
            pais: Some(pais.into()),
            region: Some(region.into()),
            ciudad: None,
        }
    }
}
