use async_trait::async_trait;
use axum::http::HeaderMap;
use medorden_core::GeoSnapshot;
use serde::Deserialize;
use std::time::Duration;

/// Per-request geolocation source.
///
/// The snapshot is produced for each request and threaded explicitly into
/// referral resolution; implementations never fail, they degrade to an empty
/// snapshot that resolves through the wildcard rule.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    async fn lookup(&self, ip: Option<&str>) -> GeoSnapshot;
}

/// ip-api style HTTP lookup with a bounded timeout.
pub struct HttpGeoProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GeoRespuesta {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    city: Option<String>,
}

impl HttpGeoProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn lookup(&self, ip: Option<&str>) -> GeoSnapshot {
        let Some(ip) = ip.filter(|ip| !ip.trim().is_empty()) else {
            return GeoSnapshot::vacio();
        };

        let url = format!(
            "{}/{ip}?fields=countryCode,regionName,city",
            self.endpoint.trim_end_matches('/')
        );
        let respuesta = async {
            let resp = self
                .client
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await
                .ok()?;
            if !resp.status().is_success() {
                return None;
            }
            resp.json::<GeoRespuesta>().await.ok()
        }
        .await;

        match respuesta {
            Some(geo) => GeoSnapshot {
                ip: Some(ip.to_string()),
                pais: geo.country_code,
                region: geo.region_name,
                ciudad: geo.city,
            },
            None => {
                tracing::warn!(ip, "geolocation lookup failed; resolving without location");
                GeoSnapshot::vacio()
            }
        }
    }
}

/// Fixed snapshot provider, for disabled lookups and tests.
pub struct FixedGeoProvider(pub GeoSnapshot);

#[async_trait]
impl GeoProvider for FixedGeoProvider {
    async fn lookup(&self, ip: Option<&str>) -> GeoSnapshot {
        let mut geo = self.0.clone();
        geo.ip = ip.map(str::to_string).or(geo.ip);
        geo
    }
}

/// Resolve the client IP from forwarding headers.
///
/// Takes the first hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let primero = xff.split(',').next().map(str::trim).unwrap_or("");
        if !primero.is_empty() {
            return Some(primero.to_string());
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
