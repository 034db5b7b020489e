use medorden_core::{CoreError, Result};
use serde::Serialize;
use std::time::Duration;

/// HTTP client for the external payment provider.
///
/// The three failure modes are reported distinctly and never collapsed into
/// a silent success: provider unreachable, non-success HTTP status, and a
/// success body that carries no payment URL.
pub struct ProviderClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct CrearPagoRequest<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
    comercio: &'a str,
    orden: &'a str,
    monto: u32,
    #[serde(rename = "urlRetorno")]
    url_retorno: &'a str,
}

impl ProviderClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Create a payment order and return the provider's redirect URL.
    pub async fn crear_pago(
        &self,
        comercio: &str,
        orden: &str,
        monto: u32,
        url_retorno: &str,
    ) -> Result<String> {
        let payload = CrearPagoRequest {
            api_key: &self.api_key,
            comercio,
            orden,
            monto,
            url_retorno,
        };

        let response = self
            .client
            .post(format!("{}/payment/create", self.api_url.trim_end_matches('/')))
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::upstream("pagos", format!("provider unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::upstream(
                "pagos",
                format!("provider returned HTTP {status}"),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoreError::upstream("pagos", format!("malformed provider response: {e}")))?;

        body.get("url")
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CoreError::upstream("pagos", "provider response carries no payment URL")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> ProviderClient {
        ProviderClient::new(uri, "clave-secreta", Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_crear_pago_returns_redirect_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create"))
            .and(body_partial_json(json!({"orden": "t1", "monto": 25000})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "url": "https://pagos.example/checkout/abc"
            })))
            .mount(&mock_server)
            .await;

        let url = client(&mock_server.uri())
            .crear_pago("medorden", "t1", 25000, "https://medorden.cl/retorno")
            .await
            .unwrap();
        assert_eq!(url, "https://pagos.example/checkout/abc");
    }

    #[tokio::test]
    async fn test_url_only_body_is_accepted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"url": "https://pagos.example/x"})),
            )
            .mount(&mock_server)
            .await;

        let url = client(&mock_server.uri())
            .crear_pago("medorden", "c9", 10000, "https://medorden.cl/retorno")
            .await
            .unwrap();
        assert_eq!(url, "https://pagos.example/x");
    }

    #[tokio::test]
    async fn test_non_success_status_is_distinct_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri())
            .crear_pago("medorden", "c9", 10000, "https://medorden.cl/retorno")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Upstream { .. }));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_missing_payment_url_is_distinct_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri())
            .crear_pago("medorden", "c9", 10000, "https://medorden.cl/retorno")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no payment URL"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_upstream_error() {
        let client = ProviderClient::new(
            "http://127.0.0.1:9",
            "clave",
            Duration::from_millis(300),
        );
        let err = client
            .crear_pago("medorden", "c9", 10000, "https://medorden.cl/retorno")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }
}
