use medorden_payments::Montos;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Payment provider configuration
    #[serde(default)]
    pub pagos: PagosConfig,
    /// Language-model configuration for the clinical note generator
    #[serde(default)]
    pub ia: IaConfig,
    /// IP geolocation configuration
    #[serde(default)]
    pub geo: GeoConfig,
    /// SMTP configuration for document delivery
    #[serde(default)]
    pub correo: CorreoConfig,
    /// Derivation catalog configuration
    #[serde(default)]
    pub derivacion: DerivacionConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // A provider URL without credentials cannot create payment orders.
        if self.pagos.proveedor_url.is_some()
            && self.pagos.api_key.as_deref().unwrap_or("").is_empty()
        {
            return Err("pagos.proveedor_url requires pagos.api_key".into());
        }
        if self.pagos.timeout_ms == 0 || self.ia.timeout_ms == 0 || self.geo.timeout_ms == 0 {
            return Err("upstream timeouts must be > 0".into());
        }
        if self.ia.endpoint.is_some() && self.ia.modelo.is_empty() {
            return Err("ia.endpoint requires ia.modelo".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Returns the base URL for the server.
    /// If `base_url` is configured, returns that; otherwise computes from host:port.
    pub fn base_url(&self) -> String {
        self.server
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL used in payment return links.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagosConfig {
    /// Payment provider API base URL. Unset means only guest mode works.
    #[serde(default)]
    pub proveedor_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_comercio")]
    pub comercio: String,
    #[serde(default = "default_pagos_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub montos: Montos,
}

fn default_comercio() -> String {
    "medorden".into()
}
fn default_pagos_timeout_ms() -> u64 {
    8_000
}

impl Default for PagosConfig {
    fn default() -> Self {
        Self {
            proveedor_url: None,
            api_key: None,
            comercio: default_comercio(),
            timeout_ms: default_pagos_timeout_ms(),
            montos: Montos::default(),
        }
    }
}

impl PagosConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IaConfig {
    /// Chat-completion endpoint. Unset means the deterministic catalog is
    /// used for every note.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_modelo")]
    pub modelo: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ia_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_modelo() -> String {
    "clinico-1".into()
}
fn default_ia_timeout_ms() -> u64 {
    10_000
}

impl Default for IaConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            modelo: default_modelo(),
            api_key: None,
            timeout_ms: default_ia_timeout_ms(),
        }
    }
}

impl IaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_true")]
    pub habilitado: bool,
    #[serde(default = "default_geo_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_geo_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}
fn default_geo_endpoint() -> String {
    "http://ip-api.com/json".into()
}
fn default_geo_timeout_ms() -> u64 {
    1_500
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            habilitado: default_true(),
            endpoint: default_geo_endpoint(),
            timeout_ms: default_geo_timeout_ms(),
        }
    }
}

impl GeoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorreoConfig {
    /// SMTP relay host. Unset disables email delivery.
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub clave: Option<String>,
    #[serde(default = "default_remitente")]
    pub remitente: String,
}

fn default_smtp_port() -> u16 {
    587
}
fn default_remitente() -> String {
    "ordenes@medorden.cl".into()
}

impl Default for CorreoConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            usuario: None,
            clave: None,
            remitente: default_remitente(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DerivacionConfig {
    /// Path to a TOML derivation catalog overriding the embedded rules.
    #[serde(default)]
    pub catalogo: Option<String>,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("medorden.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., MEDORDEN__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("MEDORDEN")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.base_url(), "http://0.0.0.0:8080");
        assert!(cfg.pagos.proveedor_url.is_none());
        assert!(cfg.geo.habilitado);
    }

    #[test]
    fn test_base_url_override() {
        let mut cfg = AppConfig::default();
        cfg.server.base_url = Some("https://medorden.cl".into());
        assert_eq!(cfg.base_url(), "https://medorden.cl");
    }

    #[test]
    fn test_provider_url_requires_api_key() {
        let mut cfg = AppConfig::default();
        cfg.pagos.proveedor_url = Some("https://pagos.example".into());
        assert!(cfg.validate().is_err());
        cfg.pagos.api_key = Some("clave".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_logging_level_rejected() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = AppConfig::default();
        cfg.ia.timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
[server]
port = 9090
base_url = "https://medorden.cl"

[pagos]
comercio = "clinica-maule"

[pagos.montos]
trauma = 25000
"#
        )
        .unwrap();

        let cfg = loader::load_config(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.base_url(), "https://medorden.cl");
        assert_eq!(cfg.pagos.comercio, "clinica-maule");
        assert_eq!(cfg.pagos.montos.trauma, 25000);
        // Untouched sections keep defaults.
        assert_eq!(cfg.pagos.montos.preop, 15000);
        assert_eq!(cfg.correo.smtp_port, 587);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = loader::load_config(Some("/definitely/not/here.toml")).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }
}
