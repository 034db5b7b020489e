use crate::config::AppConfig;
use crate::correo::Mailer;
use crate::geoip::{FixedGeoProvider, GeoProvider, HttpGeoProvider};
use medorden_ai::{HttpNoteGenerator, NoteGenerator};
use medorden_core::{GeoSnapshot, Result};
use medorden_payments::{PaymentGate, ProviderClient};
use medorden_referral::{DerivationRule, default_rules, rules_desde_archivo};
use medorden_store::CaseStore;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CaseStore>,
    pub gate: Arc<PaymentGate>,
    /// Clinical note generator; `None` means catalog-only operation.
    pub notas: Option<Arc<dyn NoteGenerator>>,
    pub geo: Arc<dyn GeoProvider>,
    /// Document email delivery; `None` means the endpoint reports
    /// a configuration error.
    pub correo: Option<Arc<Mailer>>,
    pub reglas: Arc<Vec<DerivationRule>>,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// Assemble the full state from configuration.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let store = Arc::new(CaseStore::new());

        let provider = match (&cfg.pagos.proveedor_url, &cfg.pagos.api_key) {
            (Some(url), Some(key)) => {
                Some(ProviderClient::new(url, key, cfg.pagos.timeout()))
            }
            _ => None,
        };
        let gate = Arc::new(PaymentGate::new(
            Arc::clone(&store),
            provider,
            cfg.pagos.comercio.clone(),
            cfg.base_url(),
            cfg.pagos.montos.clone(),
        ));

        let notas: Option<Arc<dyn NoteGenerator>> = cfg.ia.endpoint.as_ref().map(|endpoint| {
            Arc::new(HttpNoteGenerator::new(
                endpoint,
                &cfg.ia.modelo,
                cfg.ia.api_key.clone(),
                cfg.ia.timeout(),
            )) as Arc<dyn NoteGenerator>
        });

        let geo: Arc<dyn GeoProvider> = if cfg.geo.habilitado {
            Arc::new(HttpGeoProvider::new(&cfg.geo.endpoint, cfg.geo.timeout()))
        } else {
            Arc::new(FixedGeoProvider(GeoSnapshot::vacio()))
        };

        let correo = cfg.correo.smtp_host.as_ref().map(|host| {
            Arc::new(Mailer::new(
                host,
                cfg.correo.smtp_port,
                cfg.correo.usuario.clone(),
                cfg.correo.clave.clone(),
                cfg.correo.remitente.clone(),
            ))
        });

        let reglas = match &cfg.derivacion.catalogo {
            Some(path) => rules_desde_archivo(path)?,
            None => default_rules(),
        };

        Ok(Self {
            store,
            gate,
            notas,
            geo,
            correo,
            reglas: Arc::new(reglas),
            body_limit_bytes: cfg.server.body_limit_bytes,
        })
    }
}
