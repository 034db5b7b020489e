use crate::provider::ProviderClient;
use medorden_core::{CaseRecord, CoreError, MetaRecord, Result, Space};
use medorden_store::CaseStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Per-module payment amounts (CLP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Montos {
    #[serde(default = "default_monto")]
    pub trauma: u32,
    #[serde(default = "default_monto")]
    pub preop: u32,
    #[serde(default = "default_monto")]
    pub generales: u32,
    #[serde(default = "default_monto")]
    pub ia: u32,
}

fn default_monto() -> u32 {
    15_000
}

impl Default for Montos {
    fn default() -> Self {
        Self {
            trauma: default_monto(),
            preop: default_monto(),
            generales: default_monto(),
            ia: default_monto(),
        }
    }
}

impl Montos {
    pub fn para(&self, modulo: Space) -> u32 {
        match modulo {
            Space::Trauma => self.trauma,
            Space::Preop => self.preop,
            Space::Generales => self.generales,
            Space::Ia => self.ia,
            Space::Meta => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagoIniciado {
    pub ok: bool,
    pub url: String,
}

/// Payment gate: authorizes one module per case and guards document access.
///
/// States per case: unpaid → authorized(module); the `ia` module requires an
/// additional explicit confirmation (`pagoConfirmado`) before documents are
/// released.
pub struct PaymentGate {
    store: Arc<CaseStore>,
    provider: Option<ProviderClient>,
    comercio: String,
    base_url: String,
    montos: Montos,
}

impl PaymentGate {
    pub fn new(
        store: Arc<CaseStore>,
        provider: Option<ProviderClient>,
        comercio: impl Into<String>,
        base_url: impl Into<String>,
        montos: Montos,
    ) -> Self {
        Self {
            store,
            provider,
            comercio: comercio.into(),
            base_url: base_url.into(),
            montos,
        }
    }

    fn url_retorno(&self, id: &str, modulo: Space) -> String {
        format!(
            "{}/pago/retorno?idPago={id}&modulo={modulo}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Initiate payment for `(id, modulo)`.
    ///
    /// Merges any patient data supplied alongside the request into the
    /// module's record, then asserts the meta authorization unconditionally.
    /// Guest mode grants authorization immediately (and confirms `ia`);
    /// real mode asks the provider for a redirect URL.
    pub async fn iniciar_pago(
        &self,
        id: &str,
        modulo: Space,
        datos: Option<serde_json::Value>,
        invitado: bool,
    ) -> Result<PagoIniciado> {
        if id.trim().is_empty() {
            return Err(CoreError::validation("idCaso is required"));
        }
        if !modulo.es_modulo() {
            return Err(CoreError::validation(format!(
                "'{modulo}' is not a payable module"
            )));
        }

        if let Some(datos) = datos.filter(|d| !d.is_null()) {
            let entrante = CaseRecord::parse(modulo, datos)?;
            self.store.update(modulo, id, entrante).await?;
        }

        // UNPAID -> AUTHORIZED(modulo); re-assertion for the same module is a
        // no-op by value, a different module takes over the authorization.
        self.store.put(
            Space::Meta,
            id,
            CaseRecord::Meta(MetaRecord {
                modulo_autorizado: modulo,
            }),
        );

        if invitado {
            if modulo == Space::Ia {
                let confirmacion = CaseRecord::parse(Space::Ia, json!({"pagoConfirmado": true}))?;
                self.store.update(Space::Ia, id, confirmacion).await?;
            }
            tracing::info!(case = id, modulo = %modulo, "guest payment authorized");
            return Ok(PagoIniciado {
                ok: true,
                url: self.url_retorno(id, modulo),
            });
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            CoreError::configuration("payment provider credentials not configured")
        })?;
        let url = provider
            .crear_pago(
                &self.comercio,
                id,
                self.montos.para(modulo),
                &self.url_retorno(id, modulo),
            )
            .await?;
        tracing::info!(case = id, modulo = %modulo, "payment order created");
        Ok(PagoIniciado { ok: true, url })
    }

    /// Confirm a completed payment on provider return.
    ///
    /// Only meaningful for `ia`, whose documents stay gated until this flag
    /// latches; for the other modules authorization alone releases them.
    pub async fn confirmar_pago(&self, id: &str) -> Result<()> {
        let Some(CaseRecord::Meta(meta)) = self.store.get(Space::Meta, id) else {
            return Err(CoreError::not_found("meta", id));
        };
        if meta.modulo_autorizado == Space::Ia {
            let confirmacion = CaseRecord::parse(Space::Ia, json!({"pagoConfirmado": true}))?;
            self.store.update(Space::Ia, id, confirmacion).await?;
        }
        Ok(())
    }

    /// Authorize document retrieval for `(id, modulo)` and return the record.
    ///
    /// Check order matters: authorization mismatch reads as "pay first" even
    /// when a record exists for the requested module, and the `ia`
    /// confirmation guard is layered after the generic checks.
    pub fn autorizar_documento(&self, id: &str, modulo: Space) -> Result<CaseRecord> {
        if !modulo.es_modulo() {
            return Err(CoreError::validation(format!(
                "'{modulo}' is not a document module"
            )));
        }

        match self.store.get(Space::Meta, id) {
            Some(CaseRecord::Meta(meta)) if meta.modulo_autorizado == modulo => {}
            Some(CaseRecord::Meta(meta)) => {
                return Err(CoreError::payment_required(format!(
                    "case is authorized for '{}' only",
                    meta.modulo_autorizado
                )));
            }
            _ => {
                return Err(CoreError::payment_required(
                    "no payment registered for this case",
                ));
            }
        }

        let record = self
            .store
            .get(modulo, id)
            .ok_or_else(|| CoreError::not_found(modulo.as_str(), id))?;

        if let CaseRecord::Ia(ia) = &record
            && !ia.pago_confirmado
        {
            return Err(CoreError::payment_required(
                "imaging order pending payment confirmation",
            ));
        }

        Ok(record)
    }

    /// Delete a case explicitly. Requires the case to have been authorized at
    /// least once (a meta record exists).
    pub fn eliminar_caso(&self, id: &str) -> Result<usize> {
        if self.store.get(Space::Meta, id).is_none() {
            return Err(CoreError::not_found("meta", id));
        }
        Ok(self.store.remove_case(id))
    }
}
