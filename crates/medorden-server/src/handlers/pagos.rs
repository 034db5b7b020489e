use crate::state::AppState;
use axum::{Json, extract::State};
use medorden_api::ApiError;
use medorden_core::Space;
use medorden_payments::PagoIniciado;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct IniciarPagoRequest {
    #[serde(rename = "idCaso")]
    pub id_caso: String,
    pub modulo: String,
    /// Patient data merged into the module's record alongside the payment.
    #[serde(default)]
    pub datos: Option<Value>,
    /// Cost-free sandbox mode: authorization is granted immediately.
    #[serde(default)]
    pub invitado: bool,
}

pub async fn iniciar_pago(
    State(state): State<AppState>,
    Json(req): Json<IniciarPagoRequest>,
) -> Result<Json<PagoIniciado>, ApiError> {
    let modulo: Space = req.modulo.parse()?;
    let pago = state
        .gate
        .iniciar_pago(&req.id_caso, modulo, req.datos, req.invitado)
        .await?;
    Ok(Json(pago))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmarPagoRequest {
    #[serde(rename = "idCaso")]
    pub id_caso: String,
}

pub async fn confirmar_pago(
    State(state): State<AppState>,
    Json(req): Json<ConfirmarPagoRequest>,
) -> Result<Json<Value>, ApiError> {
    state.gate.confirmar_pago(&req.id_caso).await?;
    Ok(Json(json!({"ok": true})))
}
