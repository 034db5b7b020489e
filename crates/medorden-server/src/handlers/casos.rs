use crate::state::AppState;
use axum::{Json, extract::Path, extract::State};
use medorden_api::ApiError;
use serde_json::{Value, json};

pub async fn eliminar_caso(
    State(state): State<AppState>,
    Path(id_caso): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let eliminados = state.gate.eliminar_caso(&id_caso)?;
    tracing::info!(case = %id_caso, eliminados, "case deleted on request");
    Ok(Json(json!({"ok": true, "eliminados": eliminados})))
}
