use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use medorden_api::ApiError;
use medorden_core::Space;
use medorden_docs::por_modulo;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DocumentoQuery {
    /// Remove the whole case after the document is delivered.
    #[serde(default)]
    pub reiniciar: bool,
}

/// Stream the rendered PDF for an authorized, paid case.
pub async fn obtener_documento(
    State(state): State<AppState>,
    Path((modulo, id_caso)): Path<(String, String)>,
    Query(query): Query<DocumentoQuery>,
) -> Result<Response, ApiError> {
    let modulo: Space = modulo.parse()?;
    let record = state.gate.autorizar_documento(&id_caso, modulo)?;
    let documento = por_modulo(modulo, &record)?;
    let bytes = documento.render()?;
    tracing::info!(case = %id_caso, modulo = %modulo, bytes = bytes.len(), "document rendered");

    if query.reiniciar {
        // Deferred best-effort cleanup: the response is already rendered and
        // a failure here must not reach the client.
        let store = Arc::clone(&state.store);
        let id = id_caso.clone();
        tokio::spawn(async move {
            let eliminados = store.remove_case(&id);
            tracing::debug!(case = %id, eliminados, "post-response case cleanup");
        });
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", documento.nombre_archivo()),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("response build error: {e}")))
}

#[derive(Debug, Deserialize)]
pub struct EnviarDocumentoRequest {
    pub email: String,
}

/// Render the document and deliver it by email as a PDF attachment.
pub async fn enviar_documento(
    State(state): State<AppState>,
    Path((modulo, id_caso)): Path<(String, String)>,
    Json(req): Json<EnviarDocumentoRequest>,
) -> Result<Json<Value>, ApiError> {
    let modulo: Space = modulo.parse()?;
    let record = state.gate.autorizar_documento(&id_caso, modulo)?;
    let documento = por_modulo(modulo, &record)?;
    let bytes = documento.render()?;

    let correo = state
        .correo
        .as_ref()
        .ok_or_else(|| ApiError::internal("email delivery is not configured"))?;
    correo
        .enviar_documento(
            &req.email,
            documento.titulo(),
            "Adjuntamos su documento clínico en formato PDF.",
            documento.nombre_archivo(),
            bytes,
        )
        .await?;

    Ok(Json(json!({"ok": true})))
}
