//! Module intake endpoints.
//!
//! Each endpoint merges the patient input into its module's case record,
//! drafts exams and a narrative (language model first, deterministic catalog
//! on any failure), resolves the referral from per-request geolocation, and
//! persists the derived fields through the merge policy.

use crate::geoip::client_ip;
use crate::state::AppState;
use axum::{Json, extract::State, http::HeaderMap};
use medorden_ai::generator::NotaClinica;
use medorden_ai::{catalogo, prompts};
use medorden_api::ApiError;
use medorden_core::{CaseRecord, Space};
use medorden_referral::{resolver, resolver_clinico};
use serde_json::{Value, json};

/// Pull the required `idCaso` out of the request body; the rest of the body
/// is the partial record update.
fn extraer_id_caso(body: &mut Value) -> Result<String, ApiError> {
    let objeto = body
        .as_object_mut()
        .ok_or_else(|| ApiError::bad_request("request body must be a JSON object"))?;
    match objeto.remove("idCaso") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id),
        _ => Err(ApiError::bad_request("idCaso is required")),
    }
}

/// Ask the model for a note, falling back to the deterministic catalog on
/// any upstream failure so the intake flow always completes.
async fn nota_con_fallback(
    state: &AppState,
    prompt: &str,
    fallback: impl FnOnce() -> NotaClinica,
) -> NotaClinica {
    match &state.notas {
        Some(generador) => match generador.generar(prompt).await {
            Ok(nota) => nota,
            Err(e) => {
                tracing::warn!(error = %e, "note generator failed; using catalog fallback");
                fallback()
            }
        },
        None => fallback(),
    }
}

pub async fn analizar_trauma(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = extraer_id_caso(&mut body)?;
    let entrante = CaseRecord::parse(Space::Trauma, body)?;
    let CaseRecord::Trauma(registro) = state.store.update(Space::Trauma, &id, entrante).await?
    else {
        return Err(ApiError::internal("stored record has the wrong shape"));
    };

    let zona = registro
        .zona_dolor
        .clone()
        .ok_or_else(|| ApiError::bad_request("zonaDolor is required"))?;
    let lado = registro.lado.clone();

    let prompt = prompts::prompt_trauma(&zona, lado.as_deref(), registro.sintomas.as_deref());
    let nota = nota_con_fallback(&state, &prompt, || {
        catalogo::nota_trauma(&zona, lado.as_deref(), registro.sintomas.as_deref())
    })
    .await;

    let geo = state.geo.lookup(client_ip(&headers).as_deref()).await;
    let derivacion = resolver_clinico(&state.reglas, &geo, &zona, lado.as_deref());

    let derivado = CaseRecord::parse(
        Space::Trauma,
        json!({
            "examenesIA": &nota.examenes,
            "informe": &nota.informe,
            "derivacion": &derivacion.nota,
        }),
    )?;
    state.store.update(Space::Trauma, &id, derivado).await?;

    Ok(Json(json!({
        "ok": true,
        "examenes": &nota.examenes,
        "informe": &nota.informe,
        "derivacion": &derivacion.nota,
    })))
}

pub async fn evaluar_preop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = extraer_id_caso(&mut body)?;
    let entrante = CaseRecord::parse(Space::Preop, body)?;
    let CaseRecord::Preop(registro) = state.store.update(Space::Preop, &id, entrante).await?
    else {
        return Err(ApiError::internal("stored record has the wrong shape"));
    };

    let prompt = prompts::prompt_preop(
        registro.tipo_cirugia.as_deref(),
        registro.paciente.edad,
        &registro.comorbilidades,
    );
    let nota = nota_con_fallback(&state, &prompt, || {
        catalogo::nota_preop(
            registro.paciente.edad,
            &registro.comorbilidades,
            registro.tipo_cirugia.as_deref(),
        )
    })
    .await;

    let geo = state.geo.lookup(client_ip(&headers).as_deref()).await;
    let sede = resolver(&state.reglas, &geo);
    let derivacion = format!("Derivado a {}. {}", sede.sede, sede.mensaje);

    let derivado = CaseRecord::parse(
        Space::Preop,
        json!({
            "examenes": &nota.examenes,
            "informe": &nota.informe,
            "derivacion": &derivacion,
        }),
    )?;
    state.store.update(Space::Preop, &id, derivado).await?;

    Ok(Json(json!({
        "ok": true,
        "examenes": &nota.examenes,
        "informe": &nota.informe,
        "derivacion": &derivacion,
    })))
}

pub async fn evaluar_generales(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = extraer_id_caso(&mut body)?;
    let entrante = CaseRecord::parse(Space::Generales, body)?;
    let CaseRecord::Generales(registro) =
        state.store.update(Space::Generales, &id, entrante).await?
    else {
        return Err(ApiError::internal("stored record has the wrong shape"));
    };

    let prompt = prompts::prompt_generales(
        registro.paciente.edad,
        registro.paciente.sexo.as_deref(),
        registro.motivo_consulta.as_deref(),
    );
    let nota = nota_con_fallback(&state, &prompt, || {
        catalogo::nota_generales(registro.paciente.edad, registro.paciente.sexo.as_deref())
    })
    .await;

    let geo = state.geo.lookup(client_ip(&headers).as_deref()).await;
    let sede = resolver(&state.reglas, &geo);
    let derivacion = format!("Derivado a {}. {}", sede.sede, sede.mensaje);

    let derivado = CaseRecord::parse(
        Space::Generales,
        json!({
            "examenes": &nota.examenes,
            "informe": &nota.informe,
            "derivacion": &derivacion,
        }),
    )?;
    state.store.update(Space::Generales, &id, derivado).await?;

    Ok(Json(json!({
        "ok": true,
        "examenes": &nota.examenes,
        "informe": &nota.informe,
        "derivacion": &derivacion,
    })))
}

pub async fn analizar_ia(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = extraer_id_caso(&mut body)?;
    let entrante = CaseRecord::parse(Space::Ia, body)?;
    let CaseRecord::Ia(registro) = state.store.update(Space::Ia, &id, entrante).await? else {
        return Err(ApiError::internal("stored record has the wrong shape"));
    };

    let prompt = prompts::prompt_ia(
        registro.tipo_examen.as_deref(),
        registro.zona_dolor.as_deref(),
    );
    let nota = nota_con_fallback(&state, &prompt, || {
        catalogo::nota_ia(
            registro.tipo_examen.as_deref(),
            registro.zona_dolor.as_deref(),
            registro.formulario_rm.as_ref(),
        )
    })
    .await;

    let derivado = CaseRecord::parse(
        Space::Ia,
        json!({
            "examenesIA": &nota.examenes,
            "informe": &nota.informe,
        }),
    )?;
    state.store.update(Space::Ia, &id, derivado).await?;

    Ok(Json(json!({
        "ok": true,
        "examenes": &nota.examenes,
        "informe": &nota.informe,
    })))
}
