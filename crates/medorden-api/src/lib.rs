use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use medorden_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// JSON error body returned for every failed request:
/// `{ "ok": false, "error": <code>, "detalle": <message> }`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: &'static str,
    pub detalle: String,
}

/// High-level API errors mapped to HTTP responses.
///
/// PaymentRequired is deliberately distinct from NotFound and BadRequest so
/// callers can tell "pay first" apart from "wrong data".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Payment required: {0}")]
    PaymentRequired(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream failure: {0}")]
    BadGateway(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn payment_required(msg: impl Into<String>) -> Self {
        Self::PaymentRequired(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::BadGateway(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "solicitud-invalida",
            ApiError::PaymentRequired(_) => "pago-requerido",
            ApiError::NotFound(_) => "no-encontrado",
            ApiError::BadGateway(_) => "servicio-externo",
            ApiError::Internal(_) => "error-interno",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let detalle = match self {
            ApiError::BadRequest(m)
            | ApiError::PaymentRequired(m)
            | ApiError::NotFound(m)
            | ApiError::BadGateway(m)
            | ApiError::Internal(m) => m.clone(),
        };
        ErrorBody {
            ok: false,
            error: self.error_code(),
            detalle,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(m) => ApiError::BadRequest(m),
            CoreError::JsonError(e) => ApiError::BadRequest(e.to_string()),
            CoreError::NotFound { espacio, id } => {
                ApiError::NotFound(format!("no record for {espacio}/{id}"))
            }
            CoreError::PaymentRequired(m) => ApiError::PaymentRequired(m),
            CoreError::Upstream { servicio, detalle } => {
                ApiError::BadGateway(format!("{servicio}: {detalle}"))
            }
            CoreError::Configuration(m) => ApiError::Internal(m),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self.to_body()) {
            Ok(b) => b,
            Err(_) => br#"{"ok":false,"error":"error-interno","detalle":"serialization failure"}"#
                .to_vec(),
        };

        axum::http::Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}
