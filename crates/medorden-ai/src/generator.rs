use crate::parser::parsear_nota;
use async_trait::async_trait;
use medorden_core::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Structured result of a clinical note generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotaClinica {
    pub examenes: Vec<String>,
    pub informe: String,
}

/// Boundary to the clinical note generator.
///
/// Implementations either produce a fully structured note or fail with an
/// Upstream error; call sites fall back to the deterministic catalog and
/// never surface the failure to the patient flow.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    async fn generar(&self, prompt: &str) -> Result<NotaClinica>;
}

/// Chat-completion HTTP client for the note generator.
pub struct HttpNoteGenerator {
    client: reqwest::Client,
    endpoint: String,
    modelo: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: String,
}

impl HttpNoteGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        modelo: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            modelo: modelo.into(),
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl NoteGenerator for HttpNoteGenerator {
    async fn generar(&self, prompt: &str) -> Result<NotaClinica> {
        let payload = ChatRequest {
            model: &self.modelo,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::upstream("ia", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::upstream(
                "ia",
                format!("model endpoint returned HTTP {status}"),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoreError::upstream("ia", format!("malformed response body: {e}")))?;
        let contenido = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| CoreError::upstream("ia", "response carries no choices"))?;

        parsear_nota(contenido)
    }
}
