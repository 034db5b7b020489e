//! Email delivery of rendered clinical documents.
//!
//! Sends the PDF as an SMTP attachment using the configured relay.

use medorden_core::{CoreError, Result};

/// SMTP sender for clinical documents.
pub struct Mailer {
    smtp_host: String,
    smtp_port: u16,
    usuario: Option<String>,
    clave: Option<String>,
    remitente: String,
}

impl Mailer {
    pub fn new(
        smtp_host: impl Into<String>,
        smtp_port: u16,
        usuario: Option<String>,
        clave: Option<String>,
        remitente: impl Into<String>,
    ) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port,
            usuario,
            clave,
            remitente: remitente.into(),
        }
    }

    /// Send a rendered document to `destino` as a PDF attachment.
    pub async fn enviar_documento(
        &self,
        destino: &str,
        asunto: &str,
        cuerpo: &str,
        nombre_archivo: &str,
        pdf: Vec<u8>,
    ) -> Result<()> {
        use lettre::message::header::ContentType;
        use lettre::message::{Attachment, MultiPart, SinglePart};
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

        let content_type = ContentType::parse("application/pdf")
            .map_err(|e| CoreError::configuration(format!("invalid attachment type: {e}")))?;

        let email = Message::builder()
            .from(
                self.remitente
                    .parse()
                    .map_err(|e| CoreError::configuration(format!("invalid sender address: {e}")))?,
            )
            .to(destino
                .parse()
                .map_err(|e| CoreError::validation(format!("invalid email address: {e}")))?)
            .subject(asunto)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(cuerpo.to_string()))
                    .singlepart(
                        Attachment::new(nombre_archivo.to_string()).body(pdf, content_type),
                    ),
            )
            .map_err(|e| CoreError::upstream("correo", e.to_string()))?;

        let mut mailer_builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_host)
            .map_err(|e| CoreError::configuration(format!("SMTP relay error: {e}")))?;
        mailer_builder = mailer_builder.port(self.smtp_port);
        if let (Some(usuario), Some(clave)) = (&self.usuario, &self.clave) {
            mailer_builder =
                mailer_builder.credentials(Credentials::new(usuario.clone(), clave.clone()));
        }
        let mailer = mailer_builder.build();

        mailer
            .send(email)
            .await
            .map_err(|e| CoreError::upstream("correo", e.to_string()))?;
        tracing::info!(destino, archivo = nombre_archivo, "document emailed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> Mailer {
        Mailer::new(
            "smtp.example.com",
            587,
            Some("user".into()),
            Some("pass".into()),
            "ordenes@medorden.cl",
        )
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_validation_error() {
        let err = mailer()
            .enviar_documento("not-an-address", "Asunto", "Cuerpo", "doc.pdf", vec![1, 2])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalid_sender_is_configuration_error() {
        let mailer = Mailer::new("smtp.example.com", 587, None, None, "bad sender");
        let err = mailer
            .enviar_documento("paciente@example.com", "Asunto", "Cuerpo", "doc.pdf", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
