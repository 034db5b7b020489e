use thiserror::Error;

/// Core error types for MedOrden operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Case not found: {espacio}/{id}")]
    NotFound { espacio: String, id: String },

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Upstream service '{servicio}' failed: {detalle}")]
    Upstream { servicio: String, detalle: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new NotFound error
    pub fn not_found(espacio: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            espacio: espacio.into(),
            id: id.into(),
        }
    }

    /// Create a new PaymentRequired error
    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::PaymentRequired(message.into())
    }

    /// Create a new Upstream error
    pub fn upstream(servicio: impl Into<String>, detalle: impl Into<String>) -> Self {
        Self::Upstream {
            servicio: servicio.into(),
            detalle: detalle.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::PaymentRequired(_)
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Configuration(_))
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::PaymentRequired(_) => ErrorCategory::PaymentRequired,
            Self::Upstream { .. } => ErrorCategory::Upstream,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::JsonError(_) => ErrorCategory::Validation,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    PaymentRequired,
    Upstream,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::PaymentRequired => write!(f, "payment_required"),
            Self::Upstream => write!(f, "upstream"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
