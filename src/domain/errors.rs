use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    #[error("No disponible: {0}")]
    Unavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Fallos del servicio generativo. Nunca salen del orquestador de chat:
/// se convierten en una respuesta de disculpa visible en el historial.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("prompt blocked by the service: {0}")]
    Blocked(String),
    #[error("service returned an empty response")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errores de arranque. Son los únicos que detienen el proceso.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required credential {0}; set it in the environment or in .env")]
    MissingCredential(&'static str),
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_messages_carry_detail() {
        let e = GenerationError::Api { status: 429, body: "quota".into() };
        assert_eq!(e.to_string(), "service returned HTTP 429: quota");
        assert_eq!(GenerationError::EmptyResponse.to_string(), "service returned an empty response");
    }

    #[test]
    fn config_error_names_the_variable() {
        let e = ConfigError::MissingCredential("GOOGLE_API_KEY");
        assert!(e.to_string().contains("GOOGLE_API_KEY"));
    }
}
