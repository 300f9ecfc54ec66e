use thiserror::Error;

/// Message shown when the backend endpoint or key is missing.
pub const NOT_CONFIGURED_MESSAGE: &str = "Backend is not configured";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    Unconfigured,
    /// The backend answered with an error status; `message` is its own text.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

impl ServiceError {
    pub fn is_unconfigured(&self) -> bool { matches!(self, Self::Unconfigured) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_backend_message_verbatim() {
        let e = ServiceError::Remote { status: 409, message: "duplicate key value".into() };
        assert_eq!(e.to_string(), "duplicate key value");
        assert_eq!(ServiceError::Unconfigured.to_string(), NOT_CONFIGURED_MESSAGE);
    }
}
