use thiserror::Error;

/// Errors surfaced by configuration loading and the load runner.
#[derive(Debug, Error)]
pub enum FollyError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<figment::Error> for FollyError {
    fn from(error: figment::Error) -> Self {
        FollyError::Config(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, FollyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let error = FollyError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "http://localhost:8080/work".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected status 503 Service Unavailable from http://localhost:8080/work"
        );
    }

    #[test]
    fn test_figment_error_is_boxed() {
        let error: FollyError = figment::Error::from("bad value".to_string()).into();
        assert!(matches!(error, FollyError::Config(_)));
        assert!(error.to_string().starts_with("Configuration error"));
    }
}
