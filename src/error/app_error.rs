use thiserror::Error;

/// A single field-level validation failure, surfaced inline by forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application-wide error type that represents all possible errors in the system.
///
/// Read-path (query) errors are stored on the affected cache entry and
/// rendered inline by the view; write-path (mutation) errors are caught and
/// logged at the service boundary and never propagate to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Structured error body returned by the REST API (`{ error, message }`)
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    /// Transport-level HTTP failure (connection, timeout, decode)
    #[error("HTTP request failed")]
    Http {
        #[source]
        source: reqwest::Error,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple field-level validation failures from a form submission
    #[error("Validation failed for {} field(s)", errors.len())]
    ValidationErrors { errors: Vec<FieldError> },

    /// Unauthorized access error with authentication message
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Forbidden access error with authorization message
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Cached data could not be interpreted as the expected shape
    #[error("Serialization error")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// The message a view should render inline for a read-path failure.
    ///
    /// API failures render the server-provided `message` field; everything
    /// else falls back to a generic string.
    pub fn display_message(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            AppError::Validation { reason, .. } => reason.clone(),
            AppError::Unauthorized { message, .. } | AppError::Forbidden { message, .. } => {
                message.clone()
            }
            _ => "Something went wrong".to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Http { source: error }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {field}")),
                })
            })
            .collect();
        AppError::ValidationErrors { errors }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_message() {
        let err = AppError::Api {
            status: 404,
            error: "Not Found".to_string(),
            message: "That post no longer exists".to_string(),
        };
        assert_eq!(err.display_message(), "That post no longer exists");
    }

    #[test]
    fn test_internal_error_falls_back_to_generic_message() {
        let err = AppError::Internal {
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.display_message(), "Something went wrong");
    }

    #[test]
    fn test_validation_errors_from_validator() {
        use validator::Validate;

        #[derive(Validate)]
        struct Form {
            #[validate(length(min = 8, message = "Must be 8 characters or more"))]
            password: String,
        }

        let form = Form {
            password: "short".to_string(),
        };
        let err: AppError = form.validate().unwrap_err().into();
        match err {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "password");
                assert!(errors[0].message.contains("8 characters"));
            }
            other => panic!("Expected ValidationErrors, got {other:?}"),
        }
    }
}
