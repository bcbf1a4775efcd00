use thiserror::Error;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Segmentation callback not found: {0}")]
    NotFound(String),

    #[error("Invalid exposing category: {0:?}")]
    InvalidCategory(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SdkError {
    /// Stable machine-readable code handed to host callers.
    pub fn code(&self) -> &'static str {
        match self {
            SdkError::NotFound(_) => "NOT_FOUND",
            SdkError::InvalidCategory(_) => "INVALID_CATEGORY",
            SdkError::Config(_) => "CONFIG",
            SdkError::Internal(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_host_facing_errors() {
        let not_found = SdkError::NotFound("abc".into());
        let invalid = SdkError::InvalidCategory(" ".into());
        assert_eq!(not_found.code(), "NOT_FOUND");
        assert_eq!(invalid.code(), "INVALID_CATEGORY");
        assert_eq!(
            not_found.to_string(),
            "Segmentation callback not found: abc"
        );
    }

    #[test]
    fn test_internal_from_anyhow() {
        let err: SdkError = anyhow::anyhow!("boom").into();
        assert_eq!(err.code(), "INTERNAL");
        assert!(err.to_string().contains("boom"));
    }
}
