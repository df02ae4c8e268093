//! Error types for zipscope.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZipError>;

#[derive(Debug, Error)]
pub enum ZipError {
    /// A radius, coordinate, polygon or prefix the caller supplied is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tabular or GeoJSON input whose structure cannot be read at all.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("ZIP not found: {0}")]
    CodeNotFound(String),

    #[error("Prefix not found: {0}")]
    PrefixNotFound(String),

    /// A query, export or highlight produced an empty set.
    #[error("{0}")]
    NoMatches(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZipError {
    /// Whether this error is an alert for the user rather than an internal
    /// failure. User-facing errors never leave state half-updated.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ZipError::InvalidInput(_)
                | ZipError::CodeNotFound(_)
                | ZipError::PrefixNotFound(_)
                | ZipError::NoMatches(_)
        )
    }
}

impl From<zipscope_types::geo::GeoJsonError> for ZipError {
    fn from(err: zipscope_types::geo::GeoJsonError) -> Self {
        ZipError::InvalidFormat(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ZipError {
    fn from(err: toml::de::Error) -> Self {
        ZipError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(ZipError::CodeNotFound("99999".into()).is_user_facing());
        assert!(ZipError::NoMatches("No ZIPs matched.".into()).is_user_facing());
        assert!(!ZipError::Config("bad".into()).is_user_facing());
        assert!(!ZipError::InvalidFormat("no header".into()).is_user_facing());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ZipError::CodeNotFound("12345".into()).to_string(),
            "ZIP not found: 12345"
        );
        assert_eq!(
            ZipError::NoMatches("No ZIPs selected.".into()).to_string(),
            "No ZIPs selected."
        );
    }
}
