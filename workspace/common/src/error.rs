use thiserror::Error;

/// Errors surfaced by the dashboard. Every variant carries the one-line
/// message that ends up next to the control that triggered the action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// A required selection was missing; no request was made.
    #[error("{0}")]
    Validation(String),

    /// The request failed before any response arrived.
    #[error("{0}")]
    Network(String),

    /// Non-success status, unparseable body or missing required field.
    #[error("{0}")]
    Api(String),

    /// Per-point data that could not be assembled into chart rows.
    #[error("{0}")]
    Rendering(String),
}

impl DashboardError {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::Network(msg) | Self::Api(msg) | Self::Rendering(msg) => msg,
        }
    }

    /// Re-wraps the message with a call-specific prefix, keeping the variant.
    pub fn with_prefix(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", prefix, msg);
        match self {
            Self::Validation(msg) => Self::Validation(wrap(msg)),
            Self::Network(msg) => Self::Network(wrap(msg)),
            Self::Api(msg) => Self::Api(wrap(msg)),
            Self::Rendering(msg) => Self::Rendering(wrap(msg)),
        }
    }
}

/// Type alias for Result with DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_keeps_variant() {
        let err = DashboardError::Api("Error 500: Internal Server Error".to_string())
            .with_prefix("Error al cargar estaciones");

        assert_eq!(
            err,
            DashboardError::Api(
                "Error al cargar estaciones: Error 500: Internal Server Error".to_string()
            )
        );
        assert_eq!(err.to_string(), err.message());
    }
}
