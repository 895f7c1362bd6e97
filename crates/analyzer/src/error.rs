//! Error taxonomy for cost analysis operations

use thiserror::Error;

/// Errors surfaced by the cost analyzer and the action boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    /// The service name has no entry in the pricing catalog
    #[error("Pricing data not available for service: {service}")]
    UnknownService { service: String },

    /// Malformed or out-of-domain input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl CostError {
    pub fn unknown_service(service: impl Into<String>) -> Self {
        Self::UnknownService {
            service: service.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            CostError::UnknownService { .. } => "unknown_service",
            CostError::InvalidInput { .. } => "invalid_input",
        }
    }
}

/// Result alias for cost analysis operations
pub type CostResult<T> = Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_service_names_the_service() {
        let err = CostError::unknown_service("Amazon Foo");
        assert_eq!(
            err.to_string(),
            "Pricing data not available for service: Amazon Foo"
        );
        assert_eq!(err.kind(), "unknown_service");
    }

    #[test]
    fn test_invalid_input_message() {
        let err = CostError::invalid_input("base_cost must be non-negative");
        assert_eq!(err.to_string(), "Invalid input: base_cost must be non-negative");
        assert_eq!(err.kind(), "invalid_input");
    }
}
