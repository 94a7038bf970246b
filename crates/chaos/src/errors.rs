use thiserror::Error;

/// A result type for polynomial chaos errors
pub type Result<T> = std::result::Result<T, ChaosError>;

/// An error when building a polynomial chaos expansion
#[derive(Error, Debug)]
pub enum ChaosError {
    /// When an argument has an invalid value or an inconsistent dimension
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),
    /// When a request goes beyond the configured domain
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// When a numerical computation degenerates
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// When a quantity is requested in a state where it is not defined
    #[error("Not available: {0}")]
    NotAvailableError(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When error during linfa operations
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
