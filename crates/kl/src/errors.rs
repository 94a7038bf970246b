use thiserror::Error;

/// A result type for Karhunen-Loeve errors
pub type Result<T> = std::result::Result<T, KlError>;

/// An error when decomposing a stochastic process
#[derive(Error, Debug)]
pub enum KlError {
    /// When an argument has an invalid value or an inconsistent dimension
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),
    /// When a request is inconsistent with the decomposition setup
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// When a numerical computation degenerates
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
}
