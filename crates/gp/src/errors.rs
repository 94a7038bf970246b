use thiserror::Error;

/// A result type for Gaussian process regression errors
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when modeling with Gaussian processes
#[derive(Error, Debug)]
pub enum GpError {
    /// When likelihood computation fails
    #[error("Likelihood computation error: {0}")]
    LikelihoodComputationError(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a value is invalid
    #[error("Value error: {0}")]
    InvalidValueError(String),
    /// When a quantity is requested in a state where it is not available
    #[error("Not available: {0}")]
    NotAvailableError(String),
    /// When error during linfa operations
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
