//! Error types for the MySQL Cluster Operator

/// Result type for the operator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the operator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Kubernetes API error. A failed secret lookup is only mapped here
    /// when the API server answered with something other than 404;
    /// "not found" is not an error for this operator.
    #[error("Kubernetes API error: {0}")]
    KubeError(String),
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Finalizer error
    #[error("Finalizer error: {0}")]
    FinalizerError(Box<kube::runtime::finalizer::Error<Error>>),
}

impl From<kube::runtime::finalizer::Error<Error>> for Error {
    fn from(err: kube::runtime::finalizer::Error<Error>) -> Self {
        Error::FinalizerError(Box::new(err))
    }
}
