use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Caller-facing error taxonomy of the resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// The request matched more than one API, or otherwise cannot be served as given
    #[error("{0}")]
    WrongInput(String),

    #[error("{0}")]
    Internal(String),
}

/// Kind of an [`AppError`], without its message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    WrongInput,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::WrongInput(_) => ErrorKind::WrongInput,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::NotFound(m) | AppError::WrongInput(m) | AppError::Internal(m) => m,
        }
    }

    /// Same kind, new message
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind() {
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::WrongInput => AppError::WrongInput(message),
            ErrorKind::Internal => AppError::Internal(message),
        }
    }
}

/// Failure reported by an [`ApplicationStore`](crate::ApplicationStore).
/// Absence of the application is not an error; stores report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
