use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecretError>;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret already exists: {0}")]
    AlreadyExists(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),

    #[error("{context}: {source}")]
    Operation {
        context: String,
        #[source]
        source: Box<SecretError>,
    },
}

impl SecretError {
    pub fn is_not_found(&self) -> bool {
        match self {
            SecretError::NotFound(_) => true,
            SecretError::Operation { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SecretError::AlreadyExists(_))
    }

    pub(crate) fn context(self, context: impl Into<String>) -> Self {
        SecretError::Operation {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
