use thiserror::Error;

/// A failed Source Gateway query. Only the rendered message is kept, since
/// the access-denial check works on message content.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<kube::Error> for GatewayError {
    fn from(err: kube::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    /// The usage source refused access; the exporter cannot do its job.
    #[error("service account has no RBAC policy to read pod metrics: {0}")]
    AccessDenied(String),
}
