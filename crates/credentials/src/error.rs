use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid credential key: {0}")]
    InvalidKey(String),
    #[error("credential store failed for `{key}`: {message}")]
    Backend { key: String, message: String },
}
