//! Error types for AgenticTrust.
//!
//! All errors are strongly typed and propagated without panicking.
//! Key material and credential tokens are never included in error messages.

/// Errors produced by the trust engine and its components.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    /// Bad scope, domain or name combination. Caller-correctable.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed, forged, expired or mismatched credential.
    #[error("Credential invalid: {0}")]
    CredentialInvalid(String),

    /// Credential superseded by a reissue. The holder should refresh.
    #[error("Credential stale: generation {presented} superseded by {current}")]
    CredentialStale { presented: u64, current: u64 },

    #[error("Identity revoked: {0}")]
    Revoked(String),

    /// The caller's deadline expired or the call was cancelled. No state
    /// was changed.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Graph search exceeded maximum depth {0}")]
    GraphDepthExceeded(usize),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrustError {
    /// Only timeouts are safe to retry unchanged; every other error is
    /// either caller-correctable or final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Stable machine-readable kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::CredentialInvalid(_) => "credential_invalid",
            Self::CredentialStale { .. } => "credential_stale",
            Self::Revoked(_) => "revoked",
            Self::Timeout(_) => "timeout",
            Self::GraphDepthExceeded(_) => "graph_depth_exceeded",
            Self::InvalidKey(_) => "invalid_key",
            Self::SignatureInvalid => "signature_invalid",
            Self::DerivationFailed(_) => "derivation_failed",
            Self::EncryptionFailed(_) => "encryption_failed",
            Self::DecryptionFailed(_) => "decryption_failed",
            Self::InvalidPassphrase => "invalid_passphrase",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
            Self::InvalidFileFormat(_) => "invalid_file_format",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, TrustError>;
