//! Credential issuance: signed tokens, the issuer key, and revocation records.
//!
//! The credential module provides:
//! - The `atok1` token format binding an identity to its current generation
//! - The issuer, which holds the root key and derives one signing key per scope
//! - Issuer-signed revocation records

pub mod issuer;
pub mod revocation;
pub mod token;

pub use issuer::CredentialIssuer;
pub use revocation::{RevocationReason, RevokedRecord};
pub use token::{CredentialClaims, TOKEN_PREFIX};
