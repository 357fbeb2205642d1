//! Secure random number generation.

use rand::RngCore;

/// Generate a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Random 16-byte nonce, hex encoded. Used to make credential payloads and
/// identity ids unique even when minted in the same microsecond.
pub fn nonce_hex() -> String {
    hex::encode(random_bytes::<16>())
}
