//! Anti-forgery values for the OIDC redirect round-trip.

use rand::Rng;

/// Generate a cryptographically random token: 32 bytes, hex-encoded.
///
/// Used for both the `state` and the `nonce` sent at initiation.
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Compare two state values without short-circuiting on the first differing byte.
pub(crate) fn states_match(expected: &str, received: &str) -> bool {
    let expected = expected.as_bytes();
    let received = received.as_bytes();
    if expected.len() != received.len() {
        return false;
    }
    expected
        .iter()
        .zip(received)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
