//! Proof Key for Code Exchange (RFC 7636) primitives.

use formwire_util::base64::encode_url;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Characters allowed in a code verifier.
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const VERIFIER_LEN: usize = 64;
pub const STATE_LEN: usize = 32;
pub const CHALLENGE_METHOD: &str = "S256";

/// Random string drawn from the unreserved alphabet.
pub fn random_unreserved(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| UNRESERVED[rng.random_range(0..UNRESERVED.len())] as char)
        .collect()
}

pub fn generate_verifier() -> String {
    random_unreserved(VERIFIER_LEN)
}

pub fn generate_state() -> String {
    random_unreserved(STATE_LEN)
}

/// `BASE64URL-NOPAD(SHA256(verifier))`
pub fn challenge_s256(verifier: &str) -> String {
    encode_url(Sha256::digest(verifier.as_bytes()))
}

/// A verifier and its derived challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        Self::from_verifier(generate_verifier())
    }

    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = challenge_s256(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    pub fn method(&self) -> &'static str {
        CHALLENGE_METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn challenge_matches_rfc_vector() {
        let pkce = PkceChallenge::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
        assert_eq!(pkce.method(), "S256");
    }

    #[test]
    fn verifier_uses_unreserved_alphabet() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), VERIFIER_LEN);
        assert!(verifier.bytes().all(|b| UNRESERVED.contains(&b)));
    }

    #[test]
    fn generated_values_differ() {
        assert_ne!(generate_state(), generate_state());
        assert_ne!(PkceChallenge::generate(), PkceChallenge::generate());
    }
}
