//! Bearer-token verification.
//!
//! Token issuance belongs to the external auth collaborator; this module
//! only verifies. Tokens are `cad1.<base64 owner>.<hex hmac>` with an
//! HMAC-SHA256 signature over the owner id, checked in constant time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ValidationError;

const TOKEN_PREFIX: &str = "cad1";

/// Verifies (and, for local surfaces, mints) signed bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Mint a token for an owner id. Used by the CLI and tests; production
    /// tokens come from the auth collaborator holding the same secret.
    pub fn issue(&self, owner: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(owner.as_bytes());
        let sig = self.signature(owner);
        format!("{TOKEN_PREFIX}.{payload}.{sig}")
    }

    /// Verify a token and return the owner id it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, ValidationError> {
        let mut parts = token.splitn(3, '.');
        let (prefix, payload, sig) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(b), Some(s)) => (p, b, s),
            _ => return Err(ValidationError::InvalidToken),
        };
        if prefix != TOKEN_PREFIX {
            return Err(ValidationError::InvalidToken);
        }
        let owner_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ValidationError::InvalidToken)?;
        let owner = String::from_utf8(owner_bytes).map_err(|_| ValidationError::InvalidToken)?;
        if owner.is_empty() {
            return Err(ValidationError::InvalidToken);
        }

        let expected = self.signature(&owner);
        if !constant_time_eq(sig, &expected) {
            return Err(ValidationError::InvalidToken);
        }
        Ok(owner)
    }

    fn signature(&self, owner: &str) -> String {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(owner.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let v = TokenVerifier::new("secret");
        let token = v.issue("user-1");
        assert_eq!(v.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn tampered_payload_fails() {
        let v = TokenVerifier::new("secret");
        let token = v.issue("user-1");
        let forged = token.replace(
            &URL_SAFE_NO_PAD.encode("user-1"),
            &URL_SAFE_NO_PAD.encode("user-2"),
        );
        assert!(v.verify(&forged).is_err());
    }

    #[test]
    fn wrong_secret_fails() {
        let token = TokenVerifier::new("a").issue("user-1");
        assert!(TokenVerifier::new("b").verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let v = TokenVerifier::new("secret");
        assert!(v.verify("").is_err());
        assert!(v.verify("cad1.onlytwo").is_err());
        assert!(v.verify("nope.AAAA.0000").is_err());
    }
}
