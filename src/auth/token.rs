// src/auth/token.rs
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// 32 random bytes encode to 43 base64url chars, inside the PKCE
/// verifier range of 43..=128.
pub const TOKEN_BYTES: usize = 32;

/// Random URL-safe token from the OS RNG.
pub fn random_token() -> String {
    token_from(&mut OsRng)
}

pub fn token_from<R: RngCore>(rng: &mut R) -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// SHA-256 of a token. Only this is persisted for sessions.
pub fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// PKCE S256 challenge: BASE64URL(SHA256(verifier)).
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(hash_token(verifier))
}

/// Per-attempt secrets for one sign-in round trip with the identity provider.
#[derive(Debug, Clone)]
pub struct LoginSecrets {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
}

impl LoginSecrets {
    pub fn generate() -> Self {
        Self::from_rng(&mut OsRng)
    }

    pub fn from_rng<R: RngCore>(rng: &mut R) -> Self {
        Self {
            state: token_from(rng),
            nonce: token_from(rng),
            code_verifier: token_from(rng),
        }
    }

    pub fn code_challenge(&self) -> String {
        pkce_challenge(&self.code_verifier)
    }
}
