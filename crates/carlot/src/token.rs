//! Anti-forgery tokens for form submissions
//!
//! A token binds a server secret to a purpose string and a 12-hour time
//! window. Tokens verify during their own window and the one after it, so a
//! rendered form stays valid for 12 to 24 hours.

use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Purpose the car entry form's tokens are bound to
pub const CAR_ENTRY_PURPOSE: &str = "car_entry";

const TICK_SECONDS: i64 = 12 * 60 * 60;
const TOKEN_BYTES: usize = 16;

/// Mints and verifies purpose-bound tokens
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint a token for the purpose at the current time
    pub fn issue(&self, purpose: &str) -> String {
        self.issue_at(purpose, OffsetDateTime::now_utc())
    }

    /// Verify a token for the purpose at the current time
    pub fn verify(&self, purpose: &str, token: Option<&str>) -> Result<(), TokenError> {
        self.verify_at(purpose, token, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, purpose: &str, now: OffsetDateTime) -> String {
        self.sign(purpose, tick(now))
    }

    pub fn verify_at(
        &self,
        purpose: &str,
        token: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), TokenError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(TokenError::Missing),
        };

        let current = tick(now);
        let matches = [current, current - 1]
            .iter()
            .any(|t| constant_time_eq(self.sign(purpose, *t).as_bytes(), token.as_bytes()));

        if matches {
            Ok(())
        } else {
            Err(TokenError::Mismatch(purpose.to_string()))
        }
    }

    fn sign(&self, purpose: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"|");
        hasher.update(purpose.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_be_bytes());
        let digest = hasher.finalize();
        URL_SAFE_NO_PAD.encode(&digest[..TOKEN_BYTES])
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

fn tick(now: OffsetDateTime) -> i64 {
    now.unix_timestamp().div_euclid(TICK_SECONDS)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
