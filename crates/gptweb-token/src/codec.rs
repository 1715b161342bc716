//! Token codec: PASETO `v2.local` encryption of string payloads.
//!
//! Sealing and opening go through `rusty_paseto`'s v2 local primitives
//! (XChaCha20-Poly1305 with a BLAKE2b-derived nonce and pre-authentication
//! encoding of header and nonce). Tokens carry no footer.

use rand::RngCore;
use rand::rngs::OsRng;
use rusty_paseto::core::{
    Footer, Key, Local, Paseto, PasetoError, PasetoNonce, PasetoSymmetricKey, Payload, V2,
};
use subtle::ConstantTimeEq;

use crate::error::TokenError;

/// The only accepted symmetric key size, in bytes.
pub const KEY_SIZE: usize = 32;

/// Version/purpose prefix on every token.
pub const TOKEN_HEADER: &str = "v2.local.";

/// Shortest base64url body that can hold a 24-byte nonce and a 16-byte tag.
const MIN_BODY_LEN: usize = 54;

/// Seals and opens tokens under one symmetric key.
pub struct TokenCodec {
    key: PasetoSymmetricKey<V2, Local>,
}

impl TokenCodec {
    /// Build a codec from raw key bytes.
    ///
    /// Returns `InvalidKeyLength` unless the key is exactly [`KEY_SIZE`]
    /// bytes.
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key_bytes: [u8; KEY_SIZE] =
            key.try_into().map_err(|_| TokenError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: key.len(),
            })?;

        Ok(Self {
            key: PasetoSymmetricKey::from(Key::<KEY_SIZE>::from(key_bytes)),
        })
    }

    /// Encrypt `plaintext` under a fresh random nonce key and render the token.
    pub fn seal(&self, plaintext: &str) -> Result<String, TokenError> {
        let nonce_key = Key::<KEY_SIZE>::try_new_random()
            .map_err(|e| TokenError::Randomness(e.to_string()))?;
        let nonce = PasetoNonce::<V2, Local>::from(&nonce_key);

        Paseto::<V2, Local>::builder()
            .set_payload(Payload::from(plaintext))
            .try_encrypt(&self.key, &nonce)
            .map_err(|e| TokenError::EncryptionFailed(e.to_string()))
    }

    /// Decode and authenticate a token, returning the plaintext.
    pub fn open(&self, token: &str) -> Result<String, TokenError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or_else(|| TokenError::Malformed("unexpected token header".to_string()))?;

        if body.contains('.') {
            return Err(TokenError::Malformed("unexpected token footer".to_string()));
        }
        if body.len() < MIN_BODY_LEN {
            return Err(TokenError::Malformed(format!(
                "token body too short: {} characters",
                body.len()
            )));
        }

        Paseto::<V2, Local>::try_decrypt(token, &self.key, None::<Footer<'_>>)
            .map_err(classify_paseto_error)
    }
}

/// Cipher failures mean the token was forged or sealed under another key;
/// everything else is a structural defect.
fn classify_paseto_error(err: PasetoError) -> TokenError {
    match err {
        PasetoError::ChaChaCipherError
        | PasetoError::Cryption
        | PasetoError::PasetoCipherError(_)
        | PasetoError::Cipher { .. }
        | PasetoError::InvalidLength { .. } => TokenError::Authentication,
        other => TokenError::Malformed(other.to_string()),
    }
}

/// Fill `N` bytes from the OS randomness source.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N], TokenError> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TokenError::Randomness(e.to_string()))?;
    Ok(bytes)
}

/// Compare two strings without an early exit on the first differing byte.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
