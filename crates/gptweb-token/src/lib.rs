//! `gptweb` token library
//!
//! Tamper-evident, expiring authentication tokens.
//!
//! ## Format
//!
//! Tokens are PASETO `v2.local` (via `rusty_paseto`): `v2.local.` followed
//! by base64url (no padding) of `nonce (24 bytes) || ciphertext || tag (16 bytes)`,
//! with no footer.
//!
//! - **Encryption**: XChaCha20-Poly1305 under a 32-byte symmetric key
//! - **Nonce**: BLAKE2b of the payload keyed by 32 fresh random bytes
//!
//! The plaintext is a JSON [`TokenPayload`] whose `token_type` separates
//! access tokens from refresh tokens. Any modification of the token string
//! fails authentication or decoding.

pub mod codec;
pub mod error;
pub mod maker;
pub mod payload;

pub use codec::{KEY_SIZE, TOKEN_HEADER, TokenCodec, constant_time_str_eq};
pub use error::TokenError;
pub use maker::{PasetoMaker, TokenMaker};
pub use payload::{TokenKind, TokenPayload};
