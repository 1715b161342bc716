//! Token maker: issues and verifies tokens for a subject.

use chrono::{DateTime, TimeDelta, Utc};

use crate::codec::TokenCodec;
use crate::error::TokenError;
use crate::payload::{TokenKind, TokenPayload};

/// Issues and verifies authentication tokens.
///
/// Implementations hold only immutable key material, so a single instance
/// can be shared across tasks behind an `Arc`.
pub trait TokenMaker: Send + Sync {
    /// Issue a `kind` token for `username` valid for `duration` from now.
    fn create_token_of_kind(
        &self,
        username: &str,
        kind: TokenKind,
        duration: TimeDelta,
    ) -> Result<(String, TokenPayload), TokenError>;

    /// Issue an access token for `username` valid for `duration` from now.
    fn create_token(
        &self,
        username: &str,
        duration: TimeDelta,
    ) -> Result<(String, TokenPayload), TokenError> {
        self.create_token_of_kind(username, TokenKind::Access, duration)
    }

    fn create_refresh_token(
        &self,
        username: &str,
        duration: TimeDelta,
    ) -> Result<(String, TokenPayload), TokenError> {
        self.create_token_of_kind(username, TokenKind::Refresh, duration)
    }

    /// Decode, authenticate and expiry-check a token.
    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError>;
}

/// [`TokenMaker`] issuing PASETO `v2.local` tokens through [`TokenCodec`].
pub struct PasetoMaker {
    codec: TokenCodec,
}

impl PasetoMaker {
    /// Create a maker from the configured symmetric key.
    ///
    /// Fails with `InvalidKeyLength` unless the key is exactly 32 bytes.
    pub fn new(symmetric_key: &[u8]) -> Result<Self, TokenError> {
        Ok(Self {
            codec: TokenCodec::new(symmetric_key)?,
        })
    }

    /// Issue a token as if the clock read `now`.
    pub fn create_token_at(
        &self,
        username: &str,
        kind: TokenKind,
        duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<(String, TokenPayload), TokenError> {
        let payload = TokenPayload::new(username, kind, duration, now)?;
        let plaintext = serde_json::to_string(&payload)
            .map_err(|e| TokenError::SerializationError(e.to_string()))?;
        let token = self.codec.seal(&plaintext)?;
        Ok((token, payload))
    }

    /// Verify a token as if the clock read `now`.
    pub fn verify_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, TokenError> {
        let plaintext = self.codec.open(token)?;
        let payload: TokenPayload = serde_json::from_str(&plaintext)
            .map_err(|e| TokenError::Malformed(format!("undecodable payload: {e}")))?;
        payload.check_valid_at(now)?;
        Ok(payload)
    }
}

impl TokenMaker for PasetoMaker {
    fn create_token_of_kind(
        &self,
        username: &str,
        kind: TokenKind,
        duration: TimeDelta,
    ) -> Result<(String, TokenPayload), TokenError> {
        self.create_token_at(username, kind, duration, Utc::now())
    }

    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::codec::KEY_SIZE;
    use rusty_paseto::core::{Footer, Key, Local, Paseto, PasetoNonce, PasetoSymmetricKey, Payload, V2};

    const TEST_KEY: &[u8; KEY_SIZE] = b"12345678901234567890123456789012";

    fn test_maker() -> PasetoMaker {
        PasetoMaker::new(TEST_KEY).unwrap()
    }

    #[test]
    fn create_and_verify_token() {
        let maker = test_maker();
        let duration = TimeDelta::minutes(1);

        let before = Utc::now();
        let (token, payload) = maker.create_token("alice", duration).unwrap();
        let after = Utc::now();

        assert!(!token.is_empty());
        assert!(payload.issued_at >= before && payload.issued_at <= after);

        let verified = maker.verify_token(&token).unwrap();
        assert_eq!(verified, payload);
        assert_eq!(verified.username, "alice");
        assert_eq!(verified.expired_at - verified.issued_at, duration);
    }

    #[test]
    fn durations_are_preserved_across_the_range() {
        let maker = test_maker();
        for duration in [
            TimeDelta::seconds(1),
            TimeDelta::minutes(15),
            TimeDelta::days(7),
            TimeDelta::days(365),
        ] {
            let (token, _) = maker.create_token("carol", duration).unwrap();
            let payload = maker.verify_token(&token).unwrap();
            assert_eq!(payload.lifetime(), duration);
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let maker = test_maker();
        let (token, payload) = maker.create_token("alice", TimeDelta::seconds(-1)).unwrap();

        assert!(payload.expired_at < payload.issued_at);
        assert!(matches!(maker.verify_token(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_expires_on_a_later_clock() {
        let maker = test_maker();
        let now = Utc::now();
        let (token, _) = maker
            .create_token_at("alice", TokenKind::Access, TimeDelta::minutes(15), now)
            .unwrap();

        assert!(maker.verify_token_at(&token, now + TimeDelta::minutes(15)).is_ok());
        assert!(matches!(
            maker.verify_token_at(&token, now + TimeDelta::minutes(16)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn every_single_bit_flip_is_rejected() {
        let maker = test_maker();
        let (token, _) = maker.create_token("alice", TimeDelta::minutes(1)).unwrap();
        let bytes = token.as_bytes();

        let mut checked = 0usize;
        for index in 0..bytes.len() {
            for bit in 0..8 {
                let mut mutated = bytes.to_vec();
                mutated[index] ^= 1 << bit;
                // A non-UTF-8 string cannot be presented as a token at all.
                let Ok(candidate) = String::from_utf8(mutated) else {
                    continue;
                };
                let err = maker.verify_token(&candidate).expect_err(&format!(
                    "flipping bit {bit} of byte {index} still verified"
                ));
                assert!(err.is_verification_failure(), "unexpected {err:?}");
                checked += 1;
            }
        }
        assert!(checked > bytes.len());
    }

    #[test]
    fn invalid_key_size_is_rejected_at_construction() {
        let err = PasetoMaker::new(b"too-short").err().unwrap();
        assert!(matches!(
            err,
            TokenError::InvalidKeyLength {
                expected: 32,
                actual: 9
            }
        ));
    }

    #[test]
    fn token_from_other_key_fails_authentication() {
        let (token, _) = test_maker()
            .create_token("alice", TimeDelta::minutes(1))
            .unwrap();
        let other = PasetoMaker::new(&[0u8; KEY_SIZE]).unwrap();

        assert!(matches!(
            other.verify_token(&token),
            Err(TokenError::Authentication)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let maker = test_maker();
        assert!(matches!(
            maker.verify_token("not-a-valid-token"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn sealed_non_payload_is_malformed() {
        let codec = TokenCodec::new(TEST_KEY).unwrap();
        let token = codec.seal(r#"{"not":"a payload"}"#).unwrap();

        assert!(matches!(
            test_maker().verify_token(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn tokens_carry_their_kind() {
        let maker = test_maker();
        let (access, _) = maker.create_token("alice", TimeDelta::minutes(1)).unwrap();
        let (refresh, _) = maker
            .create_refresh_token("alice", TimeDelta::days(1))
            .unwrap();

        assert_eq!(maker.verify_token(&access).unwrap().kind, TokenKind::Access);
        assert!(maker.verify_token(&refresh).unwrap().is_refresh());
    }

    #[test]
    fn issued_token_is_plain_paseto_json() {
        let (token, payload) = test_maker()
            .create_refresh_token("alice", TimeDelta::minutes(1))
            .unwrap();

        let key = PasetoSymmetricKey::<V2, Local>::from(Key::<KEY_SIZE>::from(TEST_KEY));
        let json = Paseto::<V2, Local>::try_decrypt(&token, &key, None::<Footer<'_>>).unwrap();
        let claims: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(claims["id"], payload.id.to_string());
        assert_eq!(claims["username"], "alice");
        assert_eq!(claims["token_type"], "refresh");
    }

    #[test]
    fn verifies_tokens_built_with_plain_paseto_api() {
        let now = Utc::now();
        let payload =
            TokenPayload::new("erin", TokenKind::Access, TimeDelta::minutes(5), now).unwrap();
        let json = serde_json::to_string(&payload).unwrap();

        let key = PasetoSymmetricKey::<V2, Local>::from(Key::<KEY_SIZE>::from(TEST_KEY));
        let nonce_key = Key::<KEY_SIZE>::try_new_random().unwrap();
        let token = Paseto::<V2, Local>::builder()
            .set_payload(Payload::from(json.as_str()))
            .try_encrypt(&key, &PasetoNonce::<V2, Local>::from(&nonce_key))
            .unwrap();

        assert_eq!(test_maker().verify_token_at(&token, now).unwrap(), payload);
    }

    #[test]
    fn maker_is_usable_as_trait_object() {
        let maker: std::sync::Arc<dyn TokenMaker> = std::sync::Arc::new(test_maker());
        let (token, payload) = maker.create_token("dave", TimeDelta::minutes(5)).unwrap();
        assert_eq!(maker.verify_token(&token).unwrap().id, payload.id);
    }
}
