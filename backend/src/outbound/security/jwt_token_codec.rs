//! HS256 JSON Web Token implementation of [`TokenCodec`].
//!
//! Only the signature and claim shape are checked here. Expiry is evaluated
//! by the session service against its injected clock, so `exp` validation is
//! disabled in the decoder.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::SessionClaims;
use crate::domain::ports::{TokenCodec, TokenCodecError};

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, TokenCodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| TokenCodecError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, TokenCodecError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenCodecError::invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TokenId, TokenKind, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn claims() -> SessionClaims {
        let sid = TokenId::random();
        SessionClaims {
            sub: UserId::random(),
            jti: sid,
            sid,
            typ: TokenKind::Refresh,
            iat: 1_700_000_000,
            exp: 1_700_000_300,
        }
    }

    #[rstest]
    fn signed_tokens_decode_to_the_same_claims(claims: SessionClaims) {
        let codec = JwtTokenCodec::new(b"test-secret");
        let token = codec.encode(&claims).expect("encode");
        assert_eq!(codec.decode(&token).expect("decode"), claims);
    }

    #[rstest]
    fn expired_tokens_still_decode(claims: SessionClaims) {
        let codec = JwtTokenCodec::new(b"test-secret");
        let stale = SessionClaims { exp: 1, ..claims };
        let token = codec.encode(&stale).expect("encode");
        assert_eq!(codec.decode(&token).expect("decode").exp, 1);
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(claims: SessionClaims) {
        let token = JwtTokenCodec::new(b"other-secret")
            .encode(&claims)
            .expect("encode");
        let err = JwtTokenCodec::new(b"test-secret")
            .decode(&token)
            .expect_err("foreign signature");
        assert!(matches!(err, TokenCodecError::Invalid { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        let err = JwtTokenCodec::new(b"test-secret")
            .decode(token)
            .expect_err("malformed");
        assert!(matches!(err, TokenCodecError::Invalid { .. }));
    }
}
