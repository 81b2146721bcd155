//! Signed session tokens in JWT compact form.
//!
//! Only `HS256` is produced or accepted. A token is
//! `base64url(header) . base64url(claims) . base64url(hmac_sha256(secret, header.claims))`
//! with no padding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chaingo_core::{MarketError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id
    pub user_id: i64,
    /// Wallet address at issuance
    pub wallet: String,
    /// Username at issuance
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    /// Create a codec for `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Serialize and sign `claims`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if the claims cannot be serialized.
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };
        let header = serde_json::to_vec(&header)
            .map_err(|e| MarketError::Internal(format!("token header: {e}")))?;
        let payload = serde_json::to_vec(claims)
            .map_err(|e| MarketError::Internal(format!("token claims: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidToken`] if the token is malformed, names
    /// another algorithm or type, carries a bad signature, has `exp <= iat`,
    /// or expired at or before `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut parts = token.trim().split('.');
        let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("malformed token"));
        };

        let header: Header = decode_json(header_segment)?;
        if header.alg != ALGORITHM {
            return Err(invalid("unsupported algorithm"));
        }
        if header.typ != TOKEN_TYPE {
            return Err(invalid("unsupported token type"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_segment)
            .map_err(|_| invalid("malformed signature"))?;
        let signing_input = format!("{header_segment}.{payload_segment}");
        self.mac(signing_input.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let claims: Claims = decode_json(payload_segment)?;
        if claims.exp <= claims.iat {
            return Err(invalid("expiry precedes issue time"));
        }
        if claims.exp <= now.timestamp() {
            return Err(invalid("token expired"));
        }

        Ok(claims)
    }

    fn mac(&self, message: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| MarketError::Internal(format!("hmac key: {e}")))?;
        mac.update(message);
        Ok(mac)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| invalid("malformed token"))?;
    serde_json::from_slice(&bytes).map_err(|_| invalid("malformed token"))
}

fn invalid(reason: &str) -> MarketError {
    MarketError::InvalidToken(reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"0123456789abcdef0123456789abcdef")
    }

    fn claims(now: DateTime<Utc>) -> Claims {
        Claims {
            user_id: 7,
            wallet: "SP2J6ZY48GV1".into(),
            username: "alice".into(),
            iat: now.timestamp(),
            exp: (now + Duration::days(3)).timestamp(),
        }
    }

    #[test]
    fn test_decode_returns_signed_claims() {
        let now = Utc::now();
        let token = codec().encode(&claims(now)).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec().decode(&token, now).unwrap(), claims(now));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let token = codec().encode(&claims(now)).unwrap();
        let later = now + Duration::days(3);
        assert_eq!(
            codec().decode(&token, later),
            Err(MarketError::InvalidToken("token expired".into()))
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let token = codec().encode(&claims(now)).unwrap();
        let other = TokenCodec::new(b"ffffffffffffffffffffffffffffffff");
        assert!(matches!(
            other.decode(&token, now),
            Err(MarketError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = codec().encode(&claims(now)).unwrap();
        let mut forged = claims(now);
        forged.username = "mallory".into();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(
            codec().decode(&tampered, now),
            Err(MarketError::InvalidToken("signature mismatch".into()))
        );
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let now = Utc::now();
        let token = codec().encode(&claims(now)).unwrap();
        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let parts: Vec<&str> = token.split('.').collect();
        let downgraded = format!("{none_header}.{}.", parts[1]);
        assert_eq!(
            codec().decode(&downgraded, now),
            Err(MarketError::InvalidToken("unsupported algorithm".into()))
        );
    }

    /// Sign arbitrary segments with the test secret.
    fn sign(header: &[u8], claims: &Claims) -> String {
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap())
        );
        let signature = codec().mac(input.as_bytes()).unwrap().finalize().into_bytes();
        format!("{input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }

    #[test]
    fn test_other_token_type_rejected() {
        let now = Utc::now();
        let token = sign(br#"{"alg":"HS256","typ":"JWE"}"#, &claims(now));
        assert_eq!(
            codec().decode(&token, now),
            Err(MarketError::InvalidToken("unsupported token type".into()))
        );

        let untyped = sign(br#"{"alg":"HS256"}"#, &claims(now));
        assert!(matches!(
            codec().decode(&untyped, now),
            Err(MarketError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expiry_before_issue_rejected() {
        let now = Utc::now();
        let mut backwards = claims(now);
        backwards.iat = backwards.exp;
        let token = sign(br#"{"alg":"HS256","typ":"JWT"}"#, &backwards);
        assert_eq!(
            codec().decode(&token, now),
            Err(MarketError::InvalidToken("expiry precedes issue time".into()))
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let now = Utc::now();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(codec().decode(token, now), Err(MarketError::InvalidToken(_))),
                "{token:?} should be rejected"
            );
        }
    }
}
