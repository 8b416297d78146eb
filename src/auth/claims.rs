//! Unverified JWT payload decoding.
//!
//! The backend signs tokens; the client only needs the payload to read the
//! expiry timestamp and a couple of display flags. Claims read here must
//! never drive authorization decisions - the server enforces those on every
//! request regardless of what the client believes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Token is not a three-part compact JWT")]
    MalformedToken,

    #[error("Token payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Decoded view of an access token payload.
///
/// Only the fields the client actually consumes are modeled; unknown
/// claims are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Backend user id, when the token carries one.
    pub user_id: Option<i64>,
    /// Staff/administrator flag, display use only.
    pub is_staff: Option<bool>,
}

impl Claims {
    /// Whether the token expiry is in the past.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Decode the payload segment of a compact JWT without verifying the
/// signature. Pure function: no stored state is read or written.
pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an unsigned token with the given JSON payload.
    fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn decodes_expiry_and_flags() {
        let token = make_token(r#"{"exp": 4102444800, "user_id": 7, "is_staff": true}"#);
        let claims = decode_claims(&token).expect("valid token should decode");
        assert_eq!(claims.exp, 4102444800);
        assert_eq!(claims.user_id, Some(7));
        assert_eq!(claims.is_staff, Some(true));
        assert!(!claims.is_expired());
    }

    #[test]
    fn ignores_unknown_claims() {
        let token = make_token(r#"{"exp": 4102444800, "jti": "abc", "token_type": "access"}"#);
        let claims = decode_claims(&token).expect("extra claims should be ignored");
        assert_eq!(claims.user_id, None);
        assert_eq!(claims.is_staff, None);
    }

    #[test]
    fn past_expiry_is_expired() {
        let token = make_token(r#"{"exp": 1000000000}"#);
        let claims = decode_claims(&token).expect("valid token should decode");
        assert!(claims.is_expired());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(ClaimsError::MalformedToken)
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(ClaimsError::MalformedToken)
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(ClaimsError::InvalidBase64(_))
        ));

        let garbage = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(matches!(
            decode_claims(&garbage),
            Err(ClaimsError::InvalidJson(_))
        ));
    }

    #[test]
    fn decoding_is_repeatable() {
        let token = make_token(r#"{"exp": 4102444800}"#);
        let first = decode_claims(&token).expect("decode");
        let second = decode_claims(&token).expect("decode again");
        assert_eq!(first.exp, second.exp);
    }
}
