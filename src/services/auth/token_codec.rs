use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by token minting and verification.
///
/// `Expired` and `Invalid` must stay distinguishable: the gate renders a
/// different 401 message for each.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("token expiry out of range")]
    ExpiryOutOfRange,
}

/// Access token claims: subject (user id) and absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(with = "subject")]
    pub sub: i32,
    pub exp: i64,
}

// `sub` goes out as a string (RFC 7519 StringOrURI) and is read back from
// either a string or a bare integer.
mod subject {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(sub: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(sub)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i32),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(v),
            Raw::Str(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// HS256 token codec holding the process-wide shared secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(secret: &str, ttl: Duration, leeway_seconds: u64) -> Self {
        // Validation::new requires `exp` and pins the accepted algorithm list to HS256.
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Mint a token for `user_id` expiring `ttl` from now.
    pub fn encode(&self, user_id: i32) -> Result<String, TokenError> {
        self.encode_at(user_id, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`.
    pub fn encode_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: user_id,
            exp: exp.timestamp(),
        };

        let mut header = Header::new(Self::ALGORITHM);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(TokenError::Encoding)
    }

    /// Verify signature, algorithm and `exp`, then return the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(TokenError::Expired),
            Err(e) => Err(TokenError::Invalid(e)),
        }
    }
}
