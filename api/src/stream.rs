//! Chat/video is hosted by Stream; this service only mints the user tokens the
//! frontend SDK connects with.

use std::fmt::{self, Debug};

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

use abi::config::StreamConfig;
use abi::errors::Result;

pub trait ChatTokenIssuer: Send + Sync + Debug {
    fn issue(&self, user_id: &str) -> Result<String>;
}

#[derive(Serialize)]
struct StreamClaims<'a> {
    user_id: &'a str,
    iat: i64,
}

pub struct StreamTokenIssuer {
    api_key: String,
    key: EncodingKey,
}

impl StreamTokenIssuer {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            key: EncodingKey::from_secret(config.api_secret.as_bytes()),
        }
    }
}

// keep the secret out of logs
impl Debug for StreamTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamTokenIssuer")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl ChatTokenIssuer for StreamTokenIssuer {
    fn issue(&self, user_id: &str) -> Result<String> {
        let claims = StreamClaims {
            user_id,
            iat: chrono::Utc::now().timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.key)?)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Decoded {
        user_id: String,
    }

    #[test]
    fn token_is_signed_with_api_secret() {
        let issuer = StreamTokenIssuer::new(&StreamConfig {
            api_key: "key".into(),
            api_secret: "secret".into(),
        });
        let token = issuer.issue("user-1").unwrap();

        let mut validation = Validation::default();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Decoded>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.user_id, "user-1");
        assert!(!format!("{issuer:?}").contains("secret"));
    }
}
