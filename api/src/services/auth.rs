use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{AuthConfig, AuthKey};
use crate::extractors::Principal;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid verification key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty 'sub' claim")]
    EmptySubject,
}

/// Claims read after `jsonwebtoken` has checked signature, `exp`, `iss` and `aud`.
#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(default)]
    jti: Option<String>,
}

/// Bearer token verifier built once from [`AuthConfig`].
#[derive(Clone)]
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtAuthenticator")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticator {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let (decoding_key, algorithm) = match &config.key {
            AuthKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            AuthKey::Ed25519PublicKeyPem(pem) => (
                DecodingKey::from_ed_pem(pem.as_bytes()).map_err(AuthError::InvalidKey)?,
                Algorithm::EdDSA,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = config.leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::EmptySubject);
        }

        Ok(Principal {
            subject: claims.sub,
            scopes: claims
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            roles: claims.roles.unwrap_or_default(),
            jti: claims.jti,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};

    use super::*;

    pub(crate) const SECRET: &str = "test-secret-with-enough-length-0123456789";

    pub(crate) fn auth_config() -> AuthConfig {
        AuthConfig {
            issuer: "https://issuer.test".into(),
            audience: "halifax-test".into(),
            key: AuthKey::Secret(SECRET.into()),
            leeway_seconds: 0,
        }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    pub(crate) fn sign(claims: Value) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) fn valid_token(sub: &str) -> String {
        sign(json!({
            "sub": sub,
            "iss": "https://issuer.test",
            "aud": "halifax-test",
            "exp": now() + 600,
            "scope": "orders:read orders:write",
            "roles": ["admin"],
            "jti": "abc",
        }))
    }

    #[test]
    fn accepts_valid_token() {
        let auth = JwtAuthenticator::new(&auth_config()).unwrap();
        let principal = auth.verify(&valid_token("user-1")).unwrap();

        assert_eq!(principal.subject, "user-1");
        assert!(principal.has_scope("orders:write"));
        assert_eq!(principal.roles, vec!["admin"]);
        assert!(principal.has_role("admin"));
        assert!(!principal.has_role("orders:write"));
        assert!(!principal.has_scope("admin"));
        assert_eq!(principal.jti.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_wrong_audience_and_expired_tokens() {
        let auth = JwtAuthenticator::new(&auth_config()).unwrap();

        let wrong_aud = sign(json!({
            "sub": "user-1",
            "iss": "https://issuer.test",
            "aud": "someone-else",
            "exp": now() + 600,
        }));
        assert!(matches!(auth.verify(&wrong_aud), Err(AuthError::Jwt(_))));

        let expired = sign(json!({
            "sub": "user-1",
            "iss": "https://issuer.test",
            "aud": "halifax-test",
            "exp": now() - 600,
        }));
        assert!(matches!(auth.verify(&expired), Err(AuthError::Jwt(_))));
    }

    #[test]
    fn rejects_blank_subject_and_garbage() {
        let auth = JwtAuthenticator::new(&auth_config()).unwrap();

        let blank = sign(json!({
            "sub": " ",
            "iss": "https://issuer.test",
            "aud": "halifax-test",
            "exp": now() + 600,
        }));
        assert!(matches!(auth.verify(&blank), Err(AuthError::EmptySubject)));
        assert!(auth.verify("not-a-jwt").is_err());
    }

    #[test]
    fn debug_hides_key_material() {
        let auth = JwtAuthenticator::new(&auth_config()).unwrap();
        assert!(!format!("{auth:?}").contains(SECRET));
    }
}
