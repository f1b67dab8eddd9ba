use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::debug;
use serde::Deserialize;

use crate::token::{Scope, Token, TokenInfo};

use super::{check_scope, AuthProvider, AuthResult, ProviderError};

/// Claims read from the token. Registered claims other than `sub`, `exp` and `iss`
/// are ignored.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String, // Required. Subject of the token (user identifier)
    exp: i64,    // Required. Expiration time (timestamp)

    #[serde(default)]
    scope: Option<ScopeClaim>,

    #[serde(default)]
    realm: Option<String>,
}

/// Either the OAuth2 space separated form or a JSON array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScopeClaim {
    Joined(String),
    List(Vec<String>),
}

impl ScopeClaim {
    fn into_scopes(self) -> Vec<Scope> {
        match self {
            ScopeClaim::Joined(s) => s.split_whitespace().map(Scope::from).collect(),
            ScopeClaim::List(list) => list.into_iter().map(Scope::new).collect(),
        }
    }
}

/// Verifies self-contained JWT access tokens locally.
pub struct JwtProvider {
    key: DecodingKey,
    validation: Validation,
    realm: String,
}

impl JwtProvider {
    /// HS256 tokens signed with a shared secret.
    pub fn with_secret(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// RS256 tokens, verified with a PEM encoded RSA public key.
    pub fn with_rsa_pem(public_key: &[u8]) -> Result<Self, ProviderError> {
        let key = match DecodingKey::from_rsa_pem(public_key) {
            Ok(key) => key,
            Err(e) => {
                return Err(ProviderError::Key(format!(
                    "parse RSA public key for jwt validation failed: {e}"
                )))
            }
        };
        Ok(Self::new(key, Algorithm::RS256))
    }

    fn new(key: DecodingKey, alg: Algorithm) -> Self {
        let mut validation = Validation::new(alg);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key,
            validation,
            realm: String::new(),
        }
    }

    /// Only accept tokens whose `iss` claim equals `issuer`.
    pub fn set_issuer(&mut self, issuer: &str) {
        self.validation.set_issuer(&[issuer]);
        self.validation
            .set_required_spec_claims(&["exp", "sub", "iss"]);
    }

    /// Realm reported for tokens without a `realm` claim.
    pub fn set_realm(&mut self, realm: impl Into<String>) {
        self.realm = realm.into();
    }
}

#[async_trait]
impl AuthProvider for JwtProvider {
    async fn valid(
        &self,
        token: Option<&Token>,
        scope: &Scope,
    ) -> Result<AuthResult, ProviderError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(AuthResult::Empty),
        };

        let claims = match decode::<Claims>(token.as_str(), &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!("Validate jwt token failed: {e}");
                return Ok(AuthResult::Invalid);
            }
        };
        if claims.sub.is_empty() {
            debug!("Validate jwt token failed: empty subject");
            return Ok(AuthResult::Invalid);
        }

        let now = Utc::now().timestamp();
        let expires_in = (claims.exp - now).max(0) as u64;

        let info = TokenInfo {
            access_token: token.as_str().to_string(),
            scope: claims.scope.map(ScopeClaim::into_scopes).unwrap_or_default(),
            token_type: TokenInfo::default_token_type(),
            uid: claims.sub,
            realm: claims.realm.unwrap_or_else(|| self.realm.clone()),
            expires_in: Some(expires_in),
        };

        Ok(check_scope(info, scope))
    }
}
