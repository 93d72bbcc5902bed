//! Bearer token acquisition.
//!
//! A run either reuses a pre-issued token or exchanges a username/password
//! pair for one. Both paths sit behind [`TokenProvider`], chosen from the
//! configured [`Credentials`].

use std::fmt;

use crate::client::RegistryClient;
use crate::config::Credentials;
use crate::error::Result;

/// Bearer token presented on every authenticated call
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Clone)]
pub enum TokenProvider {
    Static(BearerToken),
    Login { username: String, password: String },
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(token) => f.debug_tuple("Static").field(token).finish(),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl TokenProvider {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::Token(token) => Self::Static(BearerToken::new(token.clone())),
            Credentials::Login { username, password } => Self::Login {
                username: username.clone(),
                password: password.clone(),
            },
        }
    }

    /// Obtain the token for this run. The static variant makes no request.
    pub async fn token(&self, client: &RegistryClient) -> Result<BearerToken> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Login { username, password } => {
                tracing::info!("Logging in to registry as {}", username);
                client.login(username, password).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let token = BearerToken::new("abc");
        assert_eq!(token.header_value(), "Bearer abc");
        assert_eq!(format!("{:?}", token), "BearerToken(<redacted>)");
    }

    #[test]
    fn test_from_credentials() {
        let provider = TokenProvider::from_credentials(&Credentials::Token("abc".to_string()));
        assert!(matches!(provider, TokenProvider::Static(ref t) if t.header_value() == "Bearer abc"));

        let provider = TokenProvider::from_credentials(&Credentials::Login {
            username: "bot".to_string(),
            password: "pw".to_string(),
        });
        assert!(matches!(provider, TokenProvider::Login { ref username, .. } if username == "bot"));
    }
}
