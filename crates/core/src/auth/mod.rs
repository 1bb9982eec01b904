//! Authentication for the admin surface.
//!
//! The public catalog endpoints are open; only the admin CRUD routes sit
//! behind an [`Authenticator`]. Two methods exist: `none` (every request is
//! anonymous) and `api_key`.

mod api_key;
mod none;

pub use api_key::ApiKeyAuthenticator;
pub use none::NoneAuthenticator;

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AuthConfig, AuthMethod};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Credentials extracted from an incoming request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Lowercased header name -> value.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Who a request is acting as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a request and return the identity
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::ApiKey => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "api_key must be set when using api_key auth method".to_string(),
                )
            })?;
            Ok(Box::new(ApiKeyAuthenticator::new(api_key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_authenticator_none() {
        let config = AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_api_key() {
        let config = AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some("secret-key".to_string()),
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "api_key");
    }

    #[test]
    fn test_create_authenticator_api_key_missing_key() {
        let config = AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: None,
        };
        let result = create_authenticator(&config);
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
