use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Server port is not 0
/// - api_key auth actually has a key
/// - Session retention and page size are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key is required when auth.method is \"api_key\"".to_string(),
        ));
    }

    if config.catalog.session_retention_days < 1 {
        return Err(ConfigError::ValidationError(
            "catalog.session_retention_days must be at least 1".to_string(),
        ));
    }

    if config.catalog.default_page_size == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.default_page_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, CatalogConfig, DatabaseConfig, ServerConfig};
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_api_key_without_key_fails() {
        let mut config = valid_config();
        config.auth = AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: None,
        };
        assert!(validate_config(&config).is_err());

        config.auth.api_key = Some(String::new());
        assert!(validate_config(&config).is_err());

        config.auth.api_key = Some("key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_retention_and_page_size() {
        let mut config = valid_config();
        config.catalog.session_retention_days = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.catalog.default_page_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
