use crate::config::types::{Config, DatabaseConfig, SearcherConfig, SpiderConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_database_config(&config.database)?;
    validate_spider_config(&config.spider)?;
    validate_searcher_config(&config.searcher)?;
    Ok(())
}

/// Validates database connection settings
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation(
            "database.host cannot be empty".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "database.port cannot be 0".to_string(),
        ));
    }

    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "database.name cannot be empty".to_string(),
        ));
    }

    if config.user.is_empty() {
        return Err(ConfigError::Validation(
            "database.user cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates spider configuration
fn validate_spider_config(config: &SpiderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid startUrl '{}': {}", config.start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "startUrl must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates searcher configuration
fn validate_searcher_config(config: &SearcherConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::Validation(
            "searcher.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "spindex".to_string(),
                user: "spindex".to_string(),
                password: "secret".to_string(),
            },
            spider: SpiderConfig {
                start_url: "http://example.com/".to_string(),
                max_depth: 2,
                run_spider: true,
                wipe_on_start: false,
                verify_tls: true,
            },
            searcher: SearcherConfig { port: 8080 },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = valid_config();
        config.database.host = String::new();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_database_port_rejected() {
        let mut config = valid_config();
        config.database.port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unparseable_start_url_rejected() {
        let mut config = valid_config();
        config.spider.start_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_start_url_rejected() {
        let mut config = valid_config();
        config.spider.start_url = "ftp://example.com/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_searcher_port_rejected() {
        let mut config = valid_config();
        config.searcher.port = 0;
        assert!(validate(&config).is_err());
    }
}
