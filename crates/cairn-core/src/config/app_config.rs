use crate::config::{ConfigError, ConfigSource};
use crate::logging::LoggingConfig;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    /// Check if environment is production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Logging preset matching this environment
    pub fn default_logging(&self) -> LoggingConfig {
        match self {
            Environment::Development => LoggingConfig::development(),
            Environment::Testing => LoggingConfig::test(),
            Environment::Production => LoggingConfig::production(),
        }
    }
}

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
    pub logging: LoggingConfig,
    pub mutation: MutationConfig,
}

impl AppConfig {
    /// Configuration suitable for tests, without touching the environment
    pub fn testing() -> Self {
        Self {
            name: "cairn-test".to_string(),
            environment: Environment::Testing,
            logging: LoggingConfig::test(),
            mutation: MutationConfig::default(),
        }
    }
}

impl AppConfigTrait for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let name = get_env_or_default("CAIRN_APP_NAME", "cairn-app");
        let environment = Environment::from_str(&get_env_or_default("CAIRN_ENV", "development"))?;

        let logging = LoggingConfig::from_env()?;
        let mutation = MutationConfig::from_env()?;

        Ok(AppConfig {
            name,
            environment,
            logging,
            mutation,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation_failed("name", "App name cannot be empty"));
        }

        self.logging.validate()?;
        self.mutation.validate()?;

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("name".to_string(), source_of("CAIRN_APP_NAME", "cairn-app"));
        sources.insert("environment".to_string(), source_of("CAIRN_ENV", "development"));
        sources.insert("logging".to_string(), ConfigSource::Nested);
        sources.insert("mutation".to_string(), ConfigSource::Nested);
        sources
    }
}

/// Settings for the mutation executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationConfig {
    /// Number of batch items validated and written concurrently
    pub concurrency: usize,
    /// Upper bound on items per batch mutation, unlimited when `None`
    pub max_batch_size: Option<usize>,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_batch_size: None,
        }
    }
}

impl MutationConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }
}

impl AppConfigTrait for MutationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let concurrency = get_env_or_default("CAIRN_MUTATION_CONCURRENCY", "1");
        let concurrency = concurrency
            .parse::<usize>()
            .map_err(|_| ConfigError::invalid_value("concurrency", &concurrency, "a positive integer"))?;

        let max_batch_size = match get_env_optional("CAIRN_MAX_BATCH_SIZE") {
            Some(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| ConfigError::invalid_value("max_batch_size", &raw, "a positive integer"))?,
            ),
            None => None,
        };

        let config = MutationConfig {
            concurrency,
            max_batch_size,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::validation_failed("concurrency", "Concurrency cannot be 0"));
        }

        if self.max_batch_size == Some(0) {
            return Err(ConfigError::validation_failed(
                "max_batch_size",
                "Max batch size cannot be 0, leave it unset for no limit",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("concurrency".to_string(), source_of("CAIRN_MUTATION_CONCURRENCY", "1"));
        sources.insert("max_batch_size".to_string(), source_of("CAIRN_MAX_BATCH_SIZE", "unlimited"));
        sources
    }
}

// Helper functions for environment variable handling
pub(crate) fn get_env_optional(key: &str) -> Option<String> {
    env::var(key).ok()
}

pub(crate) fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn source_of(key: &str, default: &str) -> ConfigSource {
    if env::var(key).is_ok() {
        ConfigSource::EnvVar(key.to_string())
    } else {
        ConfigSource::Default(default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use serial_test::serial;

    fn clean_test_env() {
        for key in [
            "CAIRN_APP_NAME",
            "CAIRN_ENV",
            "CAIRN_LOG_LEVEL",
            "CAIRN_LOG_FORMAT",
            "CAIRN_MUTATION_CONCURRENCY",
            "CAIRN_MAX_BATCH_SIZE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_app_config_from_env() {
        clean_test_env();
        env::set_var("CAIRN_APP_NAME", "events-cms");
        env::set_var("CAIRN_ENV", "prod");
        env::set_var("CAIRN_LOG_LEVEL", "warn");
        env::set_var("CAIRN_LOG_FORMAT", "json");
        env::set_var("CAIRN_MUTATION_CONCURRENCY", "4");
        env::set_var("CAIRN_MAX_BATCH_SIZE", "100");

        let config = AppConfig::from_env().unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.name, "events-cms");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.mutation.concurrency, 4);
        assert_eq!(config.mutation.max_batch_size, Some(100));

        let sources = config.config_sources();
        assert!(sources["name"].is_env_var());
        assert_eq!(sources["mutation"], ConfigSource::Nested);

        clean_test_env();
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_is_empty() {
        clean_test_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.name, "cairn-app");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.mutation, MutationConfig::default());
        assert!(config.config_sources()["environment"].is_default());
    }

    #[test]
    #[serial]
    fn test_invalid_concurrency_is_rejected() {
        clean_test_env();
        env::set_var("CAIRN_MUTATION_CONCURRENCY", "lots");
        assert!(matches!(
            MutationConfig::from_env(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "concurrency"
        ));

        env::set_var("CAIRN_MUTATION_CONCURRENCY", "0");
        assert!(matches!(
            MutationConfig::from_env(),
            Err(ConfigError::ValidationFailed { ref field, .. }) if field == "concurrency"
        ));

        clean_test_env();
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("Dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Testing);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_zero_batch_size_is_invalid() {
        let config = MutationConfig::default().with_max_batch_size(0);
        assert!(config.validate().is_err());

        let config = MutationConfig::default().with_concurrency(8).with_max_batch_size(10);
        assert!(config.validate().is_ok());
    }
}
