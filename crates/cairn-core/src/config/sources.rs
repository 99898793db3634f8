use std::fmt;

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the named `CAIRN_*` variable
    EnvVar(String),
    /// Variable unset; the default shown was used
    Default(String),
    /// Loaded by a nested config's own `from_env`
    Nested,
}

impl ConfigSource {
    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::EnvVar(key) => write!(f, "${}", key),
            ConfigSource::Default(value) => write!(f, "default ({})", value),
            ConfigSource::Nested => f.write_str("nested"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ConfigSource::EnvVar("CAIRN_ENV".into()).to_string(), "$CAIRN_ENV");
        assert_eq!(ConfigSource::Default("1".into()).to_string(), "default (1)");
        assert_eq!(ConfigSource::Nested.to_string(), "nested");
    }
}
