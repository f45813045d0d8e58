//! Deployment environment used to pick the `{environment}.toml` layer

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Environment variable holding the current environment name
    pub const ENV_VAR: &'static str = "PUSH_NOTIFICATIONS_APP_ENV";

    /// Reads [`Self::ENV_VAR`], falling back to `Development` when unset or unparsable.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// File stem of the environment-specific configuration layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::EnvVarError(format!(
                "{} has invalid value '{}'. Valid values are: development, test, staging, production",
                Self::ENV_VAR,
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("stage".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_environment_invalid_mentions_variable() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains(Environment::ENV_VAR));
    }

    #[test]
    fn test_environment_display_matches_file_stem() {
        for env in [
            Environment::Development,
            Environment::Test,
            Environment::Staging,
            Environment::Production,
        ] {
            assert_eq!(env.to_string(), env.as_str());
        }
    }
}
