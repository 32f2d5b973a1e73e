use std::fmt;
use std::io;
use std::str::FromStr;

/// Environment variable selecting the runtime environment.
pub const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

const DEV_ENV_NAME: &str = "dev";

const PROD_ENV_NAME: &str = "prod";

/// Runtime environment of the application.
///
/// Selects the environment-specific configuration file and the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development, human readable logs.
    #[default]
    Dev,
    /// Production, structured logs.
    Prod,
}

impl Environment {
    /// Reads the environment from `APP_ENVIRONMENT`, defaulting to [`Environment::Dev`] when unset.
    pub fn load() -> Result<Environment, io::Error> {
        match std::env::var(APP_ENVIRONMENT_ENV_NAME) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::Dev),
        }
    }

    /// Returns the name used for configuration files and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => DEV_ENV_NAME,
            Environment::Prod => PROD_ENV_NAME,
        }
    }

    /// Returns `true` for [`Environment::Prod`].
    pub fn is_prod(&self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = io::Error;

    /// Parses `dev` or `prod`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            DEV_ENV_NAME => Ok(Environment::Dev),
            PROD_ENV_NAME => Ok(Environment::Prod),
            other => Err(io::Error::other(format!(
                "{other} is not a supported environment. Use either `{DEV_ENV_NAME}` or `{PROD_ENV_NAME}`.",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_environments_case_insensitively() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!(" PROD ".parse::<Environment>().unwrap(), Environment::Prod);
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = "staging".parse::<Environment>().unwrap_err();

        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn display_matches_file_stem() {
        assert_eq!(Environment::Prod.to_string(), "prod");
        assert!(Environment::Prod.is_prod());
        assert!(!Environment::default().is_prod());
    }
}
