use std::{
    borrow::Cow,
    fmt, io,
    path::{Path, PathBuf},
};

use config::builder::{ConfigBuilder, DefaultState};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory containing configuration files relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Supported extensions for base and environment configuration files, in lookup order.
const CONFIG_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "APP";

const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested keys in environment variables.
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy)]
enum ConfigFileKind {
    Base,
    Environment(Environment),
}

impl ConfigFileKind {
    fn stem(&self) -> Cow<'static, str> {
        match self {
            ConfigFileKind::Base => Cow::Borrowed("base"),
            ConfigFileKind::Environment(env) => Cow::Borrowed(env.as_str()),
        }
    }
}

impl fmt::Display for ConfigFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFileKind::Base => f.write_str("base configuration"),
            ConfigFileKind::Environment(env) => write!(f, "{env} environment configuration"),
        }
    }
}

/// Errors that can occur while loading configuration files and overrides.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("configuration directory `{0}` does not exist")]
    MissingConfigurationDirectory(PathBuf),

    #[error("could not locate {kind_description} in `{directory}`; attempted: {attempted}")]
    ConfigurationFileMissing {
        kind_description: String,
        directory: PathBuf,
        attempted: String,
    },

    #[error("failed to load {kind_description} from `{path}`: {source}")]
    ConfigurationFileLoad {
        kind_description: String,
        path: PathBuf,
        source: config::ConfigError,
    },

    #[error("failed to deserialize configuration: {0}")]
    Deserialization(#[source] config::ConfigError),

    #[error("failed to determine runtime environment: {0}")]
    Environment(#[from] io::Error),

    #[error("failed to build configuration: {0}")]
    Builder(#[source] config::ConfigError),
}

/// Loads layered configuration for the current process.
///
/// Reads `configuration/base.(yaml|yml|json)` and `configuration/{environment}.(yaml|yml|json)`
/// from the working directory, then applies `APP_`-prefixed environment variables. Nested keys
/// use double underscores, for example `APP_INTERVAL__PERIOD_MS=250`.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    let base_path = std::env::current_dir().map_err(LoadConfigError::CurrentDir)?;
    let environment = Environment::load()?;

    load_config_from(&base_path.join(CONFIGURATION_DIR), environment, None)
}

/// Loads layered configuration from `directory` for the given `environment`.
///
/// When `env_vars` is `Some`, overrides are read from that map instead of the process
/// environment. Keys must still carry the `APP_` prefix.
pub fn load_config_from<T>(
    directory: &Path,
    environment: Environment,
    env_vars: Option<config::Map<String, String>>,
) -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    if !directory.is_dir() {
        return Err(LoadConfigError::MissingConfigurationDirectory(
            directory.to_path_buf(),
        ));
    }

    let base_file = find_configuration_file(directory, ConfigFileKind::Base)?;
    let environment_file =
        find_configuration_file(directory, ConfigFileKind::Environment(environment))?;

    let environment_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .source(env_vars);

    let builder = config::Config::builder().add_source(config::File::from(base_file.clone()));
    validate_configuration_source(&builder, ConfigFileKind::Base, &base_file)?;

    let builder = builder.add_source(config::File::from(environment_file.clone()));
    validate_configuration_source(
        &builder,
        ConfigFileKind::Environment(environment),
        &environment_file,
    )?;

    let settings = builder
        .add_source(environment_source)
        .build()
        .map_err(LoadConfigError::Builder)?;

    settings
        .try_deserialize::<T>()
        .map_err(LoadConfigError::Deserialization)
}

fn find_configuration_file(
    directory: &Path,
    kind: ConfigFileKind,
) -> Result<PathBuf, LoadConfigError> {
    let stem = kind.stem();

    let attempted_paths: Vec<PathBuf> = CONFIG_FILE_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{stem}.{extension}")))
        .collect();

    if let Some(path) = attempted_paths.iter().find(|path| path.is_file()) {
        return Ok(path.clone());
    }

    let attempted = attempted_paths
        .iter()
        .map(|path| format!("`{}`", path.display()))
        .collect::<Vec<_>>()
        .join(", ");

    Err(LoadConfigError::ConfigurationFileMissing {
        kind_description: kind.to_string(),
        directory: directory.to_path_buf(),
        attempted,
    })
}

/// Builds the configuration accumulated so far to attribute parse errors to the right file.
fn validate_configuration_source(
    builder: &ConfigBuilder<DefaultState>,
    kind: ConfigFileKind,
    path: &Path,
) -> Result<(), LoadConfigError> {
    builder
        .clone()
        .build()
        .map(|_| ())
        .map_err(|source| LoadConfigError::ConfigurationFileLoad {
            kind_description: kind.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Deserialize)]
    struct Nested {
        size: u64,
        enabled: bool,
    }

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("reactor-config-{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn write(&self, name: &str, contents: &str) {
            fs::write(self.0.join(name), contents).unwrap();
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn environment_file_overrides_base() {
        let dir = TempDir::new();
        dir.write("base.yaml", "name: base\nnested:\n  size: 1\n  enabled: false\n");
        dir.write("prod.yaml", "nested:\n  size: 9\n");

        let sample: Sample = load_config_from(&dir.0, Environment::Prod, None).unwrap();

        assert_eq!(sample.name, "base");
        assert_eq!(sample.nested.size, 9);
        assert!(!sample.nested.enabled);
    }

    #[test]
    fn environment_variables_override_files() {
        let dir = TempDir::new();
        dir.write("base.json", r#"{"name": "base", "nested": {"size": 1, "enabled": false}}"#);
        dir.write("dev.yml", "name: dev\n");

        let mut env_vars = config::Map::new();
        env_vars.insert("APP_NESTED__SIZE".to_string(), "42".to_string());
        env_vars.insert("APP_NESTED__ENABLED".to_string(), "true".to_string());

        let sample: Sample = load_config_from(&dir.0, Environment::Dev, Some(env_vars)).unwrap();

        assert_eq!(sample.name, "dev");
        assert_eq!(sample.nested.size, 42);
        assert!(sample.nested.enabled);
    }

    #[test]
    fn missing_environment_file_is_reported() {
        let dir = TempDir::new();
        dir.write("base.yaml", "name: base\n");

        let err = load_config_from::<Sample>(&dir.0, Environment::Prod, None).unwrap_err();

        assert!(matches!(
            err,
            LoadConfigError::ConfigurationFileMissing { .. }
        ));
        assert!(err.to_string().contains("prod environment configuration"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let path = std::env::temp_dir().join(format!("reactor-missing-{}", uuid::Uuid::new_v4()));

        let err = load_config_from::<Sample>(&path, Environment::Dev, None).unwrap_err();

        assert!(matches!(err, LoadConfigError::MissingConfigurationDirectory(_)));
    }
}
