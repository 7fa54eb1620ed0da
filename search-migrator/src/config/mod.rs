//! Configuration and dependency initialization for the search migrator.
//!
//! The command line is parsed once per invocation into a [`MigratorConfig`]
//! with every default resolved up front. Each flag also reads an environment
//! variable, so a `.env` file can stand in for flags.

mod dependencies;

pub use dependencies::Dependencies;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use search_migrator_repository::config::DEFAULT_OPENSEARCH_URL;
use search_migrator_repository::{RegistryAuth, RegistryConfig};
use search_migrator_shared::SemanticVersion;

use crate::errors::MigrationError;
use crate::loader::DEFAULT_BATCH_SIZE;

/// Default directory holding the versioned schema artifacts.
pub const DEFAULT_GLIDE_DIR: &str = "build/glide";

/// Default directory holding the generated mapping definitions.
pub const DEFAULT_MAPPINGS_DIR: &str = "build/xddl";

/// Default directory holding the documents to load.
pub const DEFAULT_DATA_DIR: &str = "src/elasticsearch/load";

/// Authentication scheme accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthType {
    /// No authentication.
    None,
    /// Username and password.
    Basic,
    /// Bearer token.
    Bearer,
}

/// Search migrator command line.
#[derive(Debug, Parser)]
#[command(name = "search-migrator")]
#[command(about = "Migrates a search index alias across schema versions", long_about = None)]
pub struct Cli {
    /// OpenSearch URL
    #[arg(long, env = "OPENSEARCH_URL", default_value = DEFAULT_OPENSEARCH_URL)]
    pub opensearch_url: String,

    /// Authentication type
    #[arg(long, env = "OPENSEARCH_AUTH_TYPE", value_enum, default_value_t = AuthType::None)]
    pub auth_type: AuthType,

    /// Username for basic authentication
    #[arg(long, env = "OPENSEARCH_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Token for bearer authentication
    #[arg(long, env = "OPENSEARCH_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Alias that clients query; versioned indices are named `<alias>_<version>`
    #[arg(short, long, env = "INDEX_ALIAS")]
    pub alias: String,

    /// Treat the alias as a write alias
    #[arg(long, env = "INDEX_WRITE_ALIAS")]
    pub write_alias: bool,

    /// Documents per bulk request
    #[arg(short = 's', long, env = "LOAD_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Only deploy (or load into) this version
    #[arg(long, env = "ONLY_VERSION")]
    pub only_version: Option<SemanticVersion>,

    /// Directory of versioned schema artifacts
    #[arg(short, long, env = "GLIDE_DIR", default_value = DEFAULT_GLIDE_DIR)]
    pub glide_dir: PathBuf,

    /// Directory of mapping definitions
    #[arg(short, long, env = "MAPPINGS_DIR", default_value = DEFAULT_MAPPINGS_DIR)]
    pub mappings_dir: PathBuf,

    /// Directory of documents to load
    #[arg(short, long, env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory to write load reports to
    #[arg(short = 'o', long, env = "REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the next index version, setting the alias on first deployment
    Deploy,
    /// Load documents into the index of the current version
    Load,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Registry connection.
    pub registry: RegistryConfig,
    /// Alias name.
    pub alias: String,
    /// Whether the alias is a write alias.
    pub write_alias: bool,
    /// Documents per bulk request.
    pub batch_size: usize,
    /// Explicit target version.
    pub only_version: Option<SemanticVersion>,
    /// Directory of versioned schema artifacts.
    pub glide_dir: PathBuf,
    /// Directory of mapping definitions.
    pub mappings_dir: PathBuf,
    /// Directory of documents to load.
    pub data_dir: PathBuf,
    /// Directory to write load reports to.
    pub report_dir: Option<PathBuf>,
}

impl MigratorConfig {
    /// Create a config for `alias` with every other option at its default.
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            registry: RegistryConfig::default(),
            alias: alias.into(),
            write_alias: false,
            batch_size: DEFAULT_BATCH_SIZE,
            only_version: None,
            glide_dir: PathBuf::from(DEFAULT_GLIDE_DIR),
            mappings_dir: PathBuf::from(DEFAULT_MAPPINGS_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            report_dir: None,
        }
    }

    /// Build and validate the config from parsed command line arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, MigrationError> {
        if cli.alias.trim().is_empty() {
            return Err(MigrationError::config("alias must not be empty"));
        }
        if cli.batch_size == 0 {
            return Err(MigrationError::config("batch size must be greater than zero"));
        }

        let auth = match cli.auth_type {
            AuthType::None => RegistryAuth::None,
            AuthType::Basic => match (&cli.username, &cli.password) {
                (Some(username), Some(password)) => RegistryAuth::Basic {
                    username: username.clone(),
                    password: password.clone(),
                },
                _ => {
                    return Err(MigrationError::config(
                        "basic authentication requires --username and --password",
                    ))
                }
            },
            AuthType::Bearer => match &cli.bearer_token {
                Some(token) => RegistryAuth::Bearer {
                    token: token.clone(),
                },
                None => {
                    return Err(MigrationError::config(
                        "bearer authentication requires --bearer-token",
                    ))
                }
            },
        };

        Ok(Self {
            registry: RegistryConfig::new(cli.opensearch_url.clone(), auth),
            alias: cli.alias.clone(),
            write_alias: cli.write_alias,
            batch_size: cli.batch_size,
            only_version: cli.only_version.clone(),
            glide_dir: cli.glide_dir.clone(),
            mappings_dir: cli.mappings_dir.clone(),
            data_dir: cli.data_dir.clone(),
            report_dir: cli.report_dir.clone(),
        })
    }

    /// Set the artifact, mapping and data directories.
    pub fn with_directories(
        mut self,
        glide_dir: impl Into<PathBuf>,
        mappings_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        self.glide_dir = glide_dir.into();
        self.mappings_dir = mappings_dir.into();
        self.data_dir = data_dir.into();
        self
    }

    /// Set the explicit target version.
    pub fn with_only_version(mut self, version: SemanticVersion) -> Self {
        self.only_version = Some(version);
        self
    }

    /// Set the bulk request size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the report directory.
    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(report_dir.into());
        self
    }

    /// Mark the alias as a write alias.
    pub fn with_write_alias(mut self, write_alias: bool) -> Self {
        self.write_alias = write_alias;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["search-migrator"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--alias", "people", "deploy"]);
        assert_eq!(cli.command, Command::Deploy);

        let config = MigratorConfig::from_cli(&cli).unwrap();
        assert_eq!(config.alias, "people");
        assert_eq!(config.batch_size, 500);
        assert!(!config.write_alias);
        assert_eq!(config.only_version, None);
        assert_eq!(config.glide_dir, PathBuf::from("build/glide"));
        assert_eq!(config.registry.auth, RegistryAuth::None);
    }

    #[test]
    fn test_only_version_is_parsed_eagerly() {
        let cli = parse(&["--alias", "people", "--only-version", "1_2", "load"]);
        let config = MigratorConfig::from_cli(&cli).unwrap();
        assert_eq!(config.only_version, Some(SemanticVersion::parse("1.2").unwrap()));

        let result = Cli::try_parse_from([
            "search-migrator",
            "--alias",
            "people",
            "--only-version",
            "latest",
            "deploy",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_basic_auth_requires_password() {
        let cli = parse(&[
            "--alias",
            "people",
            "--auth-type",
            "basic",
            "--username",
            "admin",
            "deploy",
        ]);
        let result = MigratorConfig::from_cli(&cli);
        assert!(matches!(result, Err(MigrationError::Config(_))));
    }

    #[test]
    fn test_basic_auth() {
        let cli = parse(&[
            "--alias",
            "people",
            "--auth-type",
            "basic",
            "--username",
            "admin",
            "--password",
            "secret",
            "deploy",
        ]);
        let config = MigratorConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.registry.auth,
            RegistryAuth::Basic {
                username: "admin".into(),
                password: "secret".into()
            }
        );
    }

    #[test]
    fn test_bearer_auth_requires_token() {
        let cli = parse(&["--alias", "people", "--auth-type", "bearer", "deploy"]);
        assert!(MigratorConfig::from_cli(&cli).is_err());

        let cli = parse(&[
            "--alias",
            "people",
            "--auth-type",
            "bearer",
            "--bearer-token",
            "abc",
            "deploy",
        ]);
        let config = MigratorConfig::from_cli(&cli).unwrap();
        assert_eq!(config.registry.auth, RegistryAuth::Bearer { token: "abc".into() });
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let cli = parse(&["--alias", "people", "--batch-size", "0", "load"]);
        assert!(matches!(
            MigratorConfig::from_cli(&cli),
            Err(MigrationError::Config(_))
        ));
    }
}
