//! YAML configuration for the intake ledger.
//!
//! Secrets never live in the file: the API key and access token come from
//! the environment, as do overrides for the spreadsheet id and port.
//!
//! # Example YAML
//!
//! ```yaml
//! source:
//!   spreadsheet_id: 1AbCdEf
//!   sheet: Responses
//!   timeout_secs: 10
//! schema:
//!   version: v2
//! server:
//!   bind: 0.0.0.0
//!   port: 8080
//! ```
//!
//! An inline layout can replace `version`:
//!
//! ```yaml
//! schema:
//!   fields:
//!     - { key: name, column: 0, required: true }
//!     - { key: concerns, column: 5 }
//! ```

use std::io::BufReader;
use std::path::Path;

use intake_ledger_core::{
    Credential, FieldSchema, LATEST_VERSION, RecordSchema, SchemaCatalog, validate_schema,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Environment variable overriding `source.spreadsheet_id`.
pub const ENV_SPREADSHEET_ID: &str = "INTAKE_SPREADSHEET_ID";
/// Environment variable carrying an API key.
pub const ENV_API_KEY: &str = "INTAKE_API_KEY";
/// Environment variable carrying an OAuth access token (preferred over the
/// API key when both are set).
pub const ENV_ACCESS_TOKEN: &str = "INTAKE_ACCESS_TOKEN";
/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "INTAKE_PORT";

/// Default Google Sheets API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Where the table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Spreadsheet identifier (from the document URL).
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Sheet (tab) name; the first sheet when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// API endpoint, overridable for tests and proxies.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Which layout to decode rows with: a catalog version or inline fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Built-in catalog version (`v1`, `v2`, `v3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Inline field table; versioned as `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSchema>>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use intake_ledger_store::IntakeConfig;
///
/// let config = IntakeConfig::from_yaml_str(
///     "source: { spreadsheet_id: abc, sheet: Responses }\nschema: { version: v1 }\n",
/// )
/// .unwrap();
///
/// assert_eq!(config.source.spreadsheet_id, "abc");
/// assert_eq!(config.server.port, 8080);
/// assert_eq!(config.resolve_schema().unwrap().version, "v1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Remote table settings.
    #[serde(default)]
    pub source: SourceConfig,
    /// Row layout.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
}

impl IntakeConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup (the environment in
    /// production, a map in tests). Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if the port override is not
    /// a valid port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(id) = lookup(ENV_SPREADSHEET_ID) {
            info!("{ENV_SPREADSHEET_ID} set, overriding spreadsheet id");
            self.source.spreadsheet_id = id.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_PORT,
                value: port.clone(),
            })?;
            info!("{ENV_PORT} set, listening on port {}", self.server.port);
        }
        Ok(())
    }

    /// Returns the spreadsheet id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] if it is blank.
    pub fn spreadsheet_id(&self) -> Result<&str, ConfigError> {
        let id = self.source.spreadsheet_id.trim();
        if id.is_empty() {
            return Err(ConfigError::MissingSetting("source.spreadsheet_id"));
        }
        Ok(id)
    }

    /// Resolves the configured layout to a validated [`RecordSchema`].
    ///
    /// With an empty `schema` section the newest built-in layout is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousSchema`] when both `version` and
    /// `fields` are set, [`ConfigError::UnknownSchemaVersion`] for a version
    /// missing from the catalog, and [`ConfigError::InvalidSchema`] when the
    /// layout fails validation.
    pub fn resolve_schema(&self) -> Result<RecordSchema, ConfigError> {
        let schema = match (&self.schema.version, &self.schema.fields) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousSchema),
            (None, Some(fields)) => RecordSchema {
                version: "custom".to_string(),
                fields: fields.clone(),
            },
            (version, None) => {
                let version = version.as_deref().unwrap_or(LATEST_VERSION);
                SchemaCatalog::builtin()
                    .get(version)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownSchemaVersion(version.to_string()))?
            }
        };

        let errors = validate_schema(&schema);
        if !errors.is_empty() {
            return Err(ConfigError::InvalidSchema(errors));
        }
        Ok(schema)
    }
}

/// Reads the credential from the process environment.
pub fn credential_from_env() -> Option<Credential> {
    credential_from(|key| std::env::var(key).ok())
}

/// Picks a credential from a lookup: an access token wins over an API key.
pub fn credential_from<F>(lookup: F) -> Option<Credential>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    lookup(ENV_ACCESS_TOKEN)
        .map(Credential::BearerToken)
        .or_else(|| lookup(ENV_API_KEY).map(Credential::ApiKey))
}
