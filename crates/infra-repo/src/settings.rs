//! Repository settings
//!
//! The settings record (`kind: SettingsFile`, stored as
//! `<branch>/infra-mgr-config.yml`) carries repository-wide options:
//!
//! ```yaml
//! kind: SettingsFile
//! metadata:
//!   name: infra-mgr-config
//! spec:
//!   k8s-propagation: rule
//!   th2BoxConfig:
//!     mqRouter: {...}
//!     grpcRouter: {...}
//!     cradleManager: {...}
//!     logging:
//!       logLevelTh2: DEBUG
//!       logLevelRoot: INFO
//! ```
//!
//! Log levels are validated strictly: an unknown name fails decoding.
//! The propagation mode is kept as written; an unknown value simply
//! enables none of the synchronization predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{Error, Result, codec};
use infra_fs::{DocumentSuffix, NormalizedPath, checksum, io};

/// Stem of the settings file at the branch root.
pub const SETTINGS_FILE_NAME: &str = "infra-mgr-config";

/// Opaque, string-keyed configuration passed through to consumers.
pub type OpaqueMap = serde_json::Map<String, serde_json::Value>;

/// Propagation of repository state into the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// No action is taken.
    #[default]
    Off,
    /// No synchronization; the runtime environment is torn down.
    Deny,
    /// Synchronize on repository changes. Also spelled `true`.
    Sync,
    /// Synchronize on repository or runtime changes.
    Rule,
    /// Anything else; treated as no synchronization.
    Unrecognized(String),
}

impl Propagation {
    pub fn parse(value: &str) -> Self {
        match value {
            "off" => Self::Off,
            "deny" => Self::Deny,
            "sync" | "true" => Self::Sync,
            "rule" => Self::Rule,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Log level accepted in the settings `logging` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Fatal,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Trace,
    All,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
            Self::All => "ALL",
            Self::Off => "OFF",
        }
    }

    /// Absent or empty means the default (`INFO`); anything else must be
    /// an exact level name.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self> {
        match value {
            None | Some("") => Ok(Self::default()),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FATAL" => Ok(Self::Fatal),
            "ERROR" => Ok(Self::Error),
            "WARNING" => Ok(Self::Warning),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            "TRACE" => Ok(Self::Trace),
            "ALL" => Ok(Self::All),
            "OFF" => Ok(Self::Off),
            _ => Err(Error::InvalidLogLevel {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Logging {
    pub log_level_th2: LogLevel,
    pub log_level_root: LogLevel,
}

/// Configuration handed to every box.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mq_router: Option<OpaqueMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_router: Option<OpaqueMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cradle_manager: Option<OpaqueMap>,
    pub logging: Logging,
}

/// Decoded `spec` of the settings record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySettingsSpec {
    #[serde(rename = "k8s-propagation")]
    k8s_propagation: String,
    #[serde(rename = "th2BoxConfig")]
    pub box_config: BoxConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cradle: Option<OpaqueMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_config: Option<OpaqueMap>,
}

impl Default for RepositorySettingsSpec {
    fn default() -> Self {
        Self {
            k8s_propagation: "off".to_string(),
            box_config: BoxConfig::default(),
            cradle: None,
            book_config: None,
        }
    }
}

// Wire shapes; log levels stay strings here and are checked afterwards so
// a bad level surfaces as `Error::InvalidLogLevel`.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawSpec {
    #[serde(rename = "k8s-propagation", default)]
    k8s_propagation: Option<Value>,
    #[serde(rename = "th2BoxConfig", default)]
    box_config: Option<RawBoxConfig>,
    #[serde(default)]
    cradle: Option<OpaqueMap>,
    #[serde(default)]
    book_config: Option<OpaqueMap>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawBoxConfig {
    #[serde(default)]
    mq_router: Option<OpaqueMap>,
    #[serde(default)]
    grpc_router: Option<OpaqueMap>,
    #[serde(default)]
    cradle_manager: Option<OpaqueMap>,
    #[serde(default)]
    logging: Option<RawLogging>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawLogging {
    #[serde(default)]
    log_level_th2: Option<String>,
    #[serde(default)]
    log_level_root: Option<String>,
}

impl RepositorySettingsSpec {
    /// Decode a settings payload.
    ///
    /// A null payload yields the defaults.
    pub fn from_value(spec: Value) -> Result<Self> {
        let raw: RawSpec = if spec.is_null() {
            RawSpec::default()
        } else {
            serde_yaml::from_value(spec).map_err(|e| Error::Decode {
                kind: "SettingsFile".to_string(),
                message: e.to_string(),
            })?
        };

        let raw_box = raw.box_config.unwrap_or_default();
        let raw_logging = raw_box.logging.unwrap_or_default();
        let logging = Logging {
            log_level_th2: LogLevel::parse_or_default(raw_logging.log_level_th2.as_deref())?,
            log_level_root: LogLevel::parse_or_default(raw_logging.log_level_root.as_deref())?,
        };

        Ok(Self {
            k8s_propagation: propagation_string(raw.k8s_propagation),
            box_config: BoxConfig {
                mq_router: raw_box.mq_router,
                grpc_router: raw_box.grpc_router,
                cradle_manager: raw_box.cradle_manager,
                logging,
            },
            cradle: raw.cradle,
            book_config: raw.book_config,
        })
    }

    /// The propagation value exactly as written (default `off`).
    pub fn k8s_propagation(&self) -> &str {
        &self.k8s_propagation
    }

    pub fn propagation(&self) -> Propagation {
        Propagation::parse(&self.k8s_propagation)
    }

    pub fn is_k8s_synchronization_required(&self) -> bool {
        matches!(self.propagation(), Propagation::Sync | Propagation::Rule)
    }

    pub fn is_k8s_governance_required(&self) -> bool {
        self.propagation() == Propagation::Rule
    }

    pub fn is_k8s_propagation_denied(&self) -> bool {
        self.propagation() == Propagation::Deny
    }

    pub fn mq_router(&self) -> Option<&OpaqueMap> {
        self.box_config.mq_router.as_ref()
    }

    pub fn grpc_router(&self) -> Option<&OpaqueMap> {
        self.box_config.grpc_router.as_ref()
    }

    pub fn cradle_manager(&self) -> Option<&OpaqueMap> {
        self.box_config.cradle_manager.as_ref()
    }

    pub fn log_level_th2(&self) -> LogLevel {
        self.box_config.logging.log_level_th2
    }

    pub fn log_level_root(&self) -> LogLevel {
        self.box_config.logging.log_level_root
    }
}

// `k8s-propagation: true` arrives as a YAML bool; null keeps the default.
fn propagation_string(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => "off".to_string(),
        Some(Value::String(s)) => s,
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Read and decode `<root>/<branch>/infra-mgr-config.{yml,yaml}`.
///
/// Reads the file directly, independent of any directory scan. Missing
/// under both suffixes is `Error::SettingsNotFound`.
pub fn load_settings(root: &NormalizedPath, branch: &str) -> Result<RepositorySettingsSpec> {
    let branch_root = root.join(branch);

    for suffix in DocumentSuffix::ALL {
        let path = branch_root.join(&format!("{SETTINGS_FILE_NAME}{suffix}"));
        let content = match io::read_bytes(&path) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };

        let mut record = codec::parse(&content).map_err(|e| Error::Parse {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        record.set_source_hash(checksum::compute_content_checksum(&content));
        tracing::debug!(path = %path, hash = ?record.source_hash(), "loaded settings");

        return RepositorySettingsSpec::from_value(record.spec.unwrap_or(Value::Null));
    }

    Err(Error::SettingsNotFound {
        path: branch_root.to_native(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spec(yaml: &str) -> Result<RepositorySettingsSpec> {
        RepositorySettingsSpec::from_value(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_defaults_for_null_payload() {
        let settings = RepositorySettingsSpec::from_value(Value::Null).unwrap();
        assert_eq!(settings, RepositorySettingsSpec::default());
        assert_eq!(settings.k8s_propagation(), "off");
        assert_eq!(settings.log_level_th2(), LogLevel::Info);
        assert_eq!(settings.log_level_root(), LogLevel::Info);
        assert!(settings.mq_router().is_none());
    }

    #[rstest]
    #[case("off", false, false, false)]
    #[case("deny", false, false, true)]
    #[case("sync", true, false, false)]
    #[case("true", true, false, false)]
    #[case("rule", true, true, false)]
    #[case("bogus", false, false, false)]
    fn test_propagation_predicates(
        #[case] value: &str,
        #[case] sync: bool,
        #[case] governance: bool,
        #[case] denied: bool,
    ) {
        let settings = spec(&format!("k8s-propagation: \"{value}\"")).unwrap();
        assert_eq!(settings.is_k8s_synchronization_required(), sync);
        assert_eq!(settings.is_k8s_governance_required(), governance);
        assert_eq!(settings.is_k8s_propagation_denied(), denied);
    }

    #[test]
    fn test_boolean_true_propagation_is_sync() {
        let settings = spec("k8s-propagation: true").unwrap();
        assert_eq!(settings.k8s_propagation(), "true");
        assert_eq!(settings.propagation(), Propagation::Sync);
    }

    #[test]
    fn test_null_propagation_keeps_default() {
        let settings = spec("k8s-propagation: ~").unwrap();
        assert_eq!(settings.propagation(), Propagation::Off);
    }

    #[test]
    fn test_unrecognized_propagation_is_kept() {
        let settings = spec("k8s-propagation: sometimes").unwrap();
        assert_eq!(
            settings.propagation(),
            Propagation::Unrecognized("sometimes".into())
        );
        assert_eq!(settings.k8s_propagation(), "sometimes");
    }

    #[rstest]
    #[case("", LogLevel::Info)]
    #[case("FATAL", LogLevel::Fatal)]
    #[case("ERROR", LogLevel::Error)]
    #[case("WARNING", LogLevel::Warning)]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("TRACE", LogLevel::Trace)]
    #[case("ALL", LogLevel::All)]
    #[case("OFF", LogLevel::Off)]
    fn test_log_levels(#[case] value: &str, #[case] expected: LogLevel) {
        let yaml = format!(
            "th2BoxConfig:\n  logging:\n    logLevelTh2: \"{value}\"\n    logLevelRoot: \"{value}\"\n"
        );
        let settings = spec(&yaml).unwrap();
        assert_eq!(settings.log_level_th2(), expected);
        assert_eq!(settings.log_level_root(), expected);
    }

    #[rstest]
    #[case("logLevelTh2")]
    #[case("logLevelRoot")]
    fn test_unknown_log_level_is_rejected(#[case] field: &str) {
        let yaml = format!("th2BoxConfig:\n  logging:\n    {field}: VERBOSE\n");
        match spec(&yaml) {
            Err(Error::InvalidLogLevel { value }) => assert_eq!(value, "VERBOSE"),
            other => panic!("expected InvalidLogLevel, got {other:?}"),
        }
    }

    #[test]
    fn test_log_level_is_case_sensitive() {
        assert!("info".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_routing_maps_pass_through() {
        let settings = spec(
            "th2BoxConfig:\n  mqRouter:\n    connectionTimeout: 5000\n  grpcRouter:\n    retries: 3\n  cradleManager:\n    timeout: 10\ncradle:\n  keyspace: th2\nbookConfig:\n  defaultBook: demo\n",
        )
        .unwrap();

        assert_eq!(
            settings.mq_router().unwrap()["connectionTimeout"],
            serde_json::json!(5000)
        );
        assert_eq!(settings.grpc_router().unwrap()["retries"], serde_json::json!(3));
        assert_eq!(settings.cradle_manager().unwrap()["timeout"], serde_json::json!(10));
        assert_eq!(settings.cradle.as_ref().unwrap()["keyspace"], serde_json::json!("th2"));
        assert_eq!(
            settings.book_config.as_ref().unwrap()["defaultBook"],
            serde_json::json!("demo")
        );
    }

    #[test]
    fn test_load_settings_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = NormalizedPath::new(dir.path());
        assert!(matches!(
            load_settings(&root, "master"),
            Err(Error::SettingsNotFound { .. })
        ));
    }
}
