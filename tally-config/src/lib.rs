//! Loader for `tally.yaml` with `TALLY_`-prefixed environment overlays.
//!
//! Sources merge in order: YAML files/snippets, then environment variables
//! such as `TALLY_ANALYTICS__COMPANY_ANALYTICS_URL` (double underscore
//! separates nesting levels). `${VAR}` placeholders in any string are then
//! expanded from the process environment; a value that is nothing but an
//! unresolved placeholder is treated as unset.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_analytics::category::{COMPANY_ANNOTATION_TYPE, PERSON_ANNOTATION_TYPE};
use tally_analytics::{AnalyticsEndpoints, AnnotationTypes};
use tally_common::observability::{LogConfig, LogFormat};
use tally_social::Recency;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const CONFIG_FILE_NAME: &str = "tally.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    pub bearer_token: String,
    #[serde(default = "default_twitter_base_url")]
    pub base_url: String,
    /// Posts fetched per analysis request.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub recency: Recency,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TwitterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub company_analytics_url: Option<String>,
    #[serde(default)]
    pub name_analytics_url: Option<String>,
    #[serde(default = "default_company_annotation_type")]
    pub company_annotation_type: String,
    #[serde(default = "default_person_annotation_type")]
    pub person_annotation_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            company_analytics_url: None,
            name_analytics_url: None,
            company_annotation_type: default_company_annotation_type(),
            person_annotation_type: default_person_annotation_type(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalyticsConfig {
    pub fn endpoints(&self) -> AnalyticsEndpoints {
        AnalyticsEndpoints {
            company_analytics_url: self.company_analytics_url.clone(),
            name_analytics_url: self.name_analytics_url.clone(),
        }
    }

    pub fn annotation_types(&self) -> AnnotationTypes {
        AnnotationTypes {
            company: self.company_annotation_type.clone(),
            person: self.person_annotation_type.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_true")]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            emit_stderr: true,
            filter: default_filter(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}
fn default_twitter_base_url() -> String {
    "https://api.twitter.com".into()
}
fn default_max_results() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_company_annotation_type() -> String {
    COMPANY_ANNOTATION_TYPE.into()
}
fn default_person_annotation_type() -> String {
    PERSON_ANNOTATION_TYPE.into()
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "info".into()
}

/// First existing config file among `./tally.yaml` and `<config dir>/tally/tally.yaml`.
pub fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("tally").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Expand `${VAR}` / `$VAR` in every string, re-expanding values that
/// themselves contain placeholders up to the depth cap. A string that is
/// still a single bare placeholder afterwards becomes `null`.
fn expand_placeholders(value: Value) -> Value {
    match value {
        Value::String(s) if s.contains('$') => {
            let expanded = expand_str(s);
            if is_bare_placeholder(&expanded) {
                Value::Null
            } else {
                Value::String(expanded)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(expand_placeholders).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, expand_placeholders(v)))
                .collect(),
        ),
        other => other,
    }
}

fn expand_str(mut current: String) -> String {
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        // Unknown variables are an error to shellexpand; keep the text as written.
        let Ok(next) = shellexpand::env(&current) else {
            break;
        };
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// `${NAME}` with nothing around it.
fn is_bare_placeholder(s: &str) -> bool {
    s.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .is_some_and(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Builder over the `config` crate wiring (YAML + env overrides).
pub struct TallyConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    files: Vec<(PathBuf, bool)>,
    snippets: Vec<String>,
}

impl Default for TallyConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TallyConfigLoader {
    /// Start with no files; `TALLY_` environment overrides are always applied last.
    ///
    /// ```
    /// use tally_config::TallyConfigLoader;
    ///
    /// let config = TallyConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  bearer_token: abc")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.twitter.bearer_token, "abc");
    /// assert_eq!(config.twitter.max_results, 100);
    /// assert_eq!(config.server.bind, "127.0.0.1:3000");
    /// assert!(config.analytics.company_analytics_url.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            files: Vec::new(),
            snippets: Vec::new(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a file that may be absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.snippets.push(yaml.to_string());
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    ///
    /// ```
    /// use tally_config::TallyConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_COMPANY_URL", "http://analytics.local/company"); }
    ///
    /// let config = TallyConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// twitter:
    ///   bearer_token: "token"
    /// analytics:
    ///   company_analytics_url: "${DOC_COMPANY_URL}"
    ///   name_analytics_url: "${DOC_UNSET_NAME_URL}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(
    ///     config.analytics.company_analytics_url.as_deref(),
    ///     Some("http://analytics.local/company")
    /// );
    /// assert!(config.analytics.name_analytics_url.is_none());
    ///
    /// unsafe { std::env::remove_var("DOC_COMPANY_URL"); }
    /// ```
    pub fn load(self) -> Result<TallyConfig, ConfigError> {
        let mut builder = self.builder;
        for (path, required) in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }
        for yaml in &self.snippets {
            builder = builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix("TALLY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;

        let raw: Value = cfg.try_deserialize()?;
        let typed: TallyConfig = serde_json::from_value(expand_placeholders(raw))
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.twitter.bearer_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "twitter.bearer_token must not be empty".into(),
            ));
        }

        Ok(typed)
    }
}
