use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::env_vars;

/// Placeholder shown in place of secrets
pub const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub fitdegree: FitDegreeConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub builders: BuildersConfig,
    #[serde(default)]
    pub instructors: InstructorsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream FitDegree API location, credentials and query markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitDegreeConfig {
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    /// Prefixed to the key with a space; empty sends the bare key
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    pub fitspot_id: String,
    pub company_id: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Value sent as `__fd_client`
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Value sent as `__fd_client_version`
    #[serde(default = "default_client_version")]
    pub client_version: String,
    /// Value sent as `__identifier`
    #[serde(default = "default_identifier")]
    pub identifier: String,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

/// Comma-separated endpoint path lists tried before the built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub instructors: Option<String>,
    #[serde(default)]
    pub classes: Option<String>,
    #[serde(default)]
    pub group_classes: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_auth_scheme() -> String {
    "Bearer".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_client_name() -> String {
    "admin".to_string()
}

fn default_client_version() -> String {
    "3.1.7".to_string()
}

fn default_identifier() -> String {
    "site-build".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory containing the HTML files to splice into
    pub publish_dir: String,
    /// Public origin for canonical links (trailing slashes ignored)
    #[serde(default)]
    pub origin: Option<String>,
    /// Name used in generated page titles and footers
    #[serde(default = "default_studio_name")]
    pub studio_name: String,
    /// Short name shown next to the logo
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
}

fn default_studio_name() -> String {
    "YOUnique Yoga Studio".to_string()
}

fn default_brand_name() -> String {
    "YOUnique Yoga".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildersConfig {
    /// Read instructors from a pack endpoint instead of FitDegree
    #[serde(default)]
    pub instructors_api_url: Option<String>,
    #[serde(default)]
    pub generate_instructor_detail_pages: bool,
    #[serde(default = "default_schedule_card_limit")]
    pub schedule_card_limit: usize,
    #[serde(default = "default_schedule_days_ahead")]
    pub schedule_days_ahead: u32,
    #[serde(default = "default_class_types_limit")]
    pub class_types_limit: usize,
    #[serde(default = "default_training_limit")]
    pub training_limit: usize,
    #[serde(default = "default_training_keyword")]
    pub training_keyword: String,
}

fn default_schedule_card_limit() -> usize {
    6
}

fn default_schedule_days_ahead() -> u32 {
    14
}

fn default_class_types_limit() -> usize {
    12
}

fn default_training_limit() -> usize {
    6
}

fn default_training_keyword() -> String {
    "teacher training".to_string()
}

impl Default for BuildersConfig {
    fn default() -> Self {
        Self {
            instructors_api_url: None,
            generate_instructor_detail_pages: false,
            schedule_card_limit: default_schedule_card_limit(),
            schedule_days_ahead: default_schedule_days_ahead(),
            class_types_limit: default_class_types_limit(),
            training_limit: default_training_limit(),
            training_keyword: default_training_keyword(),
        }
    }
}

/// Instructor visibility denylists (comma-separated, case-insensitive)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstructorsConfig {
    #[serde(default)]
    pub hidden_identity_ids: String,
    #[serde(default)]
    pub hidden_usernames: String,
    #[serde(default)]
    pub hidden_names: String,
}

/// Time-to-live per resource family for the in-memory response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_classes_ttl")]
    pub classes_ttl_secs: u64,
    #[serde(default = "default_instructors_ttl")]
    pub instructors_ttl_secs: u64,
    #[serde(default = "default_services_ttl")]
    pub services_ttl_secs: u64,
}

fn default_classes_ttl() -> u64 {
    60
}

fn default_instructors_ttl() -> u64 {
    600
}

fn default_services_ttl() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            classes_ttl_secs: default_classes_ttl(),
            instructors_ttl_secs: default_instructors_ttl(),
            services_ttl_secs: default_services_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Pack base directories; empty means the conventional locations
    #[serde(default)]
    pub pack_dirs: Vec<String>,
    /// Number of upcoming classes served by `featured-classes`
    #[serde(default = "default_featured_classes_limit")]
    pub featured_classes_limit: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_featured_classes_limit() -> usize {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            pack_dirs: Vec::new(),
            featured_classes_limit: default_featured_classes_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Split a comma-separated setting into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Config {
    /// Project-local config file, read from the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("studio-site.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::load_with_env(config_path, &vars)
    }

    /// Load configuration against an explicit environment snapshot.
    pub fn load_with_env(
        config_path: Option<&str>,
        vars: &HashMap<String, String>,
    ) -> Result<Self> {
        // Start with embedded defaults so the builders work without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // User config in ~/.config/studio-site/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("studio-site").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // STUDIO_<SECTION>__<KEY>, e.g. STUDIO_BUILDERS__TRAINING_LIMIT
        builder = builder.add_source(
            config::Environment::with_prefix("STUDIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone().into_iter().collect())),
        );

        // Flat deployment variables take precedence over everything else
        for (var, value) in env_vars::collect_overrides(|name| vars.get(name).cloned()) {
            builder = builder
                .set_override(var.config_key, value)
                .with_context(|| format!("Invalid value for {}", var.name))?;
        }

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Copy with the API key masked for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.fitdegree.api_key.is_empty() {
            config.fitdegree.api_key = REDACTED.to_string();
        }
        config
    }

    /// Save config to `path` as TOML. The API key is never written; it comes
    /// from `FITDEGREE_API_KEY`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let mut persisted = self.clone();
        persisted.fitdegree.api_key.clear();
        let toml_str =
            toml::to_string_pretty(&persisted).context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// API base URL without trailing slashes
    pub fn api_base(&self) -> &str {
        self.fitdegree.api_base.trim().trim_end_matches('/')
    }

    /// Site origin without trailing slashes, if configured
    pub fn site_origin(&self) -> Option<&str> {
        self.site
            .origin
            .as_deref()
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
    }

    /// Get absolute path to the publish directory
    pub fn publish_path(&self) -> PathBuf {
        resolve_from_cwd(&self.site.publish_dir)
    }

    /// Configured pack base directories, resolved against the working directory
    pub fn pack_dirs(&self) -> Vec<PathBuf> {
        self.server
            .pack_dirs
            .iter()
            .map(|p| resolve_from_cwd(p))
            .collect()
    }
}

fn resolve_from_cwd(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fitdegree: FitDegreeConfig {
                api_base: "https://api.fitdegree.com".to_string(),
                api_key: String::new(),
                auth_header: default_auth_header(),
                auth_scheme: default_auth_scheme(),
                fitspot_id: "782".to_string(),
                company_id: "726".to_string(),
                request_timeout_secs: default_request_timeout(),
                client_name: default_client_name(),
                client_version: default_client_version(),
                identifier: default_identifier(),
                endpoints: EndpointOverrides::default(),
            },
            site: SiteConfig {
                publish_dir: ".".to_string(),
                origin: None,
                studio_name: default_studio_name(),
                brand_name: default_brand_name(),
            },
            builders: BuildersConfig::default(),
            instructors: InstructorsConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn load_with(vars: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load_with_env(None, &env).unwrap()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load_with(&[]);
        assert_eq!(config.api_base(), "https://api.fitdegree.com");
        assert_eq!(config.fitdegree.auth_header, "Authorization");
        assert_eq!(config.fitdegree.auth_scheme, "Bearer");
        assert_eq!(config.builders.schedule_card_limit, 6);
        assert_eq!(config.builders.training_keyword, "teacher training");
        assert_eq!(config.cache.instructors_ttl_secs, 600);
        assert!(config.fitdegree.endpoints.instructors.is_none());
    }

    #[test]
    fn test_deployment_variables_override_defaults() {
        let config = load_with(&[
            ("FITDEGREE_API_BASE", "https://staging.fitdegree.com/"),
            ("FITDEGREE_ENDPOINT_TEAM_MEMBERS", "/a, /b"),
            ("SCHEDULE_CARD_LIMIT", "9"),
            ("GENERATE_INSTRUCTOR_DETAIL_PAGES", "true"),
            ("PUBLISH_DIR", "dist"),
        ]);

        assert_eq!(config.api_base(), "https://staging.fitdegree.com");
        assert_eq!(
            config.fitdegree.endpoints.instructors.as_deref(),
            Some("/a, /b")
        );
        assert_eq!(config.builders.schedule_card_limit, 9);
        assert!(config.builders.generate_instructor_detail_pages);
        assert_eq!(config.site.publish_dir, "dist");
    }

    #[test]
    fn test_studio_prefixed_nested_keys() {
        let config = load_with(&[
            ("STUDIO_BUILDERS__TRAINING_LIMIT", "4"),
            ("STUDIO_FITDEGREE__ENDPOINTS__GROUP_CLASSES", "/classes/group/"),
            ("STUDIO_SERVER__PORT", "8088"),
        ]);
        assert_eq!(config.builders.training_limit, 4);
        assert_eq!(
            config.fitdegree.endpoints.group_classes.as_deref(),
            Some("/classes/group/")
        );
        assert_eq!(config.server.port, 8088);
    }

    #[test]
    fn test_hinted_endpoint_variables_apply() {
        use crate::fitdegree::Resource;

        let config = load_with(&[
            (Resource::Services.override_env_var(), "/svc/"),
            (Resource::Schedule.override_env_var(), "/sched/,/schedule/"),
        ]);
        assert_eq!(config.fitdegree.endpoints.services.as_deref(), Some("/svc/"));
        assert_eq!(
            config.fitdegree.endpoints.schedule.as_deref(),
            Some("/sched/,/schedule/")
        );
    }

    #[test]
    fn test_flat_variables_beat_studio_prefixed() {
        let config = load_with(&[
            ("STUDIO_BUILDERS__SCHEDULE_CARD_LIMIT", "3"),
            ("SCHEDULE_CARD_LIMIT", "9"),
        ]);
        assert_eq!(config.builders.schedule_card_limit, 9);
    }

    #[test]
    fn test_prefixed_fitspot_id_wins() {
        let config = load_with(&[("FITSPOT_ID", "1"), ("FITDEGREE_FITSPOT_ID", "2")]);
        assert_eq!(config.fitdegree.fitspot_id, "2");
    }

    #[test]
    fn test_site_origin_trims_trailing_slash() {
        let mut config = Config::default();
        assert!(config.site_origin().is_none());

        config.site.origin = Some("https://example.com//".to_string());
        assert_eq!(config.site_origin(), Some("https://example.com"));

        config.site.origin = Some("  ".to_string());
        assert!(config.site_origin().is_none());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("studio-site.toml");

        let mut config = Config::default();
        config.builders.training_limit = 2;
        config.server.pack_dirs = vec!["packs".to_string()];
        config.fitdegree.api_key = "secret".to_string();
        config.save(&path).unwrap();

        assert!(!std::fs::read_to_string(&path).unwrap().contains("secret"));

        let path_str = path.to_string_lossy().to_string();
        let loaded = Config::load_with_env(Some(&path_str), &HashMap::new()).unwrap();
        assert_eq!(loaded.builders.training_limit, 2);
        assert_eq!(loaded.server.pack_dirs, vec!["packs".to_string()]);
        assert!(loaded.fitdegree.api_key.is_empty());
        assert_eq!(config.fitdegree.api_key, "secret");
    }

    #[test]
    fn test_redacted_masks_api_key() {
        let config = load_with(&[("FITDEGREE_API_KEY", "secret")]);
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains(REDACTED));

        let config = Config::default();
        assert!(config.redacted().fitdegree.api_key.is_empty());
    }

    #[test]
    fn test_publish_path_absolute_is_kept() {
        let mut config = Config::default();
        config.site.publish_dir = "/srv/site".to_string();
        assert_eq!(config.publish_path(), PathBuf::from("/srv/site"));
    }
}
