//! Centralized environment variable registry.
//!
//! The site was originally deployed with flat environment variables
//! (`FITDEGREE_API_KEY`, `PUBLISH_DIR`, ...). Each one is declared here with
//! the config key it overrides, so `Config::load` can apply them on top of
//! the layered `STUDIO_` configuration and `--help`-style listings can be
//! generated from a single source of truth.
//!
//! Nested config paths can also be set directly with the `STUDIO_` prefix
//! and `__` separator (e.g., `STUDIO_BUILDERS__TRAINING_LIMIT`).

/// An environment variable definition
#[derive(Debug, Clone)]
pub struct EnvVar {
    /// Environment variable name (e.g., "FITDEGREE_API_KEY")
    pub name: &'static str,
    /// Dotted config key this variable overrides (e.g., "fitdegree.api_key")
    pub config_key: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Category for grouping in documentation
    pub category: EnvVarCategory,
    /// Default value if not set
    pub default: Option<&'static str>,
    /// Example value for documentation
    pub example: Option<&'static str>,
}

/// Categories for organizing environment variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVarCategory {
    /// Upstream API location and credentials
    FitDegree,
    /// Endpoint path override lists
    Endpoints,
    /// Publish directory and site origin
    Site,
    /// Builder tunables
    Builders,
    /// Instructor visibility denylists
    Instructors,
    /// Host server settings
    Server,
    /// Logging configuration
    Logging,
}

impl EnvVarCategory {
    /// Display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            EnvVarCategory::FitDegree => "FitDegree",
            EnvVarCategory::Endpoints => "Endpoints",
            EnvVarCategory::Site => "Site",
            EnvVarCategory::Builders => "Builders",
            EnvVarCategory::Instructors => "Instructors",
            EnvVarCategory::Server => "Server",
            EnvVarCategory::Logging => "Logging",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [EnvVarCategory] {
        &[
            EnvVarCategory::FitDegree,
            EnvVarCategory::Endpoints,
            EnvVarCategory::Site,
            EnvVarCategory::Builders,
            EnvVarCategory::Instructors,
            EnvVarCategory::Server,
            EnvVarCategory::Logging,
        ]
    }
}

/// Static registry of all recognized deployment environment variables.
///
/// Order matters: when two variables target the same key, the later one wins.
pub static ENV_VARS: &[EnvVar] = &[
    // === FitDegree ===
    EnvVar {
        name: "FITDEGREE_API_BASE",
        config_key: "fitdegree.api_base",
        description: "Base URL of the FitDegree API",
        category: EnvVarCategory::FitDegree,
        default: Some("https://api.fitdegree.com"),
        example: Some("https://api.fitdegree.com"),
    },
    EnvVar {
        name: "FITDEGREE_API_KEY",
        config_key: "fitdegree.api_key",
        description: "API key sent in the auth header (omitted when empty)",
        category: EnvVarCategory::FitDegree,
        default: None,
        example: Some("fd_live_..."),
    },
    EnvVar {
        name: "FITDEGREE_AUTH_HEADER",
        config_key: "fitdegree.auth_header",
        description: "Header name carrying the API key",
        category: EnvVarCategory::FitDegree,
        default: Some("Authorization"),
        example: Some("X-Api-Key"),
    },
    EnvVar {
        name: "FITDEGREE_AUTH_SCHEME",
        config_key: "fitdegree.auth_scheme",
        description: "Scheme prefixed to the API key (empty sends the bare key)",
        category: EnvVarCategory::FitDegree,
        default: Some("Bearer"),
        example: Some(""),
    },
    EnvVar {
        name: "FITSPOT_ID",
        config_key: "fitdegree.fitspot_id",
        description: "Numeric FitDegree fitspot identifier",
        category: EnvVarCategory::FitDegree,
        default: Some("782"),
        example: Some("782"),
    },
    EnvVar {
        name: "FITDEGREE_FITSPOT_ID",
        config_key: "fitdegree.fitspot_id",
        description: "Numeric FitDegree fitspot identifier (takes precedence over FITSPOT_ID)",
        category: EnvVarCategory::FitDegree,
        default: Some("782"),
        example: Some("782"),
    },
    EnvVar {
        name: "COMPANY_ID",
        config_key: "fitdegree.company_id",
        description: "Numeric FitDegree company identifier",
        category: EnvVarCategory::FitDegree,
        default: Some("726"),
        example: Some("726"),
    },
    // === Endpoints ===
    EnvVar {
        name: "FITDEGREE_ENDPOINT_TEAM_MEMBERS",
        config_key: "fitdegree.endpoints.instructors",
        description: "Comma-separated endpoint paths tried for instructors before the defaults",
        category: EnvVarCategory::Endpoints,
        default: None,
        example: Some("/api/v1/team_members,/v1/TEAM_MEMBERS"),
    },
    EnvVar {
        name: "FITDEGREE_ENDPOINT_CLASSES",
        config_key: "fitdegree.endpoints.classes",
        description: "Comma-separated endpoint paths tried for upcoming classes before the defaults",
        category: EnvVarCategory::Endpoints,
        default: None,
        example: Some("/api/v1/UPCOMING_CLASSES"),
    },
    // === Site ===
    EnvVar {
        name: "PUBLISH_DIR",
        config_key: "site.publish_dir",
        description: "Directory holding the HTML files that receive generated markup",
        category: EnvVarCategory::Site,
        default: Some("."),
        example: Some("dist"),
    },
    EnvVar {
        name: "SITE_ORIGIN",
        config_key: "site.origin",
        description: "Public origin used for canonical links on detail pages",
        category: EnvVarCategory::Site,
        default: None,
        example: Some("https://youniqueyoga.netlify.app"),
    },
    // === Builders ===
    EnvVar {
        name: "INSTRUCTORS_API_URL",
        config_key: "builders.instructors_api_url",
        description: "Pack endpoint to read instructors from instead of calling FitDegree directly",
        category: EnvVarCategory::Builders,
        default: None,
        example: Some("https://example.onrender.com/api/gizmos/fitdegree/public/instructors"),
    },
    EnvVar {
        name: "GENERATE_INSTRUCTOR_DETAIL_PAGES",
        config_key: "builders.generate_instructor_detail_pages",
        description: "Write instructors/<slug>/index.html for every visible instructor",
        category: EnvVarCategory::Builders,
        default: Some("false"),
        example: Some("true"),
    },
    EnvVar {
        name: "SCHEDULE_CARD_LIMIT",
        config_key: "builders.schedule_card_limit",
        description: "Maximum number of schedule cards",
        category: EnvVarCategory::Builders,
        default: Some("6"),
        example: Some("9"),
    },
    EnvVar {
        name: "SCHEDULE_DAYS_AHEAD",
        config_key: "builders.schedule_days_ahead",
        description: "Number of days of schedule to request",
        category: EnvVarCategory::Builders,
        default: Some("14"),
        example: Some("7"),
    },
    EnvVar {
        name: "CLASS_TYPES_LIMIT",
        config_key: "builders.class_types_limit",
        description: "Maximum number of class type cards",
        category: EnvVarCategory::Builders,
        default: Some("12"),
        example: Some("8"),
    },
    EnvVar {
        name: "TRAINING_LIMIT",
        config_key: "builders.training_limit",
        description: "Maximum number of teacher training cards",
        category: EnvVarCategory::Builders,
        default: Some("6"),
        example: Some("3"),
    },
    EnvVar {
        name: "TRAINING_KEYWORD",
        config_key: "builders.training_keyword",
        description: "Keyword matched against title, description and group (empty keeps all)",
        category: EnvVarCategory::Builders,
        default: Some("teacher training"),
        example: Some("200 hour"),
    },
    // === Instructors ===
    EnvVar {
        name: "INSTRUCTORS_HIDE_IDS",
        config_key: "instructors.hidden_identity_ids",
        description: "Comma-separated identity ids never shown publicly",
        category: EnvVarCategory::Instructors,
        default: None,
        example: Some("1042,1043"),
    },
    EnvVar {
        name: "INSTRUCTORS_HIDE_USERNAMES",
        config_key: "instructors.hidden_usernames",
        description: "Comma-separated usernames never shown publicly",
        category: EnvVarCategory::Instructors,
        default: None,
        example: Some("frontdesk,admin"),
    },
    EnvVar {
        name: "INSTRUCTORS_HIDE_NAMES",
        config_key: "instructors.hidden_names",
        description: "Comma-separated full names never shown publicly",
        category: EnvVarCategory::Instructors,
        default: None,
        example: Some("Studio Account"),
    },
    // === Server ===
    EnvVar {
        name: "PORT",
        config_key: "server.port",
        description: "Port the pack host listens on",
        category: EnvVarCategory::Server,
        default: Some("3000"),
        example: Some("10000"),
    },
    // === Logging ===
    EnvVar {
        name: "LOG_LEVEL",
        config_key: "logging.level",
        description: "Log level (trace, debug, info, warn, error)",
        category: EnvVarCategory::Logging,
        default: Some("info"),
        example: Some("debug"),
    },
];

/// Get all environment variables for a given category
pub fn env_vars_for_category(category: EnvVarCategory) -> impl Iterator<Item = &'static EnvVar> {
    ENV_VARS.iter().filter(move |v| v.category == category)
}

/// Get environment variables grouped by category
pub fn env_vars_by_category() -> Vec<(EnvVarCategory, Vec<&'static EnvVar>)> {
    EnvVarCategory::all()
        .iter()
        .map(|cat| {
            let vars: Vec<&EnvVar> = env_vars_for_category(*cat).collect();
            (*cat, vars)
        })
        .filter(|(_, vars)| !vars.is_empty())
        .collect()
}

/// Resolve every registered variable present in the environment.
///
/// Values are trimmed; variables set to an empty string are treated as unset
/// so a blank deployment setting falls back to the configured default.
pub fn collect_overrides<F>(lookup: F) -> Vec<(&'static EnvVar, String)>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .iter()
        .filter_map(|var| {
            let value = lookup(var.name)?;
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some((var, value.to_string()))
            }
        })
        .collect()
}
