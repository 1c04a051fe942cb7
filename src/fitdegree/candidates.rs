//! Endpoint candidate lists and path variant generation.
//!
//! FitDegree's routing differs between deployments (`/v1` vs `/api/v1`,
//! `TEAM_MEMBERS` vs `team-members`), so a logical resource is resolved by
//! trying an ordered list of candidate paths, each expanded into variants.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{split_list, EndpointOverrides};

static REPEATED_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").expect("valid regex"));

static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

/// Prefix conventions tried for every name style, after the original prefix
const PREFIX_CONVENTIONS: &[&str] = &["/v1", "/api/v1", "/api", ""];

/// Logical upstream collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Team members shown as instructors
    Instructors,
    /// Upcoming class occurrences
    Classes,
    /// Group class definitions (class types, teacher training)
    GroupClasses,
    /// One-on-one services
    Services,
    /// Schedule items in a date window
    Schedule,
}

impl Resource {
    pub fn all() -> &'static [Resource] {
        &[
            Resource::Instructors,
            Resource::Classes,
            Resource::GroupClasses,
            Resource::Services,
            Resource::Schedule,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Instructors => "instructors",
            Resource::Classes => "classes",
            Resource::GroupClasses => "group-classes",
            Resource::Services => "services",
            Resource::Schedule => "schedule",
        }
    }

    /// Parse a resource name, accepting the upstream aliases
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "instructors" | "team-members" | "teammembers" => Some(Resource::Instructors),
            "classes" | "upcoming-classes" => Some(Resource::Classes),
            "group-classes" | "group-class" => Some(Resource::GroupClasses),
            "services" | "one-on-one" => Some(Resource::Services),
            "schedule" | "schedule-items" => Some(Resource::Schedule),
            _ => None,
        }
    }

    /// Built-in candidate paths, used when no override list is configured
    pub fn default_paths(&self) -> &'static [&'static str] {
        match self {
            Resource::Instructors => &["/api/v1/TEAM_MEMBERS"],
            Resource::Classes => &["/api/v1/UPCOMING_CLASSES"],
            Resource::GroupClasses => &["/group-class/"],
            Resource::Services => &["/one-on-one/service/"],
            Resource::Schedule => &["/schedule/item/"],
        }
    }

    /// Deployment variable holding this resource's override list
    pub fn override_env_var(&self) -> &'static str {
        match self {
            Resource::Instructors => "FITDEGREE_ENDPOINT_TEAM_MEMBERS",
            Resource::Classes => "FITDEGREE_ENDPOINT_CLASSES",
            Resource::GroupClasses => "STUDIO_FITDEGREE__ENDPOINTS__GROUP_CLASSES",
            Resource::Services => "STUDIO_FITDEGREE__ENDPOINTS__SERVICES",
            Resource::Schedule => "STUDIO_FITDEGREE__ENDPOINTS__SCHEDULE",
        }
    }

    fn override_list<'a>(&self, overrides: &'a EndpointOverrides) -> Option<&'a str> {
        match self {
            Resource::Instructors => overrides.instructors.as_deref(),
            Resource::Classes => overrides.classes.as_deref(),
            Resource::GroupClasses => overrides.group_classes.as_deref(),
            Resource::Services => overrides.services.as_deref(),
            Resource::Schedule => overrides.schedule.as_deref(),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate paths for a resource: the override list verbatim when it has
/// any entries, otherwise the built-in defaults.
///
/// Order and duplicates in the override list are preserved.
pub fn resolve_candidates(resource: Resource, override_list: Option<&str>) -> Vec<String> {
    let overrides = override_list.map(split_list).unwrap_or_default();
    if overrides.is_empty() {
        resource
            .default_paths()
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        overrides
    }
}

/// Candidate sets for every resource, computed once from configuration
#[derive(Debug, Clone)]
pub struct CandidateSet {
    entries: Vec<(Resource, Vec<String>)>,
}

impl CandidateSet {
    pub fn from_overrides(overrides: &EndpointOverrides) -> Self {
        let entries = Resource::all()
            .iter()
            .map(|r| (*r, resolve_candidates(*r, r.override_list(overrides))))
            .collect();
        Self { entries }
    }

    pub fn for_resource(&self, resource: Resource) -> &[String] {
        self.entries
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self::from_overrides(&EndpointOverrides::default())
    }
}

fn uniq(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn collapse_slashes(path: &str) -> String {
    REPEATED_SLASHES.replace_all(path, "/").into_owned()
}

/// Path-only form of an endpoint: absolute URLs are reduced to their path
/// and a leading slash is guaranteed.
fn path_only(input: &str) -> String {
    let mut path = input.to_string();
    if ABSOLUTE_URL.is_match(&path) {
        if let Ok(url) = reqwest::Url::parse(&path) {
            path = url.path().to_string();
        }
    }
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    path
}

/// Expand one endpoint path into the variants worth trying, in order.
///
/// The original path comes first. Then every prefix (the original one, then
/// `/v1`, `/api/v1`, `/api`, root) is crossed with every name style of the
/// last segment (as-is, lower, upper, snake, kebab). Finally the original
/// prefix is paired with each name style again. Duplicates are dropped,
/// keeping the first occurrence.
pub fn endpoint_variants(original: &str) -> Vec<String> {
    let input = original.trim();
    if input.is_empty() {
        return Vec::new();
    }

    let path = path_only(input);
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = parts.last().copied().unwrap_or("");
    let prefix = if parts.len() > 1 {
        format!("/{}", parts[..parts.len() - 1].join("/"))
    } else {
        String::new()
    };

    let snake = last.replace('-', "_");
    let kebab = last.replace('_', "-");
    let names = uniq([
        last.to_string(),
        last.to_lowercase(),
        last.to_uppercase(),
        snake.clone(),
        kebab.clone(),
        snake.to_lowercase(),
        kebab.to_lowercase(),
        snake.to_uppercase(),
        kebab.to_uppercase(),
    ]);

    let mut prefixes: Vec<String> = Vec::new();
    for candidate in std::iter::once(prefix.as_str()).chain(PREFIX_CONVENTIONS.iter().copied()) {
        if !prefixes.iter().any(|p| p == candidate) {
            prefixes.push(candidate.to_string());
        }
    }

    let mut out = vec![path.clone()];

    for pref in &prefixes {
        for name in &names {
            out.push(collapse_slashes(&format!("{}/{}", pref, name)));
        }
    }

    for name in &names {
        out.push(collapse_slashes(&format!("{}/{}", prefix, name)));
    }

    uniq(out)
}
