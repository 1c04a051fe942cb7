//! Normalized records built from FitDegree payloads.
//!
//! Upstream collections come in several shapes: a bare `response` array,
//! `{ items, cache }` with side tables keyed by id (`cache.identities`,
//! `cache.images`, `cache.ooo_durations`), or the pack-wrapped
//! `data.response.data`. [`Collection::find`] locates the list in any of
//! them; the normalizers below turn entries into typed records.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::{split_list, InstructorsConfig};

/// Image width preferred when picking a source
const PREFERRED_IMAGE_WIDTH: f64 = 640.0;

static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

// ─── Value helpers ───────────────────────────────────────────────────────────

/// String form of an id or text field; numbers are stringified
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn trimmed(value: Option<&Value>) -> String {
    text(value).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| trimmed(record.get(*k)))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `true`, or `1` for flags stored as integers
fn flag_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// `false`, or `0` for flags stored as integers
fn flag_cleared(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => !*b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// A located list of records plus its side tables
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub items: Vec<Value>,
    /// `cache` object accompanying the items, or null
    pub cache: Value,
}

impl Collection {
    /// Locate the record list in a payload.
    ///
    /// Paths are checked from most to least nested: `data.response.data`,
    /// `response.data`, `data.response`, `response`, `data`, then the root.
    /// A node matches if it is an array or an object with an `items` array.
    /// Payloads without a list yield an empty collection.
    pub fn find(payload: &Value) -> Self {
        Self::locate(payload).unwrap_or_default()
    }

    /// Like [`Collection::find`], but `None` when no list is present
    pub fn locate(payload: &Value) -> Option<Self> {
        const PATHS: &[&[&str]] = &[
            &["data", "response", "data"],
            &["response", "data"],
            &["data", "response"],
            &["response"],
            &["data"],
            &[],
        ];

        for path in PATHS {
            let node = path.iter().try_fold(payload, |node, key| node.get(*key));
            let Some(node) = node else { continue };

            if let Some(items) = node.as_array() {
                return Some(Self {
                    items: items.clone(),
                    cache: Value::Null,
                });
            }
            if let Some(items) = node.get("items").and_then(Value::as_array) {
                return Some(Self {
                    items: items.clone(),
                    cache: node.get("cache").cloned().unwrap_or(Value::Null),
                });
            }
        }

        None
    }

    /// True when the payload carried `cache` side tables
    pub fn has_side_tables(&self) -> bool {
        self.cache.is_object()
    }

    /// Entries of `cache.<table>` keyed by their stringified `id`
    pub fn table(&self, name: &str) -> HashMap<String, Value> {
        self.cache
            .get(name)
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| text(row.get("id")).map(|id| (id, row.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Image URL from a `cache.images` entry: the source whose width is
/// closest to 640, else the first source.
pub fn pick_image_url(image: &Value) -> Option<String> {
    let sources = image.get("sources")?.as_array()?;
    if sources.is_empty() {
        return None;
    }

    let closest = sources
        .iter()
        .filter_map(|s| number(s.get("width")).map(|w| (s, (w - PREFERRED_IMAGE_WIDTH).abs())))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(s, _)| s);

    let source = closest.unwrap_or(&sources[0]);
    text(source.get("url")).filter(|u| !u.is_empty())
}

pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase().replace(['\'', '"'], "");
    SLUG_SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

// ─── Instructors ─────────────────────────────────────────────────────────────

/// Whether a record reads as active.
///
/// Records with no activity fields are active. Deletion flags accept `true`
/// or `1`; enablement flags accept `false` or `0`. `status`/`state` count
/// only when they are strings.
pub fn is_active_record(record: Option<&Value>) -> bool {
    let Some(record) = record.filter(|r| r.is_object()) else {
        return true;
    };

    if ["is_deleted", "deleted", "archived"]
        .iter()
        .any(|k| flag_set(record.get(*k)))
    {
        return false;
    }

    if ["active", "is_active", "isActive", "enabled", "is_enabled"]
        .iter()
        .any(|k| flag_cleared(record.get(*k)))
    {
        return false;
    }

    if flag_set(record.get("deactivated")) || truthy(record.get("deactivated_at")) {
        return false;
    }

    let status = ["status", "state"]
        .iter()
        .filter_map(|k| record.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_lowercase())
        .find(|s| !s.is_empty());

    !matches!(status, Some(s) if s != "active")
}

fn is_placeholder_bio(bio: &str) -> bool {
    bio.to_lowercase().contains("coming soon")
}

/// Case-insensitive denylists for instructors that should never be listed
#[derive(Debug, Clone, Default)]
pub struct InstructorDenylist {
    identity_ids: HashSet<String>,
    usernames: HashSet<String>,
    names: HashSet<String>,
}

impl InstructorDenylist {
    pub fn from_config(config: &InstructorsConfig) -> Self {
        let set = |raw: &str| -> HashSet<String> {
            split_list(raw).into_iter().map(|s| s.to_lowercase()).collect()
        };
        Self {
            identity_ids: set(&config.hidden_identity_ids),
            usernames: set(&config.hidden_usernames),
            names: set(&config.hidden_names),
        }
    }

    pub fn hides(&self, instructor: &Instructor) -> bool {
        let hit = |set: &HashSet<String>, value: Option<&str>| {
            value.is_some_and(|v| set.contains(&v.trim().to_lowercase()))
        };
        hit(&self.identity_ids, instructor.identity_id.as_deref())
            || hit(&self.usernames, instructor.username.as_deref())
            || hit(&self.names, Some(&instructor.full_name))
    }
}

/// A publicly listed instructor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instructor {
    pub id: String,
    pub identity_id: Option<String>,
    pub username: Option<String>,
    pub full_name: String,
    pub about: String,
    pub image_url: Option<String>,
    pub slug: String,
}

/// Visible instructors plus the size of the unfiltered list
#[derive(Debug, Clone, Default)]
pub struct InstructorRoster {
    pub visible: Vec<Instructor>,
    pub total: usize,
}

fn full_name(item: &Value, identity: Option<&Value>) -> String {
    let part = |key: &str| {
        let from_identity = identity.map(|i| trimmed(i.get(key))).unwrap_or_default();
        if from_identity.is_empty() {
            trimmed(item.get(key))
        } else {
            from_identity
        }
    };
    let joined = format!("{} {}", part("first_name"), part("last_name"))
        .trim()
        .to_string();
    if joined.is_empty() {
        first_text(item, &["name", "full_name", "display_name"])
    } else {
        joined
    }
}

/// Build the public instructor roster from a team-members payload.
///
/// Each item is joined to its identity and image. Items and identities must
/// both be active and not on the denylist. Payloads with side tables also
/// require a profile picture and a real bio; bare lists only need a name.
pub fn normalize_instructors(payload: &Value, denylist: &InstructorDenylist) -> InstructorRoster {
    let collection = Collection::find(payload);
    let strict = collection.has_side_tables();
    let identities = collection.table("identities");
    let images = collection.table("images");

    let mut visible = Vec::new();
    for item in &collection.items {
        let identity_id = text(item.get("identity_id"));
        let identity = identity_id.as_ref().and_then(|id| identities.get(id));

        if !is_active_record(Some(item)) || !is_active_record(identity) {
            continue;
        }

        let name = full_name(item, identity);
        if name.is_empty() {
            continue;
        }

        let about = identity
            .map(|i| trimmed(i.get("about_me")))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| first_text(item, &["about_me", "bio"]));

        let image_id = [
            text(item.get("profile_picture_image_id")),
            identity.and_then(|i| text(i.get("profile_picture_id"))),
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty());

        if strict && (image_id.is_none() || about.is_empty() || is_placeholder_bio(&about)) {
            continue;
        }

        let image_url = image_id
            .as_ref()
            .and_then(|id| images.get(id))
            .and_then(pick_image_url)
            .or_else(|| text(item.get("image_url")).filter(|u| !u.is_empty()));

        let id = text(item.get("id")).unwrap_or_default();
        let username = text(item.get("username"))
            .or_else(|| identity.and_then(|i| text(i.get("username"))));
        let slug = [Some(name.as_str()), username.as_deref(), Some(id.as_str())]
            .into_iter()
            .flatten()
            .map(slugify)
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| "instructor".to_string());

        let instructor = Instructor {
            id,
            identity_id: identity_id.or_else(|| identity.and_then(|i| text(i.get("id")))),
            username,
            full_name: name,
            about,
            image_url,
            slug,
        };

        if denylist.hides(&instructor) {
            tracing::debug!(name = %instructor.full_name, "instructor hidden by denylist");
            continue;
        }
        visible.push(instructor);
    }

    InstructorRoster {
        visible,
        total: collection.items.len(),
    }
}

// ─── Class types ─────────────────────────────────────────────────────────────

/// A group class definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassType {
    pub title: String,
    pub description: String,
    pub group_name: String,
    pub difficulty: String,
}

impl ClassType {
    pub fn from_value(item: &Value) -> Self {
        let group_name = {
            let direct = trimmed(item.get("group_name"));
            if direct.is_empty() {
                trimmed(item.get("class_group").and_then(|g| g.get("name")))
            } else {
                direct
            }
        };
        Self {
            title: trimmed(item.get("title")),
            description: trimmed(item.get("description")),
            group_name,
            difficulty: trimmed(item.get("difficulty_text")),
        }
    }

    /// Case-insensitive keyword match on title, description and group.
    /// An empty keyword matches everything.
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        format!("{} {} {}", self.title, self.description, self.group_name)
            .to_lowercase()
            .contains(&keyword)
    }

    /// Teacher-training groups are listed on their own page
    pub fn is_teacher_training(&self) -> bool {
        self.group_name.to_lowercase().contains("teacher training")
            || self.title.to_lowercase().contains("teacher training")
    }
}

pub fn normalize_class_types(payload: &Value) -> Vec<ClassType> {
    Collection::find(payload)
        .items
        .iter()
        .map(ClassType::from_value)
        .collect()
}

// ─── Schedule ────────────────────────────────────────────────────────────────

/// One scheduled class occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleItem {
    pub title: String,
    pub instructor_name: String,
    pub description: String,
    /// Sort key in studio-local time (`fs_event_datetime`)
    pub sort_key: String,
    /// Human-readable start, empty when unknown
    pub when: String,
    pub book_href: String,
    pub past: bool,
}

impl ScheduleItem {
    pub fn from_value(item: &Value) -> Self {
        let raw_when = first_text(
            item,
            &[
                "fs_event_datetime",
                "event_datetime",
                "fs_end_datetime",
                "end_datetime",
            ],
        );
        let share_url = trimmed(item.get("share_url"));
        Self {
            title: trimmed(item.get("title")),
            instructor_name: trimmed(item.get("instructor_name")),
            description: trimmed(item.get("description")),
            sort_key: trimmed(item.get("fs_event_datetime")),
            when: format_event_datetime(&raw_when),
            book_href: if share_url.is_empty() {
                "/book.html#book".to_string()
            } else {
                share_url
            },
            past: truthy(item.get("past")),
        }
    }
}

/// Upcoming items in start order
pub fn normalize_schedule(payload: &Value) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = Collection::find(payload)
        .items
        .iter()
        .map(ScheduleItem::from_value)
        .filter(|item| !item.past)
        .collect();
    items.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    items
}

/// `January 5, 2026 • 6:00 pm`; unparseable input is returned unchanged
pub fn format_event_datetime(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|dt| dt.format("%B %-d, %Y • %-I:%M %P").to_string())
        .unwrap_or_else(|| raw.to_string())
}

// ─── Services ────────────────────────────────────────────────────────────────

/// A bookable length and price for a service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDuration {
    pub minutes: Option<f64>,
    pub base_price_cents: Option<f64>,
}

impl ServiceDuration {
    /// `60 min · $70.00`, or whichever half is known
    pub fn label(&self) -> Option<String> {
        let minutes = self
            .minutes
            .filter(|m| *m != 0.0)
            .map(|m| format!("{} min", m));
        let price = self.base_price_cents.map(format_usd);
        match (minutes, price) {
            (Some(m), Some(p)) => Some(format!("{} · {}", m, p)),
            (Some(m), None) => Some(m),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// A one-on-one service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub durations: Vec<ServiceDuration>,
}

impl Service {
    /// All duration labels joined with ` / `
    pub fn price_line(&self) -> String {
        self.durations
            .iter()
            .filter_map(ServiceDuration::label)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Services shown in the app, with images and durations joined from the
/// side tables.
pub fn normalize_services(payload: &Value) -> Vec<Service> {
    let collection = Collection::find(payload);
    let images = collection.table("images");

    let mut durations: HashMap<String, Vec<ServiceDuration>> = HashMap::new();
    if let Some(rows) = collection.cache.get("ooo_durations").and_then(Value::as_array) {
        for row in rows {
            let Some(service_id) = text(row.get("service_id")) else {
                continue;
            };
            durations.entry(service_id).or_default().push(ServiceDuration {
                minutes: number(row.get("duration")),
                base_price_cents: number(row.get("base_price")),
            });
        }
    }

    collection
        .items
        .iter()
        .filter(|svc| svc.get("display_on_app") != Some(&Value::Bool(false)))
        .map(|svc| {
            let id = text(svc.get("id")).unwrap_or_default();
            Service {
                name: trimmed(svc.get("name")),
                description: trimmed(svc.get("description")),
                image_url: text(svc.get("image_id"))
                    .and_then(|img| images.get(&img))
                    .and_then(pick_image_url),
                durations: durations.remove(&id).unwrap_or_default(),
            }
        })
        .collect()
}

/// Format cents as US dollars: `7000` → `$70.00`, `123450` → `$1,234.50`
pub fn format_usd(cents: f64) -> String {
    let total = (cents.abs()).round() as u64;
    let (dollars, rem) = (total / 100, total % 100);

    let digits = dollars.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0.0 && total > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, rem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_shapes() {
        let bare = json!({"auth_status": {"code": 0}, "response": [{"id": 1}]});
        assert_eq!(Collection::find(&bare).items.len(), 1);
        assert!(!Collection::find(&bare).has_side_tables());

        let vendor = json!({"response": {"success": true, "data": {"items": [{}, {}], "cache": {"images": []}}}});
        let found = Collection::find(&vendor);
        assert_eq!(found.items.len(), 2);
        assert!(found.has_side_tables());

        let wrapped = json!({"ok": true, "data": {"response": {"data": {"items": [{}]}}}});
        assert_eq!(Collection::find(&wrapped).items.len(), 1);

        assert!(Collection::find(&json!({"ok": false})).items.is_empty());
        assert!(Collection::locate(&json!({"ok": false})).is_none());
    }

    #[test]
    fn test_is_active_record() {
        assert!(is_active_record(None));
        assert!(is_active_record(Some(&json!({"name": "Ana"}))));
        assert!(!is_active_record(Some(&json!({"is_deleted": true}))));
        assert!(!is_active_record(Some(&json!({"is_deleted": 1}))));
        assert!(is_active_record(Some(&json!({"is_deleted": 0}))));
        assert!(!is_active_record(Some(&json!({"is_active": false}))));
        assert!(!is_active_record(Some(&json!({"enabled": 0}))));
        assert!(!is_active_record(Some(&json!({"deactivated_at": "2024-01-01"}))));
        assert!(is_active_record(Some(&json!({"deactivated_at": ""}))));
        assert!(!is_active_record(Some(&json!({"status": "Inactive"}))));
        assert!(is_active_record(Some(&json!({"status": " ACTIVE "}))));
        assert!(is_active_record(Some(&json!({"status": 2}))));
    }

    #[test]
    fn test_pick_image_url_prefers_640() {
        let image = json!({"sources": [
            {"url": "a", "width": 100},
            {"url": "b", "width": 700},
            {"url": "c", "width": "600"},
        ]});
        assert_eq!(pick_image_url(&image).as_deref(), Some("c"));

        let no_widths = json!({"sources": [{"url": "first"}, {"url": "second"}]});
        assert_eq!(pick_image_url(&no_widths).as_deref(), Some("first"));

        assert!(pick_image_url(&json!({"sources": []})).is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Ana María O'Neil "), "ana-mar-a-oneil");
        assert_eq!(slugify("--"), "");
    }

    #[test]
    fn test_bare_list_needs_only_name() {
        let payload = json!({"auth_status": {"code": 0}, "response": [
            {"id": 1, "name": "Ana"},
            {"id": 2},
            {"id": 3, "first_name": "Bo", "is_deleted": true},
        ]});
        let roster = normalize_instructors(&payload, &InstructorDenylist::default());
        assert_eq!(roster.total, 3);
        assert_eq!(roster.visible.len(), 1);
        assert_eq!(roster.visible[0].full_name, "Ana");
        assert_eq!(roster.visible[0].slug, "ana");
    }

    #[test]
    fn test_cache_shaped_join_and_requirements() {
        let payload = json!({"ok": true, "data": {"response": {"data": {
            "items": [
                {"id": 1, "identity_id": 10, "profile_picture_image_id": 100},
                {"id": 2, "identity_id": 20, "profile_picture_image_id": 200},
                {"id": 3, "identity_id": 30},
                {"id": 4, "identity_id": 40, "profile_picture_image_id": 400},
            ],
            "cache": {
                "identities": [
                    {"id": 10, "first_name": "Ana", "last_name": "Lee", "about_me": "Teaches flow."},
                    {"id": 20, "first_name": "Bo", "about_me": "Bio coming soon"},
                    {"id": 30, "first_name": "Cy", "about_me": "No photo."},
                    {"id": 40, "first_name": "Di", "about_me": "Gone.", "status": "inactive"},
                ],
                "images": [{"id": 100, "sources": [{"url": "https://img/ana.jpg", "width": 640}]}]
            }
        }}}});

        let roster = normalize_instructors(&payload, &InstructorDenylist::default());
        assert_eq!(roster.total, 4);
        assert_eq!(roster.visible.len(), 1);
        let ana = &roster.visible[0];
        assert_eq!(ana.full_name, "Ana Lee");
        assert_eq!(ana.about, "Teaches flow.");
        assert_eq!(ana.image_url.as_deref(), Some("https://img/ana.jpg"));
        assert_eq!(ana.identity_id.as_deref(), Some("10"));
    }

    #[test]
    fn test_denylist() {
        let payload = json!({"response": [
            {"id": 1, "name": "Ana", "identity_id": 10},
            {"id": 2, "name": "Bo", "username": "bo.yoga"},
            {"id": 3, "name": "Cy Young"},
            {"id": 4, "name": "Di"},
        ]});
        let denylist = InstructorDenylist::from_config(&InstructorsConfig {
            hidden_identity_ids: "10".to_string(),
            hidden_usernames: "BO.YOGA".to_string(),
            hidden_names: "cy young, ".to_string(),
        });
        let roster = normalize_instructors(&payload, &denylist);
        let names: Vec<&str> = roster.visible.iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(names, vec!["Di"]);
    }

    #[test]
    fn test_class_types() {
        let payload = json!({"response": {"success": true, "data": {"items": [
            {"title": "Vinyasa", "class_group": {"name": "Flow"}, "difficulty_text": "All levels"},
            {"title": "200hr Teacher Training", "group_name": "Training"},
        ]}}});
        let classes = normalize_class_types(&payload);
        assert_eq!(classes[0].group_name, "Flow");
        assert!(!classes[0].is_teacher_training());
        assert!(classes[1].is_teacher_training());
        assert!(classes[1].mentions("TEACHER training"));
        assert!(classes[0].mentions(""));
        assert!(!classes[0].mentions("training"));
    }

    #[test]
    fn test_schedule_sorted_and_upcoming() {
        let payload = json!({"response": {"success": true, "data": {"items": [
            {"title": "Late", "fs_event_datetime": "2026-01-06 09:00:00"},
            {"title": "Past", "fs_event_datetime": "2026-01-01 09:00:00", "past": true},
            {"title": "Early", "fs_event_datetime": "2026-01-05 18:00:00", "share_url": "https://book/x"},
        ]}}});
        let items = normalize_schedule(&payload);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Late"]);
        assert_eq!(items[0].when, "January 5, 2026 • 6:00 pm");
        assert_eq!(items[0].book_href, "https://book/x");
        assert_eq!(items[1].book_href, "/book.html#book");
    }

    #[test]
    fn test_format_event_datetime_fallbacks() {
        assert_eq!(format_event_datetime(""), "");
        assert_eq!(format_event_datetime("soon"), "soon");
        assert_eq!(
            format_event_datetime("2026-03-10T07:30:00"),
            "March 10, 2026 • 7:30 am"
        );
    }

    #[test]
    fn test_services_with_durations() {
        let payload = json!({"response": {"success": true, "data": {
            "items": [
                {"id": 1, "name": "Private Session", "image_id": 9},
                {"id": 2, "name": "Hidden", "display_on_app": false},
                {"id": 3, "name": "Consult"},
            ],
            "cache": {
                "images": [{"id": 9, "sources": [{"url": "https://img/p.jpg"}]}],
                "ooo_durations": [
                    {"service_id": 1, "duration": 60, "base_price": 7000},
                    {"service_id": 1, "duration": "90", "base_price": "10000"},
                ]
            }
        }}});
        let services = normalize_services(&payload);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].price_line(), "60 min · $70.00 / 90 min · $100.00");
        assert_eq!(services[0].image_url.as_deref(), Some("https://img/p.jpg"));
        assert_eq!(services[1].price_line(), "");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(7000.0), "$70.00");
        assert_eq!(format_usd(123450.0), "$1,234.50");
        assert_eq!(format_usd(5.0), "$0.05");
        assert_eq!(format_usd(-500.0), "-$5.00");
    }
}
