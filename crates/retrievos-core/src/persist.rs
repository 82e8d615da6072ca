// ── UI state persistence ──
//
// `UiState` round-trips through an opaque JSON blob (key `dashState`)
// and, partially, through a shareable query string. Reading never fails:
// each field falls back to its default on its own.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{Map, Value, json};
use url::form_urlencoded;

use crate::model::{Column, Severity, SeveritySet};
use crate::view::{Direction, FilterState, SortState};

/// Key the blob is stored under.
pub const STATE_KEY: &str = "dashState";

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub batch: Option<String>,
    pub filter: FilterState,
    pub sort: SortState,
    pub light_theme: bool,
    pub condensed: bool,
}

#[derive(Serialize)]
struct BlobFilters<'a> {
    host: &'a str,
    model: &'a str,
    rec: &'a str,
    sev: SeveritySet,
}

#[derive(Serialize)]
struct BlobSort {
    key: Option<Column>,
    dir: i8,
}

#[derive(Serialize)]
struct Blob<'a> {
    batch: Option<&'a str>,
    filters: BlobFilters<'a>,
    sort: BlobSort,
    theme: bool,
    density: bool,
}

impl UiState {
    // ── Blob ─────────────────────────────────────────────────────────

    /// Serialize the full state shape.
    pub fn to_blob(&self) -> String {
        let blob = Blob {
            batch: self.batch.as_deref(),
            filters: BlobFilters {
                host: &self.filter.host,
                model: &self.filter.model,
                rec: &self.filter.recommendation,
                sev: self.filter.severities,
            },
            sort: BlobSort {
                key: self.sort.key,
                dir: self.sort.direction.signum(),
            },
            theme: self.light_theme,
            density: self.condensed,
        };
        // Plain strings, bools and ints: serialization cannot fail.
        serde_json::to_string(&blob).unwrap_or_else(|_| json!({}).to_string())
    }

    /// Parse a blob, substituting defaults for anything absent or malformed.
    pub fn from_blob(blob: Option<&str>) -> Self {
        let Some(Value::Object(root)) = blob.and_then(|b| serde_json::from_str(b).ok()) else {
            return Self::default();
        };

        let mut state = Self {
            batch: non_empty_str(root.get("batch")),
            light_theme: truthy(root.get("theme")),
            condensed: truthy(root.get("density")),
            ..Self::default()
        };

        if let Some(Value::Object(filters)) = root.get("filters") {
            state.filter = filters_from(filters);
        }
        if let Some(Value::Object(sort)) = root.get("sort") {
            state.sort = sort_from(sort);
        }
        state
    }

    // ── Query string ─────────────────────────────────────────────────

    /// `batch`, `host`, `model` and `rec`, omitting empty values.
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(batch) = self.batch.as_deref().filter(|b| !b.is_empty()) {
            query.append_pair("batch", batch);
        }
        for (key, value) in [
            ("host", &self.filter.host),
            ("model", &self.filter.model),
            ("rec", &self.filter.recommendation),
        ] {
            if !value.is_empty() {
                query.append_pair(key, value);
            }
        }
        query.finish()
    }

    /// Overlay non-empty query parameters onto this state.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "batch" => self.batch = Some(value.into_owned()),
                "host" => self.filter.host = value.into_owned(),
                "model" => self.filter.model = value.into_owned(),
                "rec" => self.filter.recommendation = value.into_owned(),
                _ => {}
            }
        }
    }

    /// Load from a blob and let query parameters win.
    pub fn restore(blob: Option<&str>, query: Option<&str>) -> Self {
        let mut state = Self::from_blob(blob);
        if let Some(q) = query {
            state.apply_query(q);
        }
        state
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    non_empty_str(value).unwrap_or_default()
}

fn truthy(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn filters_from(filters: &Map<String, Value>) -> FilterState {
    let severities = match filters.get("sev") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str()?.parse::<Severity>().ok())
            .collect(),
        Some(_) => SeveritySet::all(),
        None => SeveritySet::empty(),
    };
    FilterState {
        host: string_or_empty(filters.get("host")),
        model: string_or_empty(filters.get("model")),
        recommendation: string_or_empty(filters.get("rec")),
        severities,
    }
}

fn sort_from(sort: &Map<String, Value>) -> SortState {
    let key = sort
        .get("key")
        .and_then(Value::as_str)
        .and_then(|k| k.parse::<Column>().ok());
    let direction = sort
        .get("dir")
        .and_then(Value::as_i64)
        .map_or(Direction::Ascending, Direction::from_signum);
    SortState { key, direction }
}

// ── Stores ───────────────────────────────────────────────────────────

/// Opaque key-value storage for the state blob.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}

/// In-process store, for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> UiState {
        UiState {
            batch: Some("2024-01-01".into()),
            filter: FilterState {
                host: "core sw".into(),
                model: "C93&00".into(),
                recommendation: String::new(),
                severities: [Severity::Critical, Severity::High].into_iter().collect(),
            },
            sort: SortState::by(Column::CveCritical, Direction::Descending),
            light_theme: true,
            condensed: false,
        }
    }

    #[test]
    fn blob_has_full_shape() {
        let blob: Value = serde_json::from_str(&sample().to_blob()).unwrap();
        assert_eq!(
            blob,
            json!({
                "batch": "2024-01-01",
                "filters": {"host": "core sw", "model": "C93&00", "rec": "", "sev": ["Critical", "High"]},
                "sort": {"key": "cve_critical", "dir": -1},
                "theme": true,
                "density": false
            })
        );
    }

    #[test]
    fn blob_round_trips() {
        let state = sample();
        assert_eq!(UiState::from_blob(Some(&state.to_blob())), state);
        assert_eq!(
            UiState::from_blob(Some(&UiState::default().to_blob())),
            UiState::default()
        );
    }

    #[test]
    fn empty_or_corrupt_blob_yields_defaults() {
        for blob in [None, Some(""), Some("{"), Some("null"), Some("[1,2]"), Some("\"x\"")] {
            assert_eq!(UiState::from_blob(blob), UiState::default(), "{blob:?}");
        }
    }

    #[test]
    fn fields_default_independently() {
        let state = UiState::from_blob(Some(
            r#"{"batch": 7, "filters": {"host": "sw", "sev": ["High", "Bogus"]},
                "sort": {"key": "no_such_column", "dir": -1}, "theme": "yes"}"#,
        ));
        assert_eq!(state.batch, None);
        assert_eq!(state.filter.host, "sw");
        assert_eq!(state.filter.model, "");
        assert_eq!(state.filter.severities, [Severity::High].into_iter().collect());
        assert_eq!(state.sort.key, None);
        assert_eq!(state.sort.direction, Direction::Descending);
        assert!(!state.light_theme);
        assert!(!state.condensed);
    }

    #[test]
    fn query_carries_only_shareable_fields() {
        assert_eq!(
            sample().to_query(),
            "batch=2024-01-01&host=core+sw&model=C93%2600"
        );
        assert_eq!(UiState::default().to_query(), "");
    }

    #[test]
    fn query_overrides_blob() {
        let blob = sample().to_blob();
        let state = UiState::restore(Some(&blob), Some("?batch=2024-02-02&rec=same&host="));
        assert_eq!(state.batch.as_deref(), Some("2024-02-02"));
        assert_eq!(state.filter.recommendation, "same");
        // empty parameter does not clear the blob value
        assert_eq!(state.filter.host, "core sw");
        assert_eq!(state.sort, sample().sort);
    }

    #[test]
    fn query_round_trips_through_apply() {
        let mut restored = UiState::default();
        restored.apply_query(&sample().to_query());
        assert_eq!(restored.batch, sample().batch);
        assert_eq!(restored.filter.host, "core sw");
        assert_eq!(restored.filter.model, "C93&00");
    }

    #[test]
    fn memory_store_saves_and_loads() {
        let store = MemoryStateStore::default();
        assert!(store.load(STATE_KEY).is_none());
        store.save(STATE_KEY, "{}");
        assert_eq!(store.load(STATE_KEY).as_deref(), Some("{}"));
    }
}
