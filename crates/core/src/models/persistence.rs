use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single user interaction, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub section: String,
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn new(kind: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            section: section.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Dashboard view state persisted per user.
///
/// The maps are opaque at this layer; features read them through the typed
/// accessors and own their sub-schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistenceState {
    pub active_section: String,
    pub user_preferences: Map<String, Value>,
    pub viewed_sections: Vec<String>,
    pub interactions: Vec<InteractionEvent>,
    pub bookmarks: Vec<Value>,
    pub notes: BTreeMap<String, String>,
    pub filters: Map<String, Value>,
    pub settings: Map<String, Value>,
    #[serde(rename = "last_updated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Partial update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub active_section: Option<String>,
    pub user_preferences: Option<Map<String, Value>>,
    pub viewed_sections: Option<Vec<String>>,
    pub interactions: Option<Vec<InteractionEvent>>,
    pub bookmarks: Option<Vec<Value>>,
    pub notes: Option<BTreeMap<String, String>>,
    pub filters: Option<Map<String, Value>>,
    pub settings: Option<Map<String, Value>>,
}

impl PersistenceState {
    /// Return a new state with the patch applied; `self` is left untouched
    pub fn merged(&self, patch: StatePatch) -> Self {
        let current = self.clone();
        Self {
            active_section: patch.active_section.unwrap_or(current.active_section),
            user_preferences: patch.user_preferences.unwrap_or(current.user_preferences),
            viewed_sections: patch.viewed_sections.unwrap_or(current.viewed_sections),
            interactions: patch.interactions.unwrap_or(current.interactions),
            bookmarks: patch.bookmarks.unwrap_or(current.bookmarks),
            notes: patch.notes.unwrap_or(current.notes),
            filters: patch.filters.unwrap_or(current.filters),
            settings: patch.settings.unwrap_or(current.settings),
            last_updated: current.last_updated,
        }
    }

    /// Switch section, remembering it as viewed and recording the navigation
    pub fn visit(&self, section: &str) -> Self {
        let mut next = self.clone();
        next.active_section = section.to_string();
        if !next.viewed_sections.iter().any(|s| s == section) {
            next.viewed_sections.push(section.to_string());
        }
        next.interactions
            .push(InteractionEvent::new("navigate", section));
        next
    }

    pub fn with_interaction(&self, event: InteractionEvent) -> Self {
        let mut next = self.clone();
        next.interactions.push(event);
        next
    }

    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    pub fn preference<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        typed_entry(&self.user_preferences, key)
    }

    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        typed_entry(&self.settings, key)
    }

    pub fn filter<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        typed_entry(&self.filters, key)
    }

    /// Serialization used for change detection: sorted keys, no
    /// `last_updated`, so two states differing only in stamp compare equal.
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("last_updated");
        }
        serde_json::to_string(&value)
    }
}

fn typed_entry<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    map.get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}
