//! Roster records and the serialized document shape.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_WEIGHT, ID_SUFFIX_LEN, MIN_WEIGHT};

/// A weighted roster member eligible for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

const fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

impl Entry {
    /// Build an entry with a fresh id. The weight is floored at [`MIN_WEIGHT`].
    pub fn new<R: Rng + ?Sized>(name: impl Into<String>, weight: f64, rng: &mut R) -> Self {
        Self {
            id: generate_id(rng),
            name: name.into(),
            weight: clamp_weight(weight),
            group: None,
            info: None,
        }
    }
}

/// Named bundle of entries. Only exists in documents; loading flattens it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default, alias = "students")]
    pub entries: Vec<Entry>,
}

/// The persisted and transmitted roster configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RosterDocument {
    #[serde(default, alias = "students", skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Entry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RosterDocument {
    #[must_use]
    pub fn from_entries(entries: Vec<Entry>, title: Option<String>) -> Self {
        Self {
            entries: Some(entries),
            groups: None,
            title,
        }
    }

    /// Whether the document carries at least one entry collection.
    #[must_use]
    pub const fn has_collections(&self) -> bool {
        self.entries.is_some() || self.groups.is_some()
    }

    /// Flatten into a single entry list, flat entries first, each grouped
    /// entry stamped with its group's name.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Entry>, Option<String>) {
        let mut entries = self.entries.unwrap_or_default();
        for group in self.groups.unwrap_or_default() {
            let Group {
                name,
                entries: members,
            } = group;
            entries.extend(members.into_iter().map(|mut entry| {
                entry.group = Some(name.clone());
                entry
            }));
        }
        (entries, self.title)
    }
}

/// One completed pick. History holds these most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub entry: Entry,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl SelectionRecord {
    #[must_use]
    pub fn now(entry: Entry) -> Self {
        Self {
            entry,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// `YYYY-MM-DD HH:MM:SS` in UTC, for history listings.
    #[must_use]
    pub fn formatted(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Partial update for an existing entry. `None` leaves a field untouched;
/// an empty `group` or `info` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPatch {
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub group: Option<String>,
    pub info: Option<String>,
}

impl EntryPatch {
    pub(crate) fn apply_to(self, entry: &mut Entry) {
        if let Some(name) = self.name {
            entry.name = name;
        }
        if let Some(weight) = self.weight {
            entry.weight = clamp_weight(weight);
        }
        if let Some(group) = self.group {
            entry.group = non_empty(group);
        }
        if let Some(info) = self.info {
            entry.info = non_empty(info);
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Floor a user-supplied weight at [`MIN_WEIGHT`]; non-finite input falls back
/// to [`DEFAULT_WEIGHT`].
#[must_use]
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(MIN_WEIGHT)
    } else {
        DEFAULT_WEIGHT
    }
}

/// Replace a non-positive or non-finite document weight with [`DEFAULT_WEIGHT`].
#[must_use]
pub fn normalize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        DEFAULT_WEIGHT
    }
}

/// `<unix-millis>-<9 base36 chars>`, unique enough for a single roster.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("{millis}-{suffix}")
}
