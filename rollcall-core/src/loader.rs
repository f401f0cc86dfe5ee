//! Remote configuration loading.
//!
//! A fetched body is resolved in three passes over `serde_json::Value`:
//! unwrap an encrypted envelope if there is one, validate the flat/grouped
//! shape, then normalize into a single flat [`RosterDocument`]. Nothing past
//! this module sees the envelope or the grouped shape.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::ConfigFetcher;
use crate::constants::DEFAULT_WEIGHT;
use crate::crypto::{self, DecryptionError};
use crate::data::{Entry, RosterDocument, normalize_weight};

const ENTRIES_KEYS: [&str; 2] = ["entries", "students"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("network error: {message}")]
    Network { status: Option<u16>, message: String },
    #[error("malformed document: {0}")]
    Parse(String),
    #[error("document must contain an `entries` or `groups` list")]
    InvalidShape,
    #[error("entry {position} is missing an id or a name")]
    IncompleteEntry { position: usize },
    #[error("group `{name}` is malformed")]
    InvalidGroup { name: String },
    #[error("this configuration is encrypted; a passphrase is required")]
    MissingPassphrase,
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
}

/// Uniform failure surface for configuration loading.
#[derive(Debug, Error)]
#[error("failed to load configuration: {0}")]
pub struct LoadConfigFailed(#[source] pub LoadError);

impl LoadConfigFailed {
    #[must_use]
    pub const fn cause(&self) -> &LoadError {
        &self.0
    }
}

/// Fetch `url` and resolve it into a flat roster document.
///
/// # Errors
///
/// Every failure is reported as [`LoadConfigFailed`] wrapping the step that
/// failed.
pub async fn load<F>(
    fetcher: &F,
    url: &str,
    passphrase: Option<&str>,
) -> Result<RosterDocument, LoadConfigFailed>
where
    F: ConfigFetcher + ?Sized,
{
    let response = fetcher.fetch(url).await.map_err(|err| {
        LoadConfigFailed(LoadError::Network {
            status: None,
            message: err.to_string(),
        })
    })?;
    if !response.is_success() {
        return Err(LoadConfigFailed(LoadError::Network {
            status: Some(response.status),
            message: format!("HTTP status {}", response.status),
        }));
    }
    log::debug!("fetched configuration from {url} ({} bytes)", response.body.len());
    load_from_text(&response.body, passphrase)
}

/// Resolve an already-fetched body. Shared by [`load`] and file-based hosts.
///
/// # Errors
///
/// See [`load`].
pub fn load_from_text(
    body: &str,
    passphrase: Option<&str>,
) -> Result<RosterDocument, LoadConfigFailed> {
    resolve(body, passphrase).map_err(LoadConfigFailed)
}

fn resolve(body: &str, passphrase: Option<&str>) -> Result<RosterDocument, LoadError> {
    let raw = parse_json(body)?;
    let document = if crypto::is_encrypted(&raw) {
        let passphrase = passphrase
            .filter(|p| !p.is_empty())
            .ok_or(LoadError::MissingPassphrase)?;
        let plaintext = open_envelope(&raw, passphrase)?;
        parse_json(&plaintext)?
    } else {
        raw
    };
    normalize(&document)
}

fn parse_json(text: &str) -> Result<Value, LoadError> {
    serde_json::from_str(text).map_err(|err| LoadError::Parse(err.to_string()))
}

fn open_envelope(raw: &Value, passphrase: &str) -> Result<String, LoadError> {
    let plaintext = crypto::decrypt(
        envelope_field(raw, "data"),
        envelope_field(raw, "iv"),
        envelope_field(raw, "salt"),
        passphrase,
    )?;
    Ok(plaintext)
}

fn envelope_field<'a>(raw: &'a Value, key: &str) -> &'a str {
    raw.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn normalize(document: &Value) -> Result<RosterDocument, LoadError> {
    let fields = document.as_object().ok_or(LoadError::InvalidShape)?;
    let flat = entries_field(fields);
    let groups = fields.get("groups").filter(|v| !v.is_null());
    if flat.is_none() && groups.is_none() {
        return Err(LoadError::InvalidShape);
    }

    let mut entries = match flat {
        Some(list) => normalize_entries(list.as_array().ok_or(LoadError::InvalidShape)?)?,
        None => Vec::new(),
    };
    if let Some(groups) = groups {
        for group in groups.as_array().ok_or(LoadError::InvalidShape)? {
            entries.extend(flatten_group(group)?);
        }
    }

    let title = fields
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(RosterDocument::from_entries(entries, title))
}

fn entries_field(fields: &Map<String, Value>) -> Option<&Value> {
    ENTRIES_KEYS
        .iter()
        .find_map(|key| fields.get(*key).filter(|v| !v.is_null()))
}

fn flatten_group(group: &Value) -> Result<Vec<Entry>, LoadError> {
    let name = group
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());
    let Some(name) = name else {
        return Err(LoadError::InvalidGroup {
            name: "unknown".to_string(),
        });
    };
    let members = group
        .as_object()
        .and_then(entries_field)
        .and_then(Value::as_array)
        .ok_or_else(|| LoadError::InvalidGroup {
            name: name.to_string(),
        })?;

    let mut entries = normalize_entries(members)?;
    for entry in &mut entries {
        entry.group = Some(name.to_string());
    }
    Ok(entries)
}

fn normalize_entries(list: &[Value]) -> Result<Vec<Entry>, LoadError> {
    list.iter()
        .enumerate()
        .map(|(index, item)| normalize_entry(item, index + 1))
        .collect()
}

fn normalize_entry(item: &Value, position: usize) -> Result<Entry, LoadError> {
    let id = item.get("id").and_then(identifier);
    let name = item.get("name").and_then(identifier);
    let (Some(id), Some(name)) = (id, name) else {
        return Err(LoadError::IncompleteEntry { position });
    };
    let weight = item
        .get("weight")
        .and_then(Value::as_f64)
        .map_or(DEFAULT_WEIGHT, normalize_weight);
    Ok(Entry {
        id,
        name,
        weight,
        group: optional_text(item, "group"),
        info: optional_text(item, "info"),
    })
}

/// Non-empty strings and numbers both count as ids and names.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn optional_text(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
