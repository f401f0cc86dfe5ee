//! Text encoding for the local storage slot.
//!
//! Current writes wrap the JSON document as `base64(percent_escape(json))`, the
//! same layering browsers produce with `btoa(encodeURIComponent(json))`, so the
//! slot only ever holds ASCII. Older builds stored the raw JSON; reads accept
//! both.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::data::RosterDocument;

#[derive(Debug, Error)]
#[error("stored configuration is unreadable: {source}")]
pub struct DecodeError {
    #[source]
    source: serde_json::Error,
}

/// Serialize a document into the wrapped storage form.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized to JSON.
pub fn encode(document: &RosterDocument) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(document)?;
    Ok(STANDARD.encode(urlencoding::encode(&json).as_bytes()))
}

/// Read a stored document, trying the wrapped form first and raw JSON second.
///
/// # Errors
///
/// Returns [`DecodeError`] when neither form parses.
pub fn decode(text: &str) -> Result<RosterDocument, DecodeError> {
    if let Some(document) = decode_wrapped(text) {
        return Ok(document);
    }
    serde_json::from_str(text).map_err(|source| DecodeError { source })
}

fn decode_wrapped(text: &str) -> Option<RosterDocument> {
    let bytes = STANDARD.decode(text.trim()).ok()?;
    let escaped = String::from_utf8(bytes).ok()?;
    let json = urlencoding::decode(&escaped).ok()?;
    serde_json::from_str(&json).ok()
}
