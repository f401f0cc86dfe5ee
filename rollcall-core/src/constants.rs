//! Centralized tunables for Rollcall.
//!
//! Storage keys, timing and the crypto parameters shared with the document
//! encryption tooling live here so that changing one of them is a reviewed
//! code change rather than a runtime setting.

use std::time::Duration;

// Persistence ---------------------------------------------------------------
/// Key of the single local slot holding the encoded roster document.
pub const STORAGE_KEY: &str = "rollcall-config";
/// Title shown before any document has been loaded.
pub const DEFAULT_TITLE: &str = "Rollcall";

// Weights -------------------------------------------------------------------
/// Floor applied to weights supplied when creating or editing an entry.
pub const MIN_WEIGHT: f64 = 0.1;
/// Weight substituted for missing or non-positive weights in loaded documents.
pub const DEFAULT_WEIGHT: f64 = 1.0;

// Picking -------------------------------------------------------------------
/// Delay between starting a pick and revealing the result. The page animates
/// during this window.
pub const PICK_DELAY: Duration = Duration::from_millis(1000);
/// History cap when already-picked entries may be picked again.
pub const HISTORY_LIMIT: usize = 50;
pub(crate) const ERR_ALL_PICKED: &str =
    "all entries have already been picked; clear the history to start over";
pub(crate) const ERR_NONE_AVAILABLE: &str = "no entries available to pick";

// Encrypted documents -------------------------------------------------------
pub const KDF_ITERATIONS: u32 = 100_000;
pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const ENVELOPE_VERSION: &str = "1.0";
pub const ENVELOPE_ALGORITHM: &str = "AES-GCM";

// Id generation -------------------------------------------------------------
pub(crate) const ID_SUFFIX_LEN: usize = 9;
