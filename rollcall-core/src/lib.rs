//! Rollcall Core
//!
//! Platform-agnostic logic for the Rollcall weighted roster picker: the
//! selection algorithm, remote configuration loading (plain or encrypted,
//! flat or grouped), the local storage encoding and the roster store that
//! ties them together. Storage, transport and timers are supplied by the
//! host through the traits below.

pub mod codec;
pub mod constants;
pub mod crypto;
pub mod data;
pub mod import;
pub mod loader;
pub mod memory;
pub mod selector;
pub mod store;

use std::time::Duration;

use async_trait::async_trait;

pub use codec::{DecodeError, decode, encode};
pub use crypto::{DecryptionError, EncryptedEnvelope, EncryptionError, decrypt, encrypt, is_encrypted};
pub use data::{Entry, EntryPatch, Group, RosterDocument, SelectionRecord};
pub use import::{ImportError, parse_csv};
pub use loader::{LoadConfigFailed, LoadError, load, load_from_text};
pub use memory::{InstantDelay, MemoryStorage};
pub use selector::{pick, total_weight};
pub use store::{RosterState, RosterStore};

/// Key-value slot the roster is persisted into.
/// Platform-specific implementations should provide this
pub trait ConfigStorage {
    type Error: std::error::Error + 'static;

    /// Read the text stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage substrate cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite the text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage substrate rejects the write.
    fn set(&self, key: &str, text: &str) -> Result<(), Self::Error>;
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Single-attempt document transport.
#[async_trait(?Send)]
pub trait ConfigFetcher {
    type Error: std::error::Error + 'static;

    /// Fetch `url`. Non-success statuses are returned, not raised.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received at all.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, Self::Error>;
}

/// Timer used while a pick is in progress.
#[async_trait(?Send)]
pub trait PickDelay {
    async fn wait(&self, duration: Duration);
}
