//! Roster state and the operations the page drives.
//!
//! [`RosterState`] is plain data plus derived views computed on demand.
//! [`RosterStore`] owns a state together with its collaborators and writes the
//! roster back to the storage slot after every mutation, so callers never
//! save explicitly.

use std::collections::{BTreeSet, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::codec;
use crate::constants::{
    DEFAULT_TITLE, ERR_ALL_PICKED, ERR_NONE_AVAILABLE, HISTORY_LIMIT, PICK_DELAY, STORAGE_KEY,
};
use crate::data::{Entry, EntryPatch, RosterDocument, SelectionRecord, normalize_weight};
use crate::loader::{self, LoadConfigFailed};
use crate::selector;
use crate::{ConfigFetcher, ConfigStorage, PickDelay};

/// Everything the page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterState {
    pub entries: Vec<Entry>,
    pub title: String,
    /// Most recent first.
    pub history: Vec<SelectionRecord>,
    pub current: Option<Entry>,
    pub is_picking: bool,
    pub error: Option<String>,
    pub exclude_picked: bool,
    pub group_filter: Option<String>,
}

impl Default for RosterState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            title: DEFAULT_TITLE.to_string(),
            history: Vec::new(),
            current: None,
            is_picking: false,
            error: None,
            exclude_picked: true,
            group_filter: None,
        }
    }
}

impl RosterState {
    /// Entries eligible for the next pick, in roster order.
    #[must_use]
    pub fn available_entries(&self) -> Vec<&Entry> {
        let picked: HashSet<&str> = if self.exclude_picked {
            self.history.iter().map(|r| r.entry.id.as_str()).collect()
        } else {
            HashSet::new()
        };
        self.entries
            .iter()
            .filter(|entry| {
                self.group_filter
                    .as_deref()
                    .is_none_or(|group| entry.group.as_deref() == Some(group))
            })
            .filter(|entry| !picked.contains(entry.id.as_str()))
            .collect()
    }

    /// Sorted, de-duplicated group names present on the roster.
    #[must_use]
    pub fn all_groups(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Total weight of [`Self::available_entries`].
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        selector::total_weight(&self.available_entries())
    }

    fn has_group(&self, group: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.group.as_deref() == Some(group))
    }

    fn drop_dangling_filter(&mut self) {
        if let Some(group) = self.group_filter.as_deref()
            && !self.has_group(group)
        {
            log::debug!("group filter `{group}` no longer matches the roster; clearing it");
            self.group_filter = None;
        }
    }

    /// Replace the roster with a document's (flattened) entries.
    pub fn apply_document(&mut self, document: RosterDocument) {
        let (mut entries, title) = document.into_parts();
        for entry in &mut entries {
            entry.weight = normalize_weight(entry.weight);
        }
        self.entries = entries;
        if let Some(title) = title {
            self.title = title;
        }
        self.drop_dangling_filter();
    }

    /// The persisted form: flat entries plus title.
    #[must_use]
    pub fn to_document(&self) -> RosterDocument {
        RosterDocument::from_entries(self.entries.clone(), Some(self.title.clone()))
    }
}

/// Stateful orchestrator over storage, transport and the pick timer.
pub struct RosterStore<S, F, D> {
    storage: S,
    fetcher: F,
    delay: D,
    rng: ChaCha20Rng,
    state: RosterState,
}

impl<S, F, D> RosterStore<S, F, D>
where
    S: ConfigStorage,
    F: ConfigFetcher,
    D: PickDelay,
{
    /// Build a store from whatever the storage slot holds. An empty, missing
    /// or unreadable slot yields an empty roster.
    pub fn restore(storage: S, fetcher: F, delay: D) -> Self {
        let mut state = RosterState::default();
        if let Some(document) = read_saved(&storage) {
            state.apply_document(document);
            log::info!("restored {} saved entries", state.entries.len());
        }
        Self {
            storage,
            fetcher,
            delay,
            rng: ChaCha20Rng::from_entropy(),
            state,
        }
    }

    /// Reseed the pick and id generator, for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub const fn state(&self) -> &RosterState {
        &self.state
    }

    #[must_use]
    pub fn available_entries(&self) -> Vec<&Entry> {
        self.state.available_entries()
    }

    #[must_use]
    pub fn all_groups(&self) -> Vec<String> {
        self.state.all_groups()
    }

    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.state.total_weight()
    }

    /// Append a new entry and return its id.
    pub fn add_entry(&mut self, name: &str, weight: f64) -> String {
        let entry = Entry::new(name, weight, &mut self.rng);
        let id = entry.id.clone();
        self.state.entries.push(entry);
        self.persist();
        id
    }

    /// Merge `patch` into the entry with `id`; unknown ids are ignored.
    pub fn update_entry(&mut self, id: &str, patch: EntryPatch) {
        let Some(entry) = self.state.entries.iter_mut().find(|e| e.id == id) else {
            return;
        };
        patch.apply_to(entry);
        self.persist();
    }

    pub fn remove_entry(&mut self, id: &str) {
        self.state.entries.retain(|entry| entry.id != id);
        self.persist();
    }

    /// Restrict picks to one group. A group no entry belongs to clears the filter.
    pub fn set_group_filter(&mut self, group: Option<String>) {
        self.state.group_filter = group;
        self.state.drop_dangling_filter();
    }

    pub fn set_exclude_picked(&mut self, exclude: bool) {
        self.state.exclude_picked = exclude;
    }

    pub fn clear_history(&mut self) {
        self.state.history.clear();
        self.state.current = None;
    }

    pub fn reset_current_selection(&mut self) {
        self.state.current = None;
    }

    /// Run a full pick: guard, wait out the delay, select, record.
    ///
    /// Returns the picked entry, or `None` when the guard refused to start.
    pub async fn perform_pick(&mut self) -> Option<Entry> {
        if !self.begin_pick() {
            return None;
        }
        self.delay.wait(PICK_DELAY).await;
        self.finish_pick()
    }

    /// First half of [`Self::perform_pick`]. Hosts that cannot hold the store
    /// across the delay call this, wait, then call [`Self::finish_pick`].
    ///
    /// Returns `false` if a pick is already running or nothing is eligible; the
    /// latter records an error message.
    pub fn begin_pick(&mut self) -> bool {
        if self.state.is_picking {
            return false;
        }
        if self.state.available_entries().is_empty() {
            let message = if self.state.exclude_picked {
                ERR_ALL_PICKED
            } else {
                ERR_NONE_AVAILABLE
            };
            self.state.error = Some(message.to_string());
            return false;
        }
        self.state.error = None;
        self.state.current = None;
        self.state.is_picking = true;
        true
    }

    /// Second half of [`Self::perform_pick`]. Always leaves the picking state.
    pub fn finish_pick(&mut self) -> Option<Entry> {
        let picked = {
            let candidates = self.state.available_entries();
            selector::pick(&candidates, &mut self.rng).cloned()
        };
        if let Some(entry) = &picked {
            log::debug!("picked `{}` ({})", entry.name, entry.id);
            self.state.current = Some(entry.clone());
            self.state
                .history
                .insert(0, SelectionRecord::now(entry.clone()));
            if !self.state.exclude_picked {
                self.state.history.truncate(HISTORY_LIMIT);
            }
        }
        self.state.is_picking = false;
        picked
    }

    /// Load a remote document and replace the roster with it.
    ///
    /// Failures are recorded in the state's error message and leave the roster
    /// untouched. Returns whether the load succeeded.
    pub async fn load_from_url(&mut self, url: &str, passphrase: Option<&str>) -> bool {
        self.begin_load();
        let outcome = loader::load(&self.fetcher, url, passphrase).await;
        self.apply_load_outcome(outcome)
    }

    /// Clear the previous error before a host-driven [`loader::load`].
    pub fn begin_load(&mut self) {
        self.state.error = None;
    }

    /// Commit the result of a [`loader::load`] run by the host.
    pub fn apply_load_outcome(
        &mut self,
        outcome: Result<RosterDocument, LoadConfigFailed>,
    ) -> bool {
        match outcome {
            Ok(document) => {
                self.state.error = None;
                self.state.apply_document(document);
                log::info!("loaded {} entries", self.state.entries.len());
                self.persist();
                true
            }
            Err(err) => {
                log::warn!("{err}");
                self.state.error = Some(err.to_string());
                false
            }
        }
    }

    fn persist(&self) {
        let text = match codec::encode(&self.state.to_document()) {
            Ok(text) => text,
            Err(err) => {
                log::error!("failed to encode roster: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.set(STORAGE_KEY, &text) {
            log::error!("failed to save roster: {err}");
        }
    }
}

fn read_saved<S: ConfigStorage>(storage: &S) -> Option<RosterDocument> {
    let text = match storage.get(STORAGE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("saved roster unavailable: {err}");
            return None;
        }
    };
    codec::decode(&text)
        .inspect_err(|err| log::warn!("ignoring saved roster: {err}"))
        .ok()
}
