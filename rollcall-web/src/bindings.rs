//! JavaScript-facing handle over a browser-backed roster store.
//!
//! The page owns one [`Rollcall`]. Async operations never hold the store
//! borrowed across an `await`; a second `pick()` issued while one is running
//! is refused by the store's in-progress flag. The page is still expected to
//! disable its pick control while `isPicking` is set.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use rollcall_core::constants::{DEFAULT_WEIGHT, PICK_DELAY};
use rollcall_core::{EntryPatch, PickDelay, RosterState, RosterStore, loader};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::platform::{BrowserFetcher, LocalStorageSlot, TimeoutDelay};

type BrowserStore = RosterStore<LocalStorageSlot, BrowserFetcher, TimeoutDelay>;

/// State plus the derived views the page renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    #[serde(flatten)]
    pub state: &'a RosterState,
    pub available_ids: Vec<&'a str>,
    pub groups: Vec<String>,
    pub total_weight: f64,
}

impl<'a> Snapshot<'a> {
    #[must_use]
    pub fn of(state: &'a RosterState) -> Self {
        Self {
            state,
            available_ids: state
                .available_entries()
                .into_iter()
                .map(|entry| entry.id.as_str())
                .collect(),
            groups: state.all_groups(),
            total_weight: state.total_weight(),
        }
    }
}

/// Plain objects and numbers, never `Map` or `BigInt`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

#[wasm_bindgen]
pub struct Rollcall {
    store: Rc<RefCell<BrowserStore>>,
}

impl Default for Rollcall {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Rollcall {
    /// Restore the roster saved in `localStorage`, or start empty.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let store = RosterStore::restore(LocalStorageSlot, BrowserFetcher, TimeoutDelay);
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    /// Current state as a plain JS object.
    ///
    /// # Errors
    /// Returns an error if the state cannot be converted.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let store = self.store.borrow();
        to_js(&Snapshot::of(store.state()))
    }

    #[wasm_bindgen(js_name = isPicking)]
    #[must_use]
    pub fn is_picking(&self) -> bool {
        self.store.borrow().state().is_picking
    }

    #[wasm_bindgen(js_name = addEntry)]
    pub fn add_entry(&self, name: &str, weight: Option<f64>) -> String {
        self.store
            .borrow_mut()
            .add_entry(name, weight.unwrap_or(DEFAULT_WEIGHT))
    }

    /// Merge `{name?, weight?, group?, info?}` into an entry.
    ///
    /// # Errors
    /// Returns an error if `patch` does not have that shape.
    #[wasm_bindgen(js_name = updateEntry)]
    pub fn update_entry(&self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: EntryPatch = serde_wasm_bindgen::from_value(patch)?;
        self.store.borrow_mut().update_entry(id, patch);
        Ok(())
    }

    #[wasm_bindgen(js_name = removeEntry)]
    pub fn remove_entry(&self, id: &str) {
        self.store.borrow_mut().remove_entry(id);
    }

    #[wasm_bindgen(js_name = setGroupFilter)]
    pub fn set_group_filter(&self, group: Option<String>) {
        self.store.borrow_mut().set_group_filter(group);
    }

    #[wasm_bindgen(js_name = setExcludePicked)]
    pub fn set_exclude_picked(&self, exclude: bool) {
        self.store.borrow_mut().set_exclude_picked(exclude);
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&self) {
        self.store.borrow_mut().clear_history();
    }

    #[wasm_bindgen(js_name = resetCurrentSelection)]
    pub fn reset_current_selection(&self) {
        self.store.borrow_mut().reset_current_selection();
    }

    /// Start a pick. Resolves to the picked entry, or `null` if the pick was
    /// refused (check `snapshot().error`).
    #[must_use]
    pub fn pick(&self) -> Promise {
        let store = Rc::clone(&self.store);
        future_to_promise(async move {
            if !store.borrow_mut().begin_pick() {
                return Ok(JsValue::NULL);
            }
            TimeoutDelay.wait(PICK_DELAY).await;
            let picked = store.borrow_mut().finish_pick();
            picked.map_or(Ok(JsValue::NULL), |entry| to_js(&entry))
        })
    }

    /// Replace the roster from a remote document. Resolves to `true` on
    /// success; on failure the message is in `snapshot().error`.
    #[wasm_bindgen(js_name = loadFromUrl)]
    #[must_use]
    pub fn load_from_url(&self, url: String, passphrase: Option<String>) -> Promise {
        let store = Rc::clone(&self.store);
        future_to_promise(async move {
            store.borrow_mut().begin_load();
            let outcome = loader::load(&BrowserFetcher, &url, passphrase.as_deref()).await;
            let loaded = store.borrow_mut().apply_load_outcome(outcome);
            Ok(JsValue::from_bool(loaded))
        })
    }
}
