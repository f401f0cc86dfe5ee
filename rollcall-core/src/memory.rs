//! In-process collaborators for native hosts and tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{ConfigStorage, PickDelay};

/// Shared in-memory slot map. Clones see the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Start with `text` already stored under `key`.
    #[must_use]
    pub fn with_slot(key: &str, text: impl Into<String>) -> Self {
        let storage = Self::default();
        storage
            .slots
            .borrow_mut()
            .insert(key.to_string(), text.into());
        storage
    }

    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl ConfigStorage for MemoryStorage {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, text: &str) -> Result<(), Self::Error> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }
}

/// Resolves immediately, for hosts that do not animate picks.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDelay;

#[async_trait(?Send)]
impl PickDelay for InstantDelay {
    async fn wait(&self, _duration: Duration) {}
}
