// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted view state and the key-value store it lives in.
//!
//! The record is a JSON object `{"x": number, "y": number, "scale": number}`
//! stored under [`PERSIST_KEY_PREFIX`] followed by a caller-supplied
//! identifier (typically the stream URL), so that each stream keeps its own
//! view.
//!
//! ## Minimal example
//!
//! ```
//! use understory_pan_zoom::{KeyValueStore, MemoryStore, PersistedTransform, decode_record};
//!
//! let store = MemoryStore::new();
//! let record = PersistedTransform { x: 0.1, y: -0.2, scale: 2.0 };
//! store.set("webrtc-digital-ptc:cam", record.encode());
//!
//! let raw = store.get("webrtc-digital-ptc:cam").unwrap();
//! assert_eq!(decode_record(&raw).unwrap(), record);
//! ```

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Namespace prefix of every persisted view-state key.
pub const PERSIST_KEY_PREFIX: &str = "webrtc-digital-ptc:";

/// Durable string key-value storage provided by the host.
///
/// In a browser this is backed by `localStorage`. All methods take `&self`:
/// stores are shared between the transforms of a page and mutate through
/// interior mutability.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);
    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.borrow_mut().insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// The persisted `{x, y, scale}` triple.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedTransform {
    /// Horizontal offset as a fraction of the video width.
    pub x: f64,
    /// Vertical offset as a fraction of the video height.
    pub y: f64,
    /// Zoom factor.
    pub scale: f64,
}

impl PersistedTransform {
    /// Serializes the record to its JSON form.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing three plain floats cannot fail; non-finite values are
        // written as `null` and rejected again by `decode_record`.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Reasons a stored record is rejected.
#[derive(Debug)]
pub enum PersistError {
    /// The stored text is not a JSON object with numeric `x`, `y` and `scale`.
    Decode(serde_json::Error),
    /// At least one of the values is NaN or infinite.
    NonFinite(PersistedTransform),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "malformed view state record: {err}"),
            Self::NonFinite(record) => write!(
                f,
                "view state record has non-finite values (x: {}, y: {}, scale: {})",
                record.x, record.y, record.scale
            ),
        }
    }
}

impl core::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::NonFinite(_) => None,
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

/// Parses and validates a stored record.
pub fn decode_record(raw: &str) -> Result<PersistedTransform, PersistError> {
    let record: PersistedTransform = serde_json::from_str(raw)?;
    if [record.x, record.y, record.scale]
        .iter()
        .all(|value| value.is_finite())
    {
        Ok(record)
    } else {
        Err(PersistError::NonFinite(record))
    }
}

/// Where a transform keeps its state: a shared store plus the full key.
#[derive(Clone)]
pub(crate) struct Persistence {
    pub(crate) store: Rc<dyn KeyValueStore>,
    pub(crate) key: String,
}

impl Persistence {
    pub(crate) fn new(store: Rc<dyn KeyValueStore>, persist_key: &str) -> Self {
        Self {
            store,
            key: format!("{PERSIST_KEY_PREFIX}{persist_key}"),
        }
    }

    /// Loads the stored record, deleting it when it does not validate.
    pub(crate) fn load(&self) -> Option<PersistedTransform> {
        let raw = self.store.get(&self.key)?;
        match decode_record(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "discarding stored view state");
                self.store.remove(&self.key);
                None
            }
        }
    }

    pub(crate) fn save(&self, record: PersistedTransform) {
        self.store.set(&self.key, record.encode());
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
