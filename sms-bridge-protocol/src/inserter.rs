//! SMS Insertion Pipeline
//!
//! Decodes host messages, routes them to a box and writes them through a
//! [`ContentStore`].
//!
//! ```text
//! host value ─▶ StoreRow::decode ─▶ MessageBox::for_kind ─▶ ContentStore::insert
//! ```
//!
//! Failures never cross the host boundary as errors from here: every reason a
//! message could not be stored collapses to `false`.

use crate::store::{ContentStore, RowUri};
use crate::{BridgeError, MessageBox, Result, StoreRow};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

/// Per-element outcomes of a batch insert, in input order
///
/// Keys are the original host values, untouched. Duplicate inputs keep one
/// entry each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    entries: Vec<(Value, bool)>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Value, inserted: bool) {
        self.entries.push((message, inserted));
    }

    /// Outcome recorded for the first element equal to `message`
    pub fn get(&self, message: &Value) -> Option<bool> {
        self.entries
            .iter()
            .find(|(key, _)| key == message)
            .map(|(_, inserted)| *inserted)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, bool)> {
        self.entries.iter().map(|(key, inserted)| (key, *inserted))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, inserted)| *inserted).count()
    }
}

/// Serialized as a list of `[message, outcome]` pairs
impl Serialize for BatchOutcome {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (message, inserted) in &self.entries {
            seq.serialize_element(&(message, inserted))?;
        }
        seq.end()
    }
}

/// Writes host messages into a content store
pub struct SmsInserter<S> {
    store: S,
}

impl<S: ContentStore> SmsInserter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert one host message, reporting why it failed
    pub fn try_insert_one(&self, message: &Value) -> Result<RowUri> {
        let mut row = StoreRow::decode(message, self.store.api_level())?;
        let kind = row
            .take_kind()
            .ok_or_else(|| BridgeError::malformed("kind missing after decode"))?;
        let destination = MessageBox::for_kind(kind);

        debug!("insertMessage: {:?} -> {}", row, destination);

        self.store
            .insert(destination, &row)
            .ok_or_else(|| BridgeError::StoreRefused(destination.content_uri()))
    }

    /// Insert one host message
    pub fn insert_one(&self, message: &Value) -> bool {
        match self.try_insert_one(message) {
            Ok(uri) => {
                debug!("insertMessage: inserted {}", uri);
                true
            }
            Err(e) if e.is_payload_error() => {
                debug!("insertMessage: rejected: {}", e.user_message());
                false
            }
            Err(e) => {
                warn!("insertMessage: failed to insert: {}", e.user_message());
                false
            }
        }
    }

    /// Insert every message in order, recording one outcome per element
    pub fn insert_many(&self, messages: &[Value]) -> BatchOutcome {
        let total = messages.len();
        let mut outcome = BatchOutcome::new();

        for (i, message) in messages.iter().enumerate() {
            debug!("insertMessages: iteration {} of {}", i + 1, total);
            outcome.push(message.clone(), self.insert_one(message));
        }

        debug!(
            "insertMessages: {} of {} messages inserted",
            outcome.succeeded(),
            total
        );
        outcome
    }
}
