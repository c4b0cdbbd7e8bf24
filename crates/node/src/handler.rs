//! Handler-Trait und Topic-Tabelle
//!
//! Pro Topic gibt es hoechstens einen Handler. Der erste registrierte
//! bleibt aktiv, weitere Registrierungen scheitern mit
//! `TopicAlreadyHandled`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use lncf_core::{LncfError, Result};

/// Empfaenger fuer Nachrichten eines Topics
///
/// Wird synchron im Empfangs-Task aufgerufen. Lange Arbeit gehoert in
/// einen eigenen Task, sonst staut sich der Empfang.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, topic: &str, payload: &[u8]);
}

impl<F> Handler for F
where
    F: Fn(&str, &[u8]) + Send + Sync + 'static,
{
    fn handle(&self, topic: &str, payload: &[u8]) {
        self(topic, payload)
    }
}

/// Topic -> Handler, concurrent lesbar aus dem Empfangs-Task
#[derive(Default)]
pub struct HandlerTable {
    handlers: DashMap<String, Arc<dyn Handler>>,
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTable")
            .field("topics", &self.topics())
            .finish()
    }
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Handler; ein vorhandener Handler bleibt unangetastet
    pub fn registrieren(&self, topic: &str, handler: Arc<dyn Handler>) -> Result<()> {
        match self.handlers.entry(topic.to_string()) {
            Entry::Occupied(_) => Err(LncfError::TopicAlreadyHandled(topic.to_string())),
            Entry::Vacant(frei) => {
                frei.insert(handler);
                Ok(())
            }
        }
    }

    /// Gibt eine Kopie des Handlers zurueck
    ///
    /// Der Map-Eintrag ist danach wieder frei, der Aufruf des Handlers
    /// haelt keinen Shard-Lock.
    pub fn get(&self, topic: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(topic).map(|eintrag| Arc::clone(eintrag.value()))
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.handlers.contains_key(topic)
    }

    /// Alle Topics mit Handler, sortiert
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        topics.sort();
        topics
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
