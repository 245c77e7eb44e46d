//! A repository of live chat-protocol client sessions, keyed by device identifier.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Live client sessions, shared across tasks.
///
/// Cloning a `ClientRegistry` gives another handle to the same sessions.
pub struct ClientRegistry<C> {
    clients: Arc<RwLock<HashMap<String, Arc<C>>>>,
}

impl<C> Clone for ClientRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            clients: Arc::clone(&self.clients),
        }
    }
}

impl<C> Default for ClientRegistry<C> {
    fn default() -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<C> ClientRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<C>> {
        self.read(|clients| clients.get(device_id).cloned())
    }

    /// Register a session, returning the one it replaces, if any.
    pub fn insert(&self, device_id: impl Into<String>, client: C) -> Option<Arc<C>> {
        self.write(|clients| clients.insert(device_id.into(), Arc::new(client)))
    }

    pub fn remove(&self, device_id: &str) -> Option<Arc<C>> {
        self.write(|clients| clients.remove(device_id))
    }

    /// Swap every registered session for `clients` in one step.
    pub fn replace_all(&self, clients: impl IntoIterator<Item = (String, C)>) {
        let replacement: HashMap<_, _> = clients
            .into_iter()
            .map(|(device_id, client)| (device_id, Arc::new(client)))
            .collect();
        self.write(|clients| *clients = replacement);
    }

    /// Identifiers of every registered device, sorted.
    pub fn device_ids(&self) -> Vec<String> {
        let mut ids = self.read(|clients| clients.keys().cloned().collect::<Vec<_>>());
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-updated: every write is a
    // single map operation.
    fn read<R>(&self, f: impl FnOnce(&HashMap<String, Arc<C>>) -> R) -> R {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        f(&clients)
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<String, Arc<C>>) -> R) -> R {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut clients)
    }
}
