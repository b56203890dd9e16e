//! Server registry
//!
//! Ordered collection of server records, newest provisioned first. All
//! mutation is whole-record replacement, and every effective change bumps
//! a revision counter that persistence and derived views key off.

use crate::models::Server;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    servers: Vec<Server>,
    revision: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from existing records, dropping later duplicates
    pub fn from_servers(servers: Vec<Server>) -> Self {
        let mut registry = Self::new();
        for server in servers {
            if registry.contains(&server.id) {
                tracing::warn!(server = %server.id, "Dropping duplicate server record");
                continue;
            }
            registry.servers.push(server);
        }
        registry
    }

    /// Snapshot of all records in display order
    pub fn list(&self) -> &[Server] {
        &self.servers
    }

    pub fn get(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Incremented on every effective mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the record matching `id` with `updater(record)`.
    ///
    /// Returns the stored record, or `None` if `id` is unknown. The id
    /// survives even if the updater rewrites it.
    pub fn upsert<F>(&mut self, id: &str, updater: F) -> Option<Server>
    where
        F: FnOnce(Server) -> Server,
    {
        let slot = self.servers.iter_mut().find(|s| s.id == id)?;
        let mut next = updater(slot.clone());
        next.id = slot.id.clone();
        if next != *slot {
            *slot = next;
            self.revision += 1;
        }
        Some(slot.clone())
    }

    /// Apply `updater` to every record, in order
    pub fn update_all<F>(&mut self, mut updater: F)
    where
        F: FnMut(Server) -> Server,
    {
        let mut changed = false;
        for slot in self.servers.iter_mut() {
            let mut next = updater(slot.clone());
            next.id = slot.id.clone();
            if next != *slot {
                *slot = next;
                changed = true;
            }
        }
        if changed {
            self.revision += 1;
        }
    }

    /// Prepend a new record
    pub fn insert_front(&mut self, server: Server) -> Result<()> {
        if self.contains(&server.id) {
            return Err(Error::DuplicateId(server.id));
        }
        self.servers.insert(0, server);
        self.revision += 1;
        Ok(())
    }
}
