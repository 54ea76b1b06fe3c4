//! In-memory registry of active envoys.
//!
//! The store is the single source of truth for "is there an envoy here".
//! It is a concurrent map keyed by `(world, position)`, so event handlers
//! running on different threads can share it without an outer lock, and
//! every removal is atomic per key.

use dashmap::DashMap;

use crate::types::{BlockPos, ChunkPos, EnvoyInstance, EnvoyKey, WorldId};

#[derive(Debug, Default)]
pub struct EnvoyStore {
    envoys: DashMap<EnvoyKey, EnvoyInstance>,
}

impl EnvoyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance. Last write wins: the instance previously held
    /// under the same key, if any, is returned.
    pub fn insert(&self, instance: EnvoyInstance) -> Option<EnvoyInstance> {
        self.envoys.insert(instance.key(), instance)
    }

    /// Removes the envoy at `(world, position)`. Removing a missing key is
    /// not an error.
    pub fn remove(&self, world: &WorldId, position: BlockPos) -> Option<EnvoyInstance> {
        self.envoys
            .remove(&EnvoyKey::new(world.clone(), position))
            .map(|(_, instance)| instance)
    }

    /// Removes the envoy at `key` only if `predicate` holds for it, checked
    /// under the same shard lock as the removal.
    pub fn remove_if(
        &self,
        key: &EnvoyKey,
        predicate: impl FnOnce(&EnvoyInstance) -> bool,
    ) -> Option<EnvoyInstance> {
        self.envoys
            .remove_if(key, |_, instance| predicate(instance))
            .map(|(_, instance)| instance)
    }

    pub fn contains(&self, world: &WorldId, position: BlockPos) -> bool {
        self.envoys
            .contains_key(&EnvoyKey::new(world.clone(), position))
    }

    /// Whether `instance` itself, not a replacement under the same key, is
    /// still active.
    pub fn holds(&self, instance: &EnvoyInstance) -> bool {
        self.envoys
            .get(&instance.key())
            .is_some_and(|entry| entry.tag == instance.tag)
    }

    pub fn get(&self, world: &WorldId, position: BlockPos) -> Option<EnvoyInstance> {
        self.envoys
            .get(&EnvoyKey::new(world.clone(), position))
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every active envoy. Later mutations do not affect it.
    pub fn all(&self) -> Vec<EnvoyInstance> {
        self.envoys
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of the envoys inside one chunk of one world.
    pub fn instances_in(&self, world: &WorldId, chunk: ChunkPos) -> Vec<EnvoyInstance> {
        self.envoys
            .iter()
            .filter(|entry| entry.value().is_in_chunk(world, chunk))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of the envoys in one world.
    pub fn instances_in_world(&self, world: &WorldId) -> Vec<EnvoyInstance> {
        self.envoys
            .iter()
            .filter(|entry| &entry.value().world == world)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.envoys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envoys.is_empty()
    }
}
