//! # Envoy Lifecycle Manager
//!
//! The one object a host constructs and feeds events into. It owns the
//! envoy store, the spawn countdown, the spawn planner, the claim resolver
//! and the persistence bridge, and calls back into the host through
//! [`HostServices`].
//!
//! ## Ordering
//!
//! A tick holds the countdown lock for its whole decrement, announce, spawn
//! and despawn sequence, so two ticks never interleave. Claims do not take
//! that lock: every removal (claim or despawn) goes through an atomic
//! per-key store operation, so an instance is consumed by at most one of
//! them. Every marker render is followed by a store check, so a claim that
//! lands between an insert and its render cannot leave a marker behind.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::claim::{ClaimResolver, ClaimResult};
use crate::config::{EnvoyConfig, TeleportTeardown};
use crate::countdown::{format_time, CountdownController, CountdownStep};
use crate::error::{ConfigResult, StorageResult};
use crate::events::{
    ChunkLoadEvent, ChunkUnloadEvent, EntityTeleportEvent, EnvoyEventHandler, InteractResponse,
    PlayerInteractEvent, WorldUnloadEvent,
};
use crate::host::HostServices;
use crate::messages::{self, GREEN};
use crate::persistence::{EnvoyStorage, PersistenceBridge};
use crate::spawn::{SpawnPlanner, WaveReport};
use crate::store::EnvoyStore;
use crate::types::{BlockPos, ChunkPos, EnvoyInstance, PlayerId, WorldId};

/// Summary of one tick, mostly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub step: CountdownStep,
    /// Countdown value after the tick
    pub remaining: u64,
    pub spawned: usize,
    pub despawned: usize,
}

pub struct EnvoyLifecycleManager {
    config: EnvoyConfig,
    store: Arc<EnvoyStore>,
    countdown: Mutex<CountdownController>,
    planner: SpawnPlanner,
    claims: ClaimResolver,
    persistence: PersistenceBridge,
    host: HostServices,
}

impl EnvoyLifecycleManager {
    /// Validates `config` and builds a manager. An invalid configuration
    /// is rejected here, before any tick runs.
    pub fn new(
        config: EnvoyConfig,
        host: HostServices,
        storage: Arc<dyn EnvoyStorage>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let planner = SpawnPlanner::new(config.zones.clone(), config.min_envoys, config.max_envoys);
        Ok(Self::assemble(config, host, storage, planner))
    }

    /// Like [`new`](Self::new) but with a seeded spawn planner, so wave
    /// sizes and placements are reproducible.
    pub fn with_seed(
        config: EnvoyConfig,
        host: HostServices,
        storage: Arc<dyn EnvoyStorage>,
        seed: u64,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let planner = SpawnPlanner::with_seed(
            config.zones.clone(),
            config.min_envoys,
            config.max_envoys,
            seed,
        );
        Ok(Self::assemble(config, host, storage, planner))
    }

    fn assemble(
        config: EnvoyConfig,
        host: HostServices,
        storage: Arc<dyn EnvoyStorage>,
        planner: SpawnPlanner,
    ) -> Self {
        let store = Arc::new(EnvoyStore::new());
        let countdown = CountdownController::new(
            config.spawn_interval,
            config.announce_thresholds.iter().copied(),
        );
        let claims = ClaimResolver::new(store.clone(), host.markers.clone(), host.rewards.clone());

        Self {
            config,
            store,
            countdown: Mutex::new(countdown),
            planner,
            claims,
            persistence: PersistenceBridge::new(storage),
            host,
        }
    }

    pub fn config(&self) -> &EnvoyConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<EnvoyStore> {
        &self.store
    }

    /// Seconds until the next wave.
    pub fn remaining(&self) -> u64 {
        self.countdown().remaining()
    }

    fn countdown(&self) -> MutexGuard<'_, CountdownController> {
        // The countdown is a plain counter; a panic elsewhere cannot leave
        // it half-updated.
        self.countdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restores persisted envoys (when `restore_on_start` is set) and
    /// renders those whose chunk is already loaded.
    pub async fn enable(&self) -> StorageResult<usize> {
        info!(
            "🚀 Envoys enabled: wave every {}, {}-{} envoys across {} zones",
            format_time(self.config.spawn_interval),
            self.config.min_envoys,
            self.config.max_envoys,
            self.config.zones.len()
        );

        if !self.config.restore_on_start {
            return Ok(0);
        }

        let restored = self.persistence.restore(&self.store).await?;
        for envoy in &restored {
            if self.host.world.is_chunk_loaded(&envoy.world, envoy.chunk()) {
                self.render(envoy);
            }
        }
        Ok(restored.len())
    }

    /// Flushes the store and tears down every marker.
    pub async fn disable(&self) -> StorageResult<usize> {
        self.destroy_markers(&self.store.all());
        let written = self.persistence.flush(&self.store).await?;
        info!("🛑 Envoys disabled, {} envoys saved", written);
        Ok(written)
    }

    // ------------------------------------------------------------------
    // Countdown
    // ------------------------------------------------------------------

    /// Advances the countdown one second, then sweeps expired envoys.
    pub fn tick(&self) -> TickReport {
        let mut countdown = self.countdown();
        let step = countdown.tick();
        let mut spawned = 0;

        match step {
            CountdownStep::Idle => {}
            CountdownStep::Announce { remaining } => {
                let time = format_time(remaining);
                debug!("⏳ Envoys spawn in {}", time);
                self.broadcast(messages::SPAWN_WARNING, &[("time", time.as_str())]);
            }
            CountdownStep::Expired => {
                spawned = self.spawn_wave().spawned.len();
                self.broadcast(messages::SPAWNED, &[]);
            }
        }

        let despawned = self.despawn_expired().len();

        TickReport {
            step,
            remaining: countdown.remaining(),
            spawned,
            despawned,
        }
    }

    /// Places a new wave right away, independent of the countdown.
    pub fn spawn_wave(&self) -> WaveReport {
        let report = self.planner.spawn_wave(&self.store, self.host.clock.now());

        self.destroy_markers(&report.replaced);
        for envoy in &report.spawned {
            if self.host.world.is_chunk_loaded(&envoy.world, envoy.chunk()) {
                self.render(envoy);
            }
        }

        info!(
            "📦 Spawned {} envoys ({} active)",
            report.spawned.len(),
            self.store.len()
        );
        report
    }

    /// Removes every envoy older than the despawn timer.
    pub fn despawn_expired(&self) -> Vec<EnvoyInstance> {
        let timer = self.config.despawn_timer;
        if timer == 0 {
            return Vec::new();
        }

        let now = self.host.clock.now();
        let expired: Vec<EnvoyInstance> = self
            .store
            .all()
            .into_iter()
            .filter(|envoy| envoy.is_expired(now, timer))
            // Re-checked under the shard lock: a claim may have won the race.
            .filter_map(|envoy| {
                self.store
                    .remove_if(&envoy.key(), |current| current.is_expired(now, timer))
            })
            .collect();

        if !expired.is_empty() {
            self.destroy_markers(&expired);
            info!("⌛ Despawned {} expired envoys", expired.len());
        }
        expired
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    pub fn try_claim(&self, world: &WorldId, position: BlockPos, actor: PlayerId) -> ClaimResult {
        let result = self.claims.try_claim(world, position, actor);

        if let ClaimResult::Success { reward, .. } = &result {
            if !self.config.messages.template(messages::CLAIMED).is_empty() {
                let player = actor.to_string();
                self.broadcast(
                    messages::CLAIMED,
                    &[
                        ("player", player.as_str()),
                        ("reward", reward.description.as_str()),
                    ],
                );
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Renders every envoy inside the chunk. Returns how many were rendered.
    pub fn render_chunk(&self, world: &WorldId, chunk: ChunkPos) -> usize {
        let envoys = self.store.instances_in(world, chunk);
        for envoy in &envoys {
            self.render(envoy);
        }
        envoys.len()
    }

    pub fn destroy_markers(&self, envoys: &[EnvoyInstance]) {
        for envoy in envoys {
            self.host.markers.destroy(envoy.tag);
        }
    }

    fn render(&self, envoy: &EnvoyInstance) {
        let despawn = format_time(self.config.despawn_timer);
        let text = self
            .config
            .messages
            .format(messages::MARKER, &[("despawn", despawn.as_str())]);
        self.host
            .markers
            .render(&envoy.world, envoy.position, &text, envoy.tag);

        // A claim or despawn that removed the envoy before the marker
        // existed has already run its destroy; tear the marker down here.
        if !self.store.holds(envoy) {
            debug!("Envoy {} left the store while rendering", envoy.tag);
            self.host.markers.destroy(envoy.tag);
        }
    }

    fn broadcast(&self, key: &str, replacements: &[(&str, &str)]) {
        let message = self.config.messages.format(key, replacements);
        self.host.broadcaster.broadcast(&format!("{GREEN}{message}"));
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub async fn flush(&self) -> StorageResult<usize> {
        self.persistence.flush(&self.store).await
    }

    /// Flushes, logging instead of failing. In-memory state stays
    /// authoritative until the next successful flush.
    async fn flush_or_log(&self, reason: &str) {
        match self.flush().await {
            Ok(count) => debug!("💾 Saved {} envoys ({})", count, reason),
            Err(e) => error!("❌ Failed to save envoys ({}): {}", reason, e),
        }
    }
}

impl std::fmt::Debug for EnvoyLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvoyLifecycleManager")
            .field("active_envoys", &self.store.len())
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EnvoyEventHandler for EnvoyLifecycleManager {
    async fn on_tick(&self) {
        self.tick();
    }

    async fn on_player_interact(&self, event: PlayerInteractEvent) -> InteractResponse {
        self.try_claim(&event.world, event.position, event.player_id).into()
    }

    async fn on_chunk_load(&self, event: ChunkLoadEvent) {
        let rendered = self.render_chunk(&event.world, event.chunk);
        if rendered > 0 {
            debug!(
                "Rendered {} envoys in {} chunk ({}, {})",
                rendered, event.world, event.chunk.x, event.chunk.z
            );
        }
    }

    async fn on_chunk_unload(&self, event: ChunkUnloadEvent) {
        self.destroy_markers(&self.store.instances_in(&event.world, event.chunk));
        self.flush_or_log("chunk unload").await;
    }

    async fn on_world_unload(&self, event: WorldUnloadEvent) {
        self.destroy_markers(&self.store.instances_in_world(&event.world));
        self.flush_or_log("world unload").await;
    }

    async fn on_entity_teleport(&self, event: EntityTeleportEvent) {
        if !event.changes_world() {
            return;
        }

        let envoys = match self.config.teleport_teardown {
            TeleportTeardown::Global => self.store.all(),
            TeleportTeardown::OriginWorld => self.store.instances_in_world(&event.from_world),
        };
        if !envoys.is_empty() {
            debug!(
                "Entity {} left {} for {}, tearing down {} envoy markers",
                event.entity_id,
                event.from_world,
                event.to_world,
                envoys.len()
            );
        }
        self.destroy_markers(&envoys);
    }
}
