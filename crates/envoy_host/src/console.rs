//! # Console Host
//!
//! A host adapter with no game server behind it. Broadcasts and marker
//! changes go to stdout, markers and loaded chunks are tracked in
//! concurrent maps, and rewards are drawn from the configured pool. Host
//! events arrive as JSON lines, one [`HostEvent`] per line.

use anyhow::{Context, Result};
use dashmap::{DashMap, DashSet};
use envoy_system::{
    dispatch, BlockPos, Broadcaster, ChunkPos, ClaimResult, EnvoyEventHandler, EnvoyInstance,
    EnvoyTag, HostEvent, HostServices, InteractResponse, MarkerPresenter, PlayerId, Reward,
    RewardError, RewardIssuer, RewardResult, WorldId, WorldView,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Marker currently shown by the console host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMarker {
    pub world: WorldId,
    pub position: BlockPos,
    pub text: String,
}

impl std::fmt::Display for ConsoleMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} {:?}", self.world, self.position, self.text)
    }
}

pub struct ConsoleHost {
    markers: DashMap<EnvoyTag, ConsoleMarker>,
    loaded_chunks: DashSet<(WorldId, ChunkPos)>,
    reward_pool: Vec<String>,
    rng: Mutex<StdRng>,
    /// Print broadcasts to stdout (disabled in tests)
    echo: bool,
}

impl ConsoleHost {
    pub fn new(reward_pool: Vec<String>) -> Arc<Self> {
        Arc::new(Self::build(reward_pool, StdRng::from_entropy(), true))
    }

    /// Quiet host with a seeded reward draw.
    #[cfg(test)]
    pub fn with_seed(reward_pool: Vec<String>, seed: u64) -> Arc<Self> {
        Arc::new(Self::build(reward_pool, StdRng::seed_from_u64(seed), false))
    }

    fn build(reward_pool: Vec<String>, rng: StdRng, echo: bool) -> Self {
        Self {
            markers: DashMap::new(),
            loaded_chunks: DashSet::new(),
            reward_pool,
            rng: Mutex::new(rng),
            echo,
        }
    }

    /// The collaborators the lifecycle manager needs, all backed by this host.
    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    #[cfg(test)]
    pub fn marker(&self, tag: EnvoyTag) -> Option<ConsoleMarker> {
        self.markers.get(&tag).map(|entry| entry.value().clone())
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.loaded_chunks.len()
    }

    /// Parses one input line and routes it to `handler`.
    ///
    /// Blank lines are skipped. Chunk bookkeeping happens around the
    /// dispatch: a chunk counts as loaded before its load event is handled
    /// and stays loaded until its unload event has been handled.
    pub async fn handle_line<H>(&self, handler: &H, line: &str) -> Result<Option<InteractResponse>>
    where
        H: EnvoyEventHandler + ?Sized,
    {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let event: HostEvent =
            serde_json::from_str(line).with_context(|| format!("Invalid host event: {line}"))?;
        debug!("📨 Host event: {}", event.name());

        if let HostEvent::ChunkLoad(load) = &event {
            self.loaded_chunks.insert((load.world.clone(), load.chunk));
        }
        let unloading = match &event {
            HostEvent::ChunkUnload(unload) => Some((unload.world.clone(), Some(unload.chunk))),
            HostEvent::WorldUnload(unload) => Some((unload.world.clone(), None)),
            _ => None,
        };

        let response = dispatch(handler, event).await;

        match unloading {
            Some((world, Some(chunk))) => {
                self.loaded_chunks.remove(&(world, chunk));
            }
            Some((world, None)) => self.loaded_chunks.retain(|(loaded, _)| *loaded != world),
            None => {}
        }

        if let Some(response) = &response {
            self.print(&describe_response(response));
        }
        debug!(
            "{} markers shown, {} chunks loaded",
            self.marker_count(),
            self.loaded_chunk_count()
        );
        Ok(response)
    }

    fn print(&self, line: &str) {
        if self.echo {
            println!("{line}");
        }
    }
}

impl std::fmt::Debug for ConsoleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleHost")
            .field("markers", &self.markers.len())
            .field("loaded_chunks", &self.loaded_chunks.len())
            .field("reward_pool", &self.reward_pool)
            .finish_non_exhaustive()
    }
}

/// One-line summary of an interaction outcome, as printed to stdout.
pub fn describe_response(response: &InteractResponse) -> String {
    let outcome = match &response.result {
        ClaimResult::Success { envoy, reward } => {
            format!("claimed {} at {}", reward.description, envoy.key())
        }
        ClaimResult::RewardFailed { envoy, error } => {
            format!("claimed {} without reward: {}", envoy.key(), error)
        }
        ClaimResult::NotAnEnvoy => "no envoy".to_string(),
    };
    format!("interact cancel={} {}", response.cancel, outcome)
}

impl Broadcaster for ConsoleHost {
    fn broadcast(&self, message: &str) {
        info!("📢 {}", message);
        self.print(message);
    }
}

impl MarkerPresenter for ConsoleHost {
    fn render(&self, world: &WorldId, position: BlockPos, text: &str, tag: EnvoyTag) {
        let marker = ConsoleMarker {
            world: world.clone(),
            position,
            text: text.to_string(),
        };
        debug!("Marker {} shown at {}", tag, marker);
        self.print(&format!("marker + {tag} {marker}"));
        self.markers.insert(tag, marker);
    }

    fn destroy(&self, tag: EnvoyTag) {
        if self.markers.remove(&tag).is_some() {
            debug!("Marker {} removed", tag);
            self.print(&format!("marker - {tag}"));
        }
    }
}

impl RewardIssuer for ConsoleHost {
    fn issue(&self, actor: PlayerId, envoy: &EnvoyInstance) -> RewardResult<Reward> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(item) = self.reward_pool.choose(&mut *rng) else {
            warn!("🎁 No reward for {} at {}: pool is empty", actor, envoy.key());
            return Err(RewardError::EmptyPool);
        };
        Ok(Reward::new(item.clone(), item.clone()))
    }
}

impl WorldView for ConsoleHost {
    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        self.loaded_chunks.contains(&(world.clone(), chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envoy_system::{EnvoyConfig, EnvoyLifecycleManager, InMemoryEnvoyStorage, SpawnZone};

    fn setup(pool: &[&str]) -> (Arc<ConsoleHost>, EnvoyLifecycleManager) {
        let host = ConsoleHost::with_seed(pool.iter().map(|s| s.to_string()).collect(), 7);
        let config = EnvoyConfig {
            min_envoys: 1,
            max_envoys: 1,
            zones: vec![SpawnZone::new("world1", 10, 64, 20)],
            ..Default::default()
        };
        let manager = EnvoyLifecycleManager::new(
            config,
            host.services(),
            Arc::new(InMemoryEnvoyStorage::new()),
        )
        .unwrap();
        (host, manager)
    }

    const INTERACT: &str = concat!(
        r#"{"event":"player_interact","#,
        r#""player_id":"550e8400-e29b-41d4-a716-446655440000","#,
        r#""world":"world1","position":{"x":10,"y":64,"z":20}}"#,
    );

    #[tokio::test]
    async fn test_chunk_events_track_loaded_chunks() {
        let (host, manager) = setup(&["1x Diamond"]);
        let envoy = manager.spawn_wave().spawned[0].clone();
        assert_eq!(host.marker_count(), 0);

        let load = r#"{"event":"chunk_load","world":"world1","chunk":{"x":0,"z":1}}"#;
        host.handle_line(&manager, load).await.unwrap();
        assert_eq!(host.loaded_chunk_count(), 1);
        let marker = host.marker(envoy.tag).unwrap();
        assert_eq!(marker.position, BlockPos::new(10, 64, 20));
        assert!(marker.text.starts_with("§l§bEnvoy"));

        let unload = r#"{"event":"chunk_unload","world":"world1","chunk":{"x":0,"z":1}}"#;
        host.handle_line(&manager, unload).await.unwrap();
        assert_eq!(host.loaded_chunk_count(), 0);
        assert_eq!(host.marker_count(), 0);
    }

    #[tokio::test]
    async fn test_world_unload_forgets_chunks() {
        let (host, manager) = setup(&["1x Diamond"]);
        for line in [
            r#"{"event":"chunk_load","world":"world1","chunk":{"x":0,"z":1}}"#,
            r#"{"event":"chunk_load","world":"world1","chunk":{"x":3,"z":1}}"#,
            r#"{"event":"chunk_load","world":"nether","chunk":{"x":0,"z":0}}"#,
        ] {
            host.handle_line(&manager, line).await.unwrap();
        }
        assert_eq!(host.loaded_chunk_count(), 3);

        host.handle_line(&manager, r#"{"event":"world_unload","world":"world1"}"#)
            .await
            .unwrap();
        assert_eq!(host.loaded_chunk_count(), 1);
        assert!(host.is_chunk_loaded(&WorldId::from("nether"), ChunkPos::new(0, 0)));
    }

    #[tokio::test]
    async fn test_interact_draws_from_pool() {
        let (host, manager) = setup(&["1x Diamond"]);
        manager.spawn_wave();

        let response = host.handle_line(&manager, INTERACT).await.unwrap().unwrap();
        assert!(response.cancel);
        match &response.result {
            ClaimResult::Success { reward, .. } => assert_eq!(reward.description, "1x Diamond"),
            other => panic!("unexpected claim result {other:?}"),
        }
        assert_eq!(
            describe_response(&response),
            "interact cancel=true claimed 1x Diamond at world1@(10, 64, 20)"
        );

        let again = host.handle_line(&manager, INTERACT).await.unwrap().unwrap();
        assert!(!again.cancel);
        assert_eq!(describe_response(&again), "interact cancel=false no envoy");
    }

    #[tokio::test]
    async fn test_empty_pool_still_consumes_envoy() {
        let (host, manager) = setup(&[]);
        manager.spawn_wave();

        let response = host.handle_line(&manager, INTERACT).await.unwrap().unwrap();
        assert!(response.cancel);
        assert!(matches!(
            response.result,
            ClaimResult::RewardFailed {
                error: RewardError::EmptyPool,
                ..
            }
        ));
        assert!(manager.store().is_empty());
    }

    #[tokio::test]
    async fn test_tick_and_blank_lines() {
        let (host, manager) = setup(&["1x Diamond"]);
        assert!(host.handle_line(&manager, "   ").await.unwrap().is_none());
        assert!(host
            .handle_line(&manager, r#"{"event":"tick"}"#)
            .await
            .unwrap()
            .is_none());
        assert_eq!(manager.remaining(), 299);
    }

    #[tokio::test]
    async fn test_invalid_line_is_an_error() {
        let (host, manager) = setup(&["1x Diamond"]);
        let error = host.handle_line(&manager, "not json").await.unwrap_err();
        assert!(error.to_string().contains("Invalid host event"));
        assert_eq!(manager.remaining(), 300);
    }
}
