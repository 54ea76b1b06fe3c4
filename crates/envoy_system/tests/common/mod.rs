//! Recording host used by the integration tests.

#![allow(dead_code)]

use envoy_system::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const START_TIME: u64 = 1_700_000_000;

/// Implements every host trait and records what the core asked for.
pub struct RecordingHost {
    pub broadcasts: Mutex<Vec<String>>,
    pub markers: Mutex<HashMap<EnvoyTag, (WorldId, BlockPos, String)>>,
    pub destroyed: Mutex<Vec<EnvoyTag>>,
    pub rewards_issued: Mutex<Vec<(PlayerId, EnvoyTag)>>,
    pub loaded_chunks: Mutex<HashSet<(WorldId, ChunkPos)>>,
    pub rewards_fail: AtomicBool,
    pub now: AtomicU64,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            broadcasts: Mutex::new(Vec::new()),
            markers: Mutex::new(HashMap::new()),
            destroyed: Mutex::new(Vec::new()),
            rewards_issued: Mutex::new(Vec::new()),
            loaded_chunks: Mutex::new(HashSet::new()),
            rewards_fail: AtomicBool::new(false),
            now: AtomicU64::new(START_TIME),
        })
    }

    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices::new(self.clone(), self.clone(), self.clone(), self.clone())
            .with_clock(self.clone())
    }

    pub fn load_chunk(&self, world: &str, chunk: ChunkPos) {
        self.loaded_chunks
            .lock()
            .unwrap()
            .insert((WorldId::from(world), chunk));
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn visible_markers(&self) -> usize {
        self.markers.lock().unwrap().len()
    }

    pub fn has_marker(&self, tag: EnvoyTag) -> bool {
        self.markers.lock().unwrap().contains_key(&tag)
    }
}

impl Broadcaster for RecordingHost {
    fn broadcast(&self, message: &str) {
        self.broadcasts.lock().unwrap().push(message.to_string());
    }
}

impl MarkerPresenter for RecordingHost {
    fn render(&self, world: &WorldId, position: BlockPos, text: &str, tag: EnvoyTag) {
        self.markers
            .lock()
            .unwrap()
            .insert(tag, (world.clone(), position, text.to_string()));
    }

    fn destroy(&self, tag: EnvoyTag) {
        self.markers.lock().unwrap().remove(&tag);
        self.destroyed.lock().unwrap().push(tag);
    }
}

impl RewardIssuer for RecordingHost {
    fn issue(&self, actor: PlayerId, envoy: &EnvoyInstance) -> RewardResult<Reward> {
        if self.rewards_fail.load(Ordering::SeqCst) {
            return Err(RewardError::Delivery("inventory full".to_string()));
        }
        self.rewards_issued.lock().unwrap().push((actor, envoy.tag));
        Ok(Reward::new("golden_apple", "3x Golden Apple"))
    }
}

impl WorldView for RecordingHost {
    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        self.loaded_chunks
            .lock()
            .unwrap()
            .contains(&(world.clone(), chunk))
    }
}

impl Clock for RecordingHost {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Storage whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStorage;

#[async_trait::async_trait]
impl EnvoyStorage for FailingStorage {
    async fn save_all(&self, _envoys: &[EnvoyInstance]) -> StorageResult<()> {
        Err(StorageError::FileWrite(
            "envoys.json".into(),
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        ))
    }

    async fn load_all(&self) -> StorageResult<Vec<EnvoyInstance>> {
        Ok(Vec::new())
    }
}

/// `count` zones in `world`, one per chunk along the x axis.
pub fn zones(world: &str, count: i32) -> Vec<SpawnZone> {
    (0..count).map(|i| SpawnZone::new(world, i * 16 + 2, 64, 5)).collect()
}

pub fn config_with_zones(zones: Vec<SpawnZone>) -> EnvoyConfig {
    let max = zones.len().min(10);
    EnvoyConfig {
        zones,
        max_envoys: max,
        min_envoys: 1.min(max),
        ..Default::default()
    }
}
