//! Spawn wave planning: picks how many envoys to place and where.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use crate::store::EnvoyStore;
use crate::types::{EnvoyInstance, SpawnZone};

/// Result of registering a wave into the store.
#[derive(Debug, Clone, Default)]
pub struct WaveReport {
    /// Instances created by this wave.
    pub spawned: Vec<EnvoyInstance>,
    /// Unclaimed instances from earlier waves that were overwritten.
    pub replaced: Vec<EnvoyInstance>,
}

/// Draws spawn waves from the configured zones.
#[derive(Debug)]
pub struct SpawnPlanner {
    zones: Vec<SpawnZone>,
    min: usize,
    max: usize,
    rng: Mutex<StdRng>,
}

impl SpawnPlanner {
    pub fn new(zones: Vec<SpawnZone>, min: usize, max: usize) -> Self {
        Self::with_rng(zones, min, max, StdRng::from_entropy())
    }

    /// Planner with a fixed seed, for reproducible waves.
    pub fn with_seed(zones: Vec<SpawnZone>, min: usize, max: usize, seed: u64) -> Self {
        Self::with_rng(zones, min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(zones: Vec<SpawnZone>, min: usize, max: usize, rng: StdRng) -> Self {
        Self {
            zones,
            min,
            max,
            rng: Mutex::new(rng),
        }
    }

    pub fn zones(&self) -> &[SpawnZone] {
        &self.zones
    }

    /// Picks `k` in `[min, max]` (clamped to the zone count) and `k`
    /// distinct zones, and builds a fresh instance for each.
    pub fn plan_wave(&self, now: u64) -> Vec<EnvoyInstance> {
        let available = self.zones.len();
        let max = self.max.min(available);
        let min = self.min.min(max);

        // A poisoned lock only means another planner call panicked; the
        // generator state itself is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let count = rng.gen_range(min..=max);

        self.zones
            .choose_multiple(&mut *rng, count)
            .map(|zone| EnvoyInstance::new(zone.world.clone(), zone.position(), now))
            .collect()
    }

    /// Plans a wave and registers every instance into `store`.
    pub fn spawn_wave(&self, store: &EnvoyStore, now: u64) -> WaveReport {
        let mut report = WaveReport::default();

        for instance in self.plan_wave(now) {
            if let Some(previous) = store.insert(instance.clone()) {
                debug!("♻️ Envoy at {} replaced by new wave", previous.key());
                report.replaced.push(previous);
            }
            report.spawned.push(instance);
        }

        report
    }
}
