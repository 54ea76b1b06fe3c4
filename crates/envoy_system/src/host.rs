//! # Host Interfaces
//!
//! The envoy system never touches players, chunks or text rendering itself.
//! Everything it needs from the game server goes through the narrow traits
//! in this module, bundled into [`HostServices`] when the lifecycle manager
//! is built.
//!
//! | Trait | Calls made by the core |
//! |---|---|
//! | [`Broadcaster`] | server-wide chat broadcasts |
//! | [`MarkerPresenter`] | render / destroy the floating envoy marker |
//! | [`RewardIssuer`] | grant a reward to the claiming player |
//! | [`WorldView`] | whether a chunk is currently loaded |
//! | [`Clock`] | wall-clock seconds for envoy ages |

use std::sync::Arc;

use crate::error::RewardResult;
use crate::types::{BlockPos, ChunkPos, EnvoyInstance, EnvoyTag, PlayerId, Reward, WorldId};

/// Sends a message to every connected player.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, message: &str);
}

/// Renders and destroys the visual marker of an envoy.
///
/// The presenter owns all rendering state; the core only says when.
pub trait MarkerPresenter: Send + Sync {
    fn render(&self, world: &WorldId, position: BlockPos, text: &str, tag: EnvoyTag);

    /// Destroying an unknown tag must be a no-op.
    fn destroy(&self, tag: EnvoyTag);
}

/// Grants the reward for a claimed envoy.
pub trait RewardIssuer: Send + Sync {
    fn issue(&self, actor: PlayerId, envoy: &EnvoyInstance) -> RewardResult<Reward>;
}

/// Read-only view of the host's chunk loading state.
pub trait WorldView: Send + Sync {
    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool;
}

/// Source of Unix timestamps in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock backed by [`std::time::SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        current_timestamp()
    }
}

/// Returns the current Unix timestamp in seconds.
///
/// A clock set before the epoch reads as zero instead of panicking.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Every host collaborator the lifecycle manager calls into.
#[derive(Clone)]
pub struct HostServices {
    pub broadcaster: Arc<dyn Broadcaster>,
    pub markers: Arc<dyn MarkerPresenter>,
    pub rewards: Arc<dyn RewardIssuer>,
    pub world: Arc<dyn WorldView>,
    pub clock: Arc<dyn Clock>,
}

impl HostServices {
    /// Bundles the collaborators, using the system clock.
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        markers: Arc<dyn MarkerPresenter>,
        rewards: Arc<dyn RewardIssuer>,
        world: Arc<dyn WorldView>,
    ) -> Self {
        Self {
            broadcaster,
            markers,
            rewards,
            world,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
