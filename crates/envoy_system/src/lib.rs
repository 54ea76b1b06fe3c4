//! # Envoy System
//!
//! Timed envoy reward drops for a persistent game world. A countdown
//! broadcasts warnings and periodically scatters claimable envoys across
//! configured spawn zones; players claim them by interacting with their
//! block, and the set of active envoys is saved whenever chunks or worlds
//! unload.
//!
//! ## Components
//!
//! - [`EnvoyStore`] - active envoys keyed by `(world, position)`
//! - [`CountdownController`] - per-tick countdown and announcement thresholds
//! - [`SpawnPlanner`] - random, duplicate-free wave placement
//! - [`ClaimResolver`] - at-most-once claiming with reward issuance
//! - [`PersistenceBridge`] - flush/restore through an [`EnvoyStorage`]
//! - [`EnvoyLifecycleManager`] - owns all of the above and implements
//!   [`EnvoyEventHandler`] for the host
//!
//! The host supplies a tick, the events in [`events`], and the collaborators
//! in [`host`]. Nothing here spawns threads or tasks of its own.

pub mod claim;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod host;
pub mod manager;
pub mod messages;
pub mod persistence;
pub mod spawn;
pub mod store;
pub mod types;

pub use claim::{ClaimResolver, ClaimResult};
pub use config::{EnvoyConfig, TeleportTeardown, DEFAULT_ANNOUNCE_THRESHOLDS};
pub use countdown::{format_time, CountdownController, CountdownStep};
pub use error::{
    ConfigError, ConfigResult, EnvoyError, EnvoyResult, RewardError, RewardResult, StorageError,
    StorageResult,
};
pub use events::{
    dispatch, ChunkLoadEvent, ChunkUnloadEvent, EntityTeleportEvent, EnvoyEventHandler, HostEvent,
    InteractResponse, PlayerInteractEvent, WorldUnloadEvent,
};
pub use host::{
    current_timestamp, Broadcaster, Clock, HostServices, MarkerPresenter, RewardIssuer,
    SystemClock, WorldView,
};
pub use manager::{EnvoyLifecycleManager, TickReport};
pub use messages::MessageTemplates;
pub use persistence::{
    EnvoySnapshot, EnvoyStorage, InMemoryEnvoyStorage, JsonEnvoyStorage, PersistenceBridge,
};
pub use spawn::{SpawnPlanner, WaveReport};
pub use store::EnvoyStore;
pub use types::{
    BlockPos, ChunkPos, EnvoyInstance, EnvoyKey, EnvoyTag, PlayerId, Reward, SpawnZone, WorldId,
};
