//! # Host Events
//!
//! Events the game server delivers to the envoy system. Each event kind has
//! its own method on [`EnvoyEventHandler`]; hosts that receive events as
//! JSON can deserialize a [`HostEvent`] and route it with [`dispatch`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::claim::ClaimResult;
use crate::types::{BlockPos, ChunkPos, PlayerId, WorldId};

/// A player interacted with (tapped, clicked) a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInteractEvent {
    pub player_id: PlayerId,
    pub world: WorldId,
    pub position: BlockPos,
}

/// A chunk finished loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkLoadEvent {
    pub world: WorldId,
    pub chunk: ChunkPos,
}

/// A chunk is about to unload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkUnloadEvent {
    pub world: WorldId,
    pub chunk: ChunkPos,
}

/// A whole world is about to unload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldUnloadEvent {
    pub world: WorldId,
}

/// An entity moved, possibly between worlds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTeleportEvent {
    pub entity_id: u64,
    pub from_world: WorldId,
    pub to_world: WorldId,
}

impl EntityTeleportEvent {
    pub fn changes_world(&self) -> bool {
        self.from_world != self.to_world
    }
}

/// What the host must do after a player interaction.
#[derive(Debug)]
pub struct InteractResponse {
    /// Suppress the host's default handling of the interaction.
    pub cancel: bool,
    pub result: ClaimResult,
}

impl From<ClaimResult> for InteractResponse {
    fn from(result: ClaimResult) -> Self {
        Self {
            cancel: result.cancels_interaction(),
            result,
        }
    }
}

/// One method per event kind the host delivers.
#[async_trait]
pub trait EnvoyEventHandler: Send + Sync {
    /// Called once per second of game time.
    async fn on_tick(&self);

    async fn on_player_interact(&self, event: PlayerInteractEvent) -> InteractResponse;

    async fn on_chunk_load(&self, event: ChunkLoadEvent);

    async fn on_chunk_unload(&self, event: ChunkUnloadEvent);

    async fn on_world_unload(&self, event: WorldUnloadEvent);

    async fn on_entity_teleport(&self, event: EntityTeleportEvent);
}

/// Any host event, tagged by name for JSON transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Tick,
    PlayerInteract(PlayerInteractEvent),
    ChunkLoad(ChunkLoadEvent),
    ChunkUnload(ChunkUnloadEvent),
    WorldUnload(WorldUnloadEvent),
    EntityTeleport(EntityTeleportEvent),
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::Tick => "tick",
            HostEvent::PlayerInteract(_) => "player_interact",
            HostEvent::ChunkLoad(_) => "chunk_load",
            HostEvent::ChunkUnload(_) => "chunk_unload",
            HostEvent::WorldUnload(_) => "world_unload",
            HostEvent::EntityTeleport(_) => "entity_teleport",
        }
    }
}

/// Routes `event` to the matching handler method. Only interactions
/// produce a response.
pub async fn dispatch<H>(handler: &H, event: HostEvent) -> Option<InteractResponse>
where
    H: EnvoyEventHandler + ?Sized,
{
    match event {
        HostEvent::Tick => {
            handler.on_tick().await;
            None
        }
        HostEvent::PlayerInteract(event) => Some(handler.on_player_interact(event).await),
        HostEvent::ChunkLoad(event) => {
            handler.on_chunk_load(event).await;
            None
        }
        HostEvent::ChunkUnload(event) => {
            handler.on_chunk_unload(event).await;
            None
        }
        HostEvent::WorldUnload(event) => {
            handler.on_world_unload(event).await;
            None
        }
        HostEvent::EntityTeleport(event) => {
            handler.on_entity_teleport(event).await;
            None
        }
    }
}
