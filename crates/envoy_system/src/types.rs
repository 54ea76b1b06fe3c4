//! # Core Type Definitions
//!
//! The value types shared by every envoy component: world and player
//! identifiers, block and chunk coordinates, and the [`EnvoyInstance`] record
//! itself.
//!
//! ## Key Types
//!
//! - [`WorldId`] - Name of the world (folder name on the host) an envoy lives in
//! - [`BlockPos`] - Discrete block coordinate inside a world
//! - [`ChunkPos`] - 16x16 column coordinate used for load/unload tracking
//! - [`EnvoyKey`] - Composite `(world, position)` key of the envoy store
//! - [`EnvoyTag`] - Correlates an instance with its visual marker
//! - [`EnvoyInstance`] - A claimable envoy placed by a spawn wave

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a world, as the host names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Unique identifier for a player in the game world.
///
/// A wrapper around UUID so player ids cannot be confused with envoy tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier linking an envoy instance to its marker.
///
/// Tags are generated fresh for every instance and never reused, so the
/// presentation layer can destroy a marker without knowing where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvoyTag(pub Uuid);

impl EnvoyTag {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EnvoyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "envoy-{}", self.0)
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// A discrete block coordinate inside a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the chunk column containing this block.
    ///
    /// Uses an arithmetic shift, so `x = -1` lands in chunk `-1`, not `0`.
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A 16x16 chunk column coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

// ============================================================================
// Envoys
// ============================================================================

/// Composite key of the envoy store. At most one envoy exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnvoyKey {
    pub world: WorldId,
    pub position: BlockPos,
}

impl EnvoyKey {
    pub fn new(world: impl Into<WorldId>, position: BlockPos) -> Self {
        Self {
            world: world.into(),
            position,
        }
    }
}

impl fmt::Display for EnvoyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.world, self.position)
    }
}

/// A claimable envoy placed by a spawn wave.
///
/// `created_at` is a Unix timestamp in seconds; it drives the despawn sweep
/// and survives persistence so restored envoys keep their original age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvoyInstance {
    pub world: WorldId,
    pub position: BlockPos,
    pub tag: EnvoyTag,
    pub created_at: u64,
}

impl EnvoyInstance {
    /// Creates an instance with a freshly generated tag.
    pub fn new(world: WorldId, position: BlockPos, created_at: u64) -> Self {
        Self {
            world,
            position,
            tag: EnvoyTag::generate(),
            created_at,
        }
    }

    pub fn key(&self) -> EnvoyKey {
        EnvoyKey {
            world: self.world.clone(),
            position: self.position,
        }
    }

    pub fn chunk(&self) -> ChunkPos {
        self.position.chunk()
    }

    /// Whether this instance sits inside the given chunk of the given world.
    pub fn is_in_chunk(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        &self.world == world && self.chunk() == chunk
    }

    /// Whether the instance has outlived `despawn_timer` seconds at `now`.
    ///
    /// A timer of zero never expires anything.
    pub fn is_expired(&self, now: u64, despawn_timer: u64) -> bool {
        despawn_timer > 0 && self.created_at.saturating_add(despawn_timer) <= now
    }
}

/// A spawn-eligible `(world, position)` candidate from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnZone {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SpawnZone {
    pub fn new(world: impl Into<WorldId>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    pub fn position(&self) -> BlockPos {
        BlockPos::new(self.x, self.y, self.z)
    }

    pub fn key(&self) -> EnvoyKey {
        EnvoyKey::new(self.world.clone(), self.position())
    }
}

/// A reward granted to a player for claiming an envoy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Identifier of the reward entry on the host side
    pub id: String,
    /// Human readable description used in messages
    pub description: String,
}

impl Reward {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}
