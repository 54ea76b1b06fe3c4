//! At-most-once claiming of envoys by players.

use std::sync::Arc;
use tracing::{error, info};

use crate::error::RewardError;
use crate::host::{MarkerPresenter, RewardIssuer};
use crate::store::EnvoyStore;
use crate::types::{BlockPos, EnvoyInstance, PlayerId, Reward, WorldId};

/// Outcome of a claim attempt.
#[derive(Debug)]
pub enum ClaimResult {
    /// The envoy was consumed and the reward delivered.
    Success {
        envoy: EnvoyInstance,
        reward: Reward,
    },
    /// The envoy was consumed but the reward collaborator failed. The
    /// removal is not rolled back.
    RewardFailed {
        envoy: EnvoyInstance,
        error: RewardError,
    },
    /// No envoy at that position, nothing changed.
    NotAnEnvoy,
}

impl ClaimResult {
    /// Whether the host must suppress its default handling of the
    /// interaction. True whenever the position held an envoy, whatever
    /// happened to the reward.
    pub fn cancels_interaction(&self) -> bool {
        !matches!(self, ClaimResult::NotAnEnvoy)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ClaimResult::Success { .. })
    }

    pub fn envoy(&self) -> Option<&EnvoyInstance> {
        match self {
            ClaimResult::Success { envoy, .. } | ClaimResult::RewardFailed { envoy, .. } => {
                Some(envoy)
            }
            ClaimResult::NotAnEnvoy => None,
        }
    }
}

#[derive(Clone)]
pub struct ClaimResolver {
    store: Arc<EnvoyStore>,
    markers: Arc<dyn MarkerPresenter>,
    rewards: Arc<dyn RewardIssuer>,
}

impl ClaimResolver {
    pub fn new(
        store: Arc<EnvoyStore>,
        markers: Arc<dyn MarkerPresenter>,
        rewards: Arc<dyn RewardIssuer>,
    ) -> Self {
        Self {
            store,
            markers,
            rewards,
        }
    }

    /// Claims the envoy at `(world, position)` for `actor`.
    ///
    /// The removal from the store is the commit point: of two concurrent
    /// attempts on the same key exactly one gets the instance, the other
    /// sees `NotAnEnvoy`.
    pub fn try_claim(&self, world: &WorldId, position: BlockPos, actor: PlayerId) -> ClaimResult {
        let Some(envoy) = self.store.remove(world, position) else {
            return ClaimResult::NotAnEnvoy;
        };

        self.markers.destroy(envoy.tag);

        match self.rewards.issue(actor, &envoy) {
            Ok(reward) => {
                info!(
                    "🎁 Player {} claimed envoy {} at {} ({})",
                    actor,
                    envoy.tag,
                    envoy.key(),
                    reward.description
                );
                ClaimResult::Success { envoy, reward }
            }
            Err(error) => {
                error!(
                    "❌ Player {} claimed envoy {} at {} but the reward failed: {}",
                    actor,
                    envoy.tag,
                    envoy.key(),
                    error
                );
                ClaimResult::RewardFailed { envoy, error }
            }
        }
    }
}

impl std::fmt::Debug for ClaimResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimResolver")
            .field("active_envoys", &self.store.len())
            .finish_non_exhaustive()
    }
}
