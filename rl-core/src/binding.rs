//! Binding resolver
//!
//! Decides at setup whether entities can be created bound to a confirmed device.
//! When the coordinator has no device yet, or only one with a placeholder or
//! foreign name, the resolver requests one refresh and polls for a confirmed
//! name a bounded number of times before settling for generic, unbound entities.
//!
//! The decision logic is a pure state machine ([`BindingResolver::advance`]);
//! [`BindingResolver::resolve`] drives it against a coordinator with an injected
//! [`Sleeper`] so tests never wait on real time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::constants::binding::{MAX_ATTEMPTS, POLL_INTERVAL};
use crate::coordinator::Coordinator;
use rl_protocol::{DeviceIdentity, RENOGY_BT_PREFIX, UNKNOWN_NAME_PREFIX};

/// Pause abstraction for the polling loop
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What counts as a confirmed name, and how long to wait for one
#[derive(Debug, Clone, PartialEq)]
pub struct BindingPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub name_prefixes: Vec<String>,
    pub placeholder_prefix: String,
}

impl Default for BindingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            interval: POLL_INTERVAL,
            name_prefixes: vec![RENOGY_BT_PREFIX.to_string()],
            placeholder_prefix: UNKNOWN_NAME_PREFIX.to_string(),
        }
    }
}

impl BindingPolicy {
    /// Name is not a placeholder and carries an expected family prefix
    pub fn is_confirmed(&self, device: &DeviceIdentity) -> bool {
        !device.name.starts_with(&self.placeholder_prefix)
            && self
                .name_prefixes
                .iter()
                .any(|prefix| device.name.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingPhase {
    /// `attempt` polls done so far
    WaitingForName { attempt: u32 },
    ResolvedRealName(Arc<DeviceIdentity>),
    ResolvedGeneric,
}

impl BindingPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BindingPhase::WaitingForName { .. })
    }

    /// Device to bind entities to, if any
    pub fn device(&self) -> Option<&Arc<DeviceIdentity>> {
        match self {
            BindingPhase::ResolvedRealName(device) => Some(device),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingResolver {
    policy: BindingPolicy,
}

impl BindingResolver {
    pub fn new(policy: BindingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BindingPolicy {
        &self.policy
    }

    /// Phase before any waiting
    pub fn initial_phase(&self, device: Option<Arc<DeviceIdentity>>) -> BindingPhase {
        match device {
            Some(device) if self.policy.is_confirmed(&device) => {
                BindingPhase::ResolvedRealName(device)
            }
            _ => BindingPhase::WaitingForName { attempt: 0 },
        }
    }

    /// Phase after one more wait, given what the coordinator exposes now
    pub fn advance(
        &self,
        phase: BindingPhase,
        device: Option<Arc<DeviceIdentity>>,
    ) -> BindingPhase {
        let attempt = match phase {
            BindingPhase::WaitingForName { attempt } => attempt + 1,
            terminal => return terminal,
        };
        match device {
            Some(device) if self.policy.is_confirmed(&device) => {
                BindingPhase::ResolvedRealName(device)
            }
            _ if attempt >= self.policy.max_attempts => BindingPhase::ResolvedGeneric,
            _ => BindingPhase::WaitingForName { attempt },
        }
    }

    /// Run the wait protocol against `coordinator` until a terminal phase
    pub async fn resolve(
        &self,
        coordinator: &dyn Coordinator,
        sleeper: &dyn Sleeper,
    ) -> BindingPhase {
        let mut phase = self.initial_phase(coordinator.device());
        if phase.is_terminal() {
            return phase;
        }

        debug!("Waiting for real device name before creating entities");
        coordinator.request_refresh().await;

        if self.policy.max_attempts == 0 {
            return BindingPhase::ResolvedGeneric;
        }

        while !phase.is_terminal() {
            sleeper.sleep(self.policy.interval).await;
            phase = self.advance(phase, coordinator.device());
        }

        match &phase {
            BindingPhase::ResolvedRealName(device) => {
                debug!(name = %device.name, "Real device name found");
            }
            _ => info!(
                attempts = self.policy.max_attempts,
                "No real device name found, using generic name for entities"
            ),
        }
        phase
    }
}
