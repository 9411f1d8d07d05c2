//! Chaos scheduler
//!
//! One dispatch iteration:
//! 1. Refresh the registry from a list read
//! 2. Roll the valid/error coin, pick uniformly from that catalogue
//! 3. Plan, send, reconcile
//!
//! Nothing in an iteration can fail the caller. Every path ends in an
//! [`Outcome`].

use crate::config::{ChaosConfig, DEFAULT_VALID_RATIO};
use crate::endpoint::Endpoint;
use crate::operation::{Intent, OperationKind, Plan};
use crate::outcome::Outcome;
use crate::registry::EntityRegistry;
use crate::stats::RunStats;
use crate::transport::Transport;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Result of one dispatch iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
    pub refresh: Outcome,
    pub kind: OperationKind,
    pub outcome: Outcome,
}

/// Picks, issues and reconciles chaos operations
///
/// Owns the registry; nothing else holds a mutable view of it.
#[derive(Debug)]
pub struct ChaosScheduler<T> {
    transport: T,
    endpoint: Endpoint,
    registry: EntityRegistry,
    rng: StdRng,
    valid_ratio: f64,
    stats: RunStats,
}

impl<T: Transport> ChaosScheduler<T> {
    /// Scheduler with an empty registry and the default bias
    #[must_use]
    pub fn new(transport: T, endpoint: Endpoint, seed: u64) -> Self {
        Self {
            transport,
            endpoint,
            registry: EntityRegistry::new(),
            rng: StdRng::seed_from_u64(seed),
            valid_ratio: DEFAULT_VALID_RATIO,
            stats: RunStats::default(),
        }
    }

    /// Scheduler for a validated configuration
    #[must_use]
    pub fn from_config(transport: T, config: &ChaosConfig, seed: u64) -> Self {
        Self::new(transport, config.endpoint(), seed).with_valid_ratio(config.valid_ratio)
    }

    #[must_use]
    pub fn with_valid_ratio(mut self, ratio: f64) -> Self {
        self.valid_ratio = ratio;
        self
    }

    /// Start from a known registry instead of an empty one
    #[must_use]
    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[inline]
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Biased coin: valid with probability `valid_ratio`
    pub fn roll_intent(&mut self) -> Intent {
        if self.rng.gen::<f64>() < self.valid_ratio {
            Intent::Valid
        } else {
            Intent::Error
        }
    }

    /// Roll an intent and pick uniformly from its catalogue
    pub fn select(&mut self) -> OperationKind {
        let intent = self.roll_intent();
        self.stats.record_selection(intent);
        let catalogue = OperationKind::catalogue(intent);
        // catalogues are non-empty constants
        *catalogue.choose(&mut self.rng).unwrap_or(&catalogue[0])
    }

    /// Re-read the remote collection into the registry
    pub async fn refresh(&mut self) -> Outcome {
        let outcome = self.registry.refresh(&self.transport, &self.endpoint).await;
        self.stats.record_refresh(&outcome);
        outcome
    }

    /// Plan and issue one operation of the given kind
    pub async fn execute(&mut self, kind: OperationKind) -> Outcome {
        let outcome = match kind.plan(&self.registry, &mut self.rng) {
            Plan::Skip { kind, reason } => {
                tracing::warn!(op = %kind, reason, "Skipping operation");
                Outcome::Skipped { reason }
            }
            Plan::Ready(op) => {
                let request = op.request(&self.endpoint);
                tracing::debug!(op = %kind, request = %request, "Sending request");
                match self.transport.send(request).await {
                    Ok(response) => op.reconcile(response, &mut self.registry),
                    Err(e) => {
                        let target = op.target().map(|id| id.to_string()).unwrap_or_default();
                        tracing::error!(op = %kind, %target, error = %e, "Transport failure");
                        Outcome::TransportFailed(e)
                    }
                }
            }
        };
        self.stats.record(kind, &outcome);
        outcome
    }

    /// One full dispatch iteration
    pub async fn tick(&mut self) -> Iteration {
        let refresh = self.refresh().await;
        let kind = self.select();
        let outcome = self.execute(kind).await;
        self.stats.iterations += 1;
        Iteration {
            refresh,
            kind,
            outcome,
        }
    }
}
