//! Chaos Core - stateful chaos scheduling for CRUD APIs
//!
//! Keeps an approximate registry of remote entity ids and drives a biased
//! mix of valid and error-inducing requests against a resource collection:
//! - [`EntityRegistry`]: client-local view of which ids exist
//! - [`OperationKind`] / [`Operation`]: the two operation catalogues
//! - [`ChaosScheduler`]: refresh, select, plan, send, reconcile
//! - [`ChaosRunner`]: warm-up, paced loop, cooperative stop
//!
//! # Example
//!
//! ```rust,ignore
//! use chaos_core::prelude::*;
//!
//! let config = ChaosConfig::new().with_seed(42).with_max_requests(100);
//! config.validate()?;
//!
//! let stop = StopSignal::new();
//! let report = ChaosRunner::from_config(transport, &config).run(stop).await;
//! println!("{}", report.generate_text());
//! ```

#![allow(missing_docs)]

// Core modules
pub mod catalogue;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod operation;
pub mod outcome;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod state_machine;
pub mod stats;
pub mod transport;
pub mod types;

// Re-exports
pub use config::ChaosConfig;
pub use endpoint::Endpoint;
pub use error::{ConfigError, StateMachineError, TransportError};
pub use operation::{Intent, Operation, OperationKind, Plan};
pub use outcome::{Outcome, OutcomeClass};
pub use registry::EntityRegistry;
pub use runner::{ChaosRunner, Pacing, RunReport, StopReason, StopSignal};
pub use scheduler::{ChaosScheduler, Iteration};
pub use state_machine::RunState;
pub use stats::{OperationTally, RunStats};
pub use transport::Transport;
pub use types::{EntityId, Method, Request, RequestBody, Response};

/// Common imports for driving a chaos run
pub mod prelude {
    pub use crate::{
        ChaosConfig, ChaosRunner, ChaosScheduler, EntityId, EntityRegistry, Endpoint, Outcome,
        OperationKind, RunReport, StopSignal, Transport, TransportError,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
