//! crud-chaos client
//!
//! Wires [`chaos_core`] to a live service: reqwest transport, CLI,
//! tracing setup and interrupt handling.

#![allow(missing_docs)]

pub mod cli;
pub mod http;
pub mod signal;
pub mod telemetry;

pub use http::HttpTransport;
