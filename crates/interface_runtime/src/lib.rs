//! Runtime Interface
//!
//! Composition root for the lifecycle engine: loads configuration from the
//! environment, initialises tracing, wires the adapter set into the
//! adjudication services and the scheduler, and exposes the handles the
//! `engined` binary runs.

pub mod config;
pub mod telemetry;
pub mod runtime;

pub use config::EngineConfig;
pub use runtime::{Engine, EngineTasks};
