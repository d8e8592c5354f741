//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, wiring, and the runtime lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`operator`] - CLI operator interface
//! - [`runtime`] - Scheduler entry point with graceful shutdown

pub mod bootstrap;
pub mod config;
pub mod operator;
pub mod runtime;
