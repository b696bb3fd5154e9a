//! Ambient building blocks shared by Visage binaries: configuration loading,
//! tracing setup, health probes and request-id middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
