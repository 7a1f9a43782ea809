//! Library crate for chug-board-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded at startup.
pub mod config;
/// Attempt and party persistence.
pub mod dao;
mod dto;
mod error;
/// Photo storage backends and URL resolution.
pub mod photos;
/// Pure ranking functions over attempt snapshots.
pub mod ranking;
/// HTTP route trees.
pub mod routes;
/// Request-level operations behind the routes.
pub mod services;
/// Shared application state.
pub mod state;
/// Stopwatch and clock sources.
pub mod timing;
