//! HTTP front end for Left-Center-Right games.
//!
//! Wraps [`lcr::LobbyManager`] in an axum router with bearer-token
//! authentication, request ids, structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
