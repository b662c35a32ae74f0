//! parcboard: terminal dashboard for an equipment inventory.
//!
//! The core is [`status`] (label normalization) and [`metrics`] (pure
//! aggregation). [`api`] fetches observations from the inventory REST API,
//! [`dashboard`] runs one fetch-and-aggregate cycle, and [`cli`] renders it.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod status;
pub mod utils;
