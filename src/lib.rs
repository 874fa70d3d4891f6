//! Storage usage reconciliation for Swift-style object stores.
//!
//! Backends report usage at three independent tiers: the account stat, the
//! container stat, and the sum over an object listing. This crate enumerates
//! containers completely, aggregates and classifies what it finds, and
//! reports where the tiers disagree and why they might.
//!
//! - [`services::client`]: the `StorageClient` seam every backend implements
//! - [`services::enumerator`]: complete cursor pagination
//! - [`services::aggregator`], [`services::classifier`]: totals and backup sets
//! - [`services::reconciler`]: tier comparison with tolerance and cause tags
//! - [`services::prober`]: hidden-object prefix probes
//! - [`services::scan`], [`services::survey`]: orchestration
//! - [`services::inventory`]: SQLite snapshot backend

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
