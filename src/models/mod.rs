//! Data models for the usage reconciler.
//!
//! Listing snapshots and reported stats come in from the storage client;
//! backup sets, reports and surveys go out to the presentation layer. All of
//! them serialize naturally as JSON via `serde`.

pub mod backup_set;
pub mod container;
pub mod object;
pub mod probe;
pub mod report;
pub mod scan;
pub mod survey;
