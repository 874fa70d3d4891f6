//! Reconciliation services, leaf-first: the client seam, enumeration,
//! aggregation, classification, reconciliation and probing, and the scans
//! and surveys that tie them together.

pub mod aggregator;
pub mod classifier;
pub mod client;
pub mod enumerator;
pub mod inventory;
pub mod prober;
pub mod reconciler;
pub mod retry;
pub mod scan;
pub mod survey;

#[cfg(test)]
pub(crate) mod testing;
