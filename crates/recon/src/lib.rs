//! `panelscan-recon` — Pure reconciliation engine.
//!
//! Compares a zone's extracted readings against the active standard preset
//! and classifies each field. No IO, no clocks, no shared state: given the
//! same record and preset, [`reconcile`] always returns the same map, so
//! every classification rule is unit-testable in isolation.

pub mod engine;
pub mod model;

pub use engine::{reconcile, reconcile_all, TOLERANCE};
pub use model::{Classification, Comparison};
