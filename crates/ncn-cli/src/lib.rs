//! NCN command-line tooling
//!
//! Builds reward trees, checks claim proofs offline and runs whole ballot
//! and claim scenarios in-process against local effect handlers.

pub mod commands;
pub mod effects;
pub mod scenario;
