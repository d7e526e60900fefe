//! Symbol catalog: what a scan sees of compiled code.
//!
//! # Responsibility
//! - Model symbols, markers and namespace scopes.
//! - Hold units of symbols in memory or as JSON manifests.
//!
//! # Invariants
//! - Nothing outside this module inspects raw unit sources directly.

pub mod model;
pub mod store;
pub mod vocabulary;
