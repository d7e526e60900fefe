//! Extension detection over a query backend.
//!
//! # Responsibility
//! - Map extension categories onto backend queries.
//! - Apply the failure-reporting policy once per category scan.
//!
//! # See also
//! - `scan` for the backends this module composes with.

pub mod category;
pub mod detector;
