//! Pipeline extension discovery.
//! Finds the steps, global variables and alias names contributed by compiled
//! symbols, so pipeline tests know which extension names exist without a host.

pub mod config;
pub mod detect;
pub mod failure;
pub mod logging;
pub mod scan;
pub mod symbol;

pub use config::{parse_expand_flag, DetectorConfig, FailureVerbosity, EXPAND_FAILURES_ENV};
pub use detect::category::ExtensionCategory;
pub use detect::detector::{Discovery, ExtensionDetector, ExtensionNames};
pub use failure::{FailureCause, FailureMap};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use scan::error::{ScanError, ScanResult};
pub use scan::local::LocalProjectBackend;
pub use scan::session::{OriginFilter, ScanSession};
pub use scan::whole::WholeEnvironmentBackend;
pub use scan::{SymbolQueryBackend, SymbolSet};
pub use symbol::model::{Constructor, Instance, Marker, MarkerKind, Scope, Symbol};
pub use symbol::store::{Initializer, Origin, SymbolEntry, SymbolStore, SymbolUnit};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
