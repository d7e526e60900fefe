//! Narrow-scope backend: symbols compiled by the build under test.
//!
//! # Responsibility
//! - Query only units with `Origin::Local`.
//! - Treat an empty local build as an empty result, not an error.
//!
//! # Invariants
//! - The empty-project case is recognized from the engine error message only
//!   (`ScanError::is_empty_universe`); every other engine error propagates.
//! - Initializer panics are not caught here; the session is still released.

use crate::config::DetectorConfig;
use crate::failure::report_failures;
use crate::scan::error::ScanResult;
use crate::scan::session::OriginFilter;
use crate::scan::{load_matching, SymbolQueryBackend, SymbolSet};
use crate::symbol::model::{MarkerKind, Scope};
use crate::symbol::store::{SymbolEntry, SymbolStore};
use log::{info, Level};
use std::sync::Arc;

const MODULE: &str = "scan.local";

/// Scans locally compiled units only.
#[derive(Debug, Clone)]
pub struct LocalProjectBackend {
    store: Arc<SymbolStore>,
    config: DetectorConfig,
}

impl LocalProjectBackend {
    pub fn new(store: Arc<SymbolStore>, config: DetectorConfig) -> Self {
        Self { store, config }
    }
}

impl SymbolQueryBackend for LocalProjectBackend {
    fn find_by_supertype(&self, supertype: &str, scope: &Scope) -> ScanResult<SymbolSet> {
        let session = self.store.open_session(OriginFilter::LocalOnly);
        let entries = match session.index_all_types(scope) {
            Ok(entries) => entries,
            Err(err) if err.is_empty_universe() => {
                info!(
                    "event=local_scan module={} status=empty scope={} reason=no_local_symbols",
                    MODULE, scope
                );
                return Ok(SymbolSet::new());
            }
            Err(err) => return Err(err),
        };

        let (symbols, failures) = load_matching(entries, supertype, SymbolEntry::load);
        report_failures(
            MODULE,
            &format!("symbols of type [{supertype}] in scope [{scope}]"),
            &failures,
            &self.config,
            Level::Error,
        );
        Ok(symbols)
    }

    fn find_by_marker_and_supertype(
        &self,
        marker: MarkerKind,
        supertype: &str,
        scope: &Scope,
    ) -> ScanResult<SymbolSet> {
        let session = self.store.open_session(OriginFilter::LocalOnly);
        let entries = session.list_marked(marker, scope)?;

        let (symbols, failures) = load_matching(entries, supertype, SymbolEntry::load);
        report_failures(
            MODULE,
            &format!(
                "symbols marked [{}] of type [{supertype}] in scope [{scope}]",
                marker.qualified_name()
            ),
            &failures,
            &self.config,
            Level::Error,
        );
        Ok(symbols)
    }

    fn label(&self) -> &'static str {
        "local"
    }
}
