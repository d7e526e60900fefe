//! Whole-environment backend: every reachable unit, dependencies included.
//!
//! Loading runs arbitrary static initializers from third-party units, so every
//! per-symbol failure, panics included, is caught, recorded and skipped.

use crate::config::DetectorConfig;
use crate::failure::report_failures;
use crate::scan::error::ScanResult;
use crate::scan::session::OriginFilter;
use crate::scan::{load_matching, SymbolQueryBackend, SymbolSet};
use crate::symbol::model::{MarkerKind, Scope};
use crate::symbol::store::{SymbolEntry, SymbolStore};
use log::Level;
use std::sync::Arc;

const MODULE: &str = "scan.whole";

/// Scans local and dependency units.
#[derive(Debug, Clone)]
pub struct WholeEnvironmentBackend {
    store: Arc<SymbolStore>,
    config: DetectorConfig,
}

impl WholeEnvironmentBackend {
    pub fn new(store: Arc<SymbolStore>, config: DetectorConfig) -> Self {
        Self { store, config }
    }
}

impl SymbolQueryBackend for WholeEnvironmentBackend {
    fn find_by_supertype(&self, supertype: &str, scope: &Scope) -> ScanResult<SymbolSet> {
        let session = self.store.open_session(OriginFilter::All);
        let entries = session.list_types(scope)?;

        let (symbols, failures) = load_matching(entries, supertype, SymbolEntry::load_catching);
        report_failures(
            MODULE,
            &format!("symbols of type [{supertype}] in scope [{scope}]"),
            &failures,
            &self.config,
            Level::Warn,
        );
        Ok(symbols)
    }

    fn find_by_marker_and_supertype(
        &self,
        marker: MarkerKind,
        supertype: &str,
        scope: &Scope,
    ) -> ScanResult<SymbolSet> {
        let session = self.store.open_session(OriginFilter::All);
        let entries = session.list_marked(marker, scope)?;

        let (symbols, failures) = load_matching(entries, supertype, SymbolEntry::load_catching);
        report_failures(
            MODULE,
            &format!(
                "symbols marked [{}] of type [{supertype}] in scope [{scope}]",
                marker.qualified_name()
            ),
            &failures,
            &self.config,
            Level::Warn,
        );
        Ok(symbols)
    }

    fn label(&self) -> &'static str {
        "whole"
    }
}
