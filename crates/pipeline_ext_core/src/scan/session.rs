//! Scan sessions over a symbol store.
//!
//! # Responsibility
//! - Give backends a scoped handle for listing catalog entries.
//! - Release the handle on every exit path, including unwinding.
//!
//! # Invariants
//! - Each listing re-reads the admitted units; sessions hold no index.
//! - `index_all_types` reports an empty index as an engine error, the same way
//!   reflection-based subtype indexers do.

use crate::scan::error::{ScanError, ScanResult, EMPTY_INDEX_MESSAGE};
use crate::symbol::model::{MarkerKind, Scope};
use crate::symbol::store::{Origin, SymbolEntry, SymbolStore};
use log::debug;

/// Which unit origins a session can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginFilter {
    LocalOnly,
    All,
}

impl OriginFilter {
    pub fn admits(self, origin: Origin) -> bool {
        match self {
            Self::LocalOnly => origin == Origin::Local,
            Self::All => true,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::LocalOnly => "local",
            Self::All => "all",
        }
    }
}

/// Open scan handle; released when dropped.
#[derive(Debug)]
pub struct ScanSession<'s> {
    store: &'s SymbolStore,
    origins: OriginFilter,
}

impl<'s> ScanSession<'s> {
    pub(crate) fn new(store: &'s SymbolStore, origins: OriginFilter) -> Self {
        debug!(
            "event=scan_session module=scan status=open origins={}",
            origins.as_str()
        );
        Self { store, origins }
    }

    /// Subtype-index listing of every entry in `scope`.
    ///
    /// # Errors
    /// - `ScanError::Engine` with `EMPTY_INDEX_MESSAGE` when nothing is indexed.
    /// - Manifest read/parse failures.
    pub fn index_all_types(&self, scope: &Scope) -> ScanResult<Vec<SymbolEntry>> {
        let entries = self.list_types(scope)?;
        if entries.is_empty() {
            return Err(ScanError::engine(EMPTY_INDEX_MESSAGE));
        }
        Ok(entries)
    }

    /// Every entry in `scope`; empty when nothing matches.
    pub fn list_types(&self, scope: &Scope) -> ScanResult<Vec<SymbolEntry>> {
        self.collect(scope, |_| true)
    }

    /// Entries in `scope` whose metadata carries `marker`.
    pub fn list_marked(&self, marker: MarkerKind, scope: &Scope) -> ScanResult<Vec<SymbolEntry>> {
        self.collect(scope, |entry| entry.metadata().has_marker(marker))
    }

    fn collect(
        &self,
        scope: &Scope,
        predicate: impl Fn(&SymbolEntry) -> bool,
    ) -> ScanResult<Vec<SymbolEntry>> {
        let units = self.store.read_units(self.origins)?;
        Ok(units
            .iter()
            .flat_map(|unit| unit.entries().iter())
            .filter(|entry| scope.contains(entry.name()) && predicate(*entry))
            .cloned()
            .collect())
    }
}

impl Drop for ScanSession<'_> {
    fn drop(&mut self) {
        self.store.release_session();
        debug!(
            "event=scan_session module=scan status=released origins={}",
            self.origins.as_str()
        );
    }
}
