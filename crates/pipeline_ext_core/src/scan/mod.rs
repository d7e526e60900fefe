//! Symbol query backends.
//!
//! # Responsibility
//! - Answer "which symbols satisfy {supertype, optional marker} in a scope".
//! - Hide scan-engine quirks behind one trait with interchangeable backends.
//!
//! # Invariants
//! - Harness scaffolding symbols never appear in a result.
//! - An empty result is `Ok`; only scan-engine failures are `Err`.
//! - Per-symbol load failures are reported and skipped.

pub mod error;
pub mod local;
pub mod session;
pub mod whole;

use crate::failure::{FailureCause, FailureMap};
use crate::symbol::model::{MarkerKind, Scope, Symbol};
use crate::symbol::store::SymbolEntry;
use self::error::ScanResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Matched symbols keyed by qualified name.
pub type SymbolSet = BTreeMap<String, Arc<Symbol>>;

/// Capability shared by every scan backend.
pub trait SymbolQueryBackend {
    /// Every symbol in `scope` that is `supertype` or one of its subtypes.
    fn find_by_supertype(&self, supertype: &str, scope: &Scope) -> ScanResult<SymbolSet>;

    /// Symbols in `scope` carrying `marker` that are subtypes of `supertype`.
    fn find_by_marker_and_supertype(
        &self,
        marker: MarkerKind,
        supertype: &str,
        scope: &Scope,
    ) -> ScanResult<SymbolSet>;

    /// Short label used in logs.
    fn label(&self) -> &'static str;
}

impl<B: SymbolQueryBackend + ?Sized> SymbolQueryBackend for Box<B> {
    fn find_by_supertype(&self, supertype: &str, scope: &Scope) -> ScanResult<SymbolSet> {
        (**self).find_by_supertype(supertype, scope)
    }

    fn find_by_marker_and_supertype(
        &self,
        marker: MarkerKind,
        supertype: &str,
        scope: &Scope,
    ) -> ScanResult<SymbolSet> {
        (**self).find_by_marker_and_supertype(marker, supertype, scope)
    }

    fn label(&self) -> &'static str {
        (**self).label()
    }
}

/// Filters entries by supertype, then loads the survivors.
///
/// Scaffolding and non-matching entries are dropped from metadata alone, so
/// they are never loaded.
pub(crate) fn load_matching<L>(
    entries: Vec<SymbolEntry>,
    supertype: &str,
    load: L,
) -> (SymbolSet, FailureMap)
where
    L: Fn(&SymbolEntry) -> Result<Arc<Symbol>, FailureCause>,
{
    entries
        .into_iter()
        .filter(|entry| {
            let metadata = entry.metadata();
            !metadata.is_scaffolding() && metadata.is_subtype_of(supertype)
        })
        .fold(
            (SymbolSet::new(), FailureMap::new()),
            |(mut symbols, mut failures), entry| {
                match load(&entry) {
                    Ok(symbol) => {
                        symbols.insert(symbol.name().to_string(), symbol);
                    }
                    Err(cause) => {
                        failures.insert(entry.name().to_string(), cause);
                    }
                }
                (symbols, failures)
            },
        )
}
