//! Extension detector and aggregator.
//!
//! # Responsibility
//! - Turn backend symbol matches into extension names per category.
//! - Construct step and global-variable symbols to read their declared names.
//! - Union all categories for one scope.
//!
//! # Invariants
//! - A symbol that fails to construct or name itself is recorded and skipped;
//!   the operation still returns the remaining names.
//! - Alias names come from marker payloads; alias symbols are never constructed.
//! - Scan-engine errors propagate unchanged.

use crate::config::DetectorConfig;
use crate::detect::category::ExtensionCategory;
use crate::failure::{contain_symbol_panic, report_failures, FailureCause, FailureMap};
use crate::scan::error::ScanResult;
use crate::scan::{SymbolQueryBackend, SymbolSet};
use crate::symbol::model::{Constructor, Instance, Scope, Symbol};
use log::{debug, Level};
use std::collections::BTreeSet;

const MODULE: &str = "detect";

/// Deduplicated extension names.
pub type ExtensionNames = BTreeSet<String>;

/// Names found by one category scan, with the symbols that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub names: ExtensionNames,
    pub failures: FailureMap,
}

/// Category discovery built on one query backend.
#[derive(Debug, Clone)]
pub struct ExtensionDetector<B> {
    backend: B,
    config: DetectorConfig,
}

impl<B: SymbolQueryBackend> ExtensionDetector<B> {
    pub fn new(backend: B, config: DetectorConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scans one category without logging failures.
    ///
    /// # Errors
    /// - Propagates backend scan-engine failures.
    pub fn scan_category(
        &self,
        category: ExtensionCategory,
        scope: &Scope,
    ) -> ScanResult<Discovery> {
        let symbols =
            self.backend
                .find_by_marker_and_supertype(category.marker(), category.supertype(), scope)?;

        let discovery = match category.name_property() {
            Some(property) => named_by_instances(&symbols, property),
            None => Discovery {
                names: symbols
                    .values()
                    .flat_map(|symbol| symbol.alias_names())
                    .map(str::to_string)
                    .collect(),
                failures: FailureMap::new(),
            },
        };

        debug!(
            "event=extension_scan module={} status=ok backend={} category={} scope={} matched={} names={} failed={}",
            MODULE,
            self.backend.label(),
            category.as_str(),
            scope,
            symbols.len(),
            discovery.names.len(),
            discovery.failures.len()
        );
        Ok(discovery)
    }

    /// Names of every step in `scope`.
    pub fn get_steps(&self, scope: &Scope) -> ScanResult<ExtensionNames> {
        self.discover(ExtensionCategory::Step, scope)
    }

    /// Names of every global variable in `scope`.
    pub fn get_global_variables(&self, scope: &Scope) -> ScanResult<ExtensionNames> {
        self.discover(ExtensionCategory::GlobalVariable, scope)
    }

    /// Alias names declared in `scope`.
    pub fn get_alias_symbols(&self, scope: &Scope) -> ScanResult<ExtensionNames> {
        self.discover(ExtensionCategory::AliasSymbol, scope)
    }

    /// Union of steps, global variables and alias names in `scope`.
    pub fn get_all_extensions(&self, scope: &Scope) -> ScanResult<ExtensionNames> {
        let mut names = ExtensionNames::new();
        for category in ExtensionCategory::ALL {
            names.extend(self.discover(category, scope)?);
        }
        Ok(names)
    }

    fn discover(&self, category: ExtensionCategory, scope: &Scope) -> ScanResult<ExtensionNames> {
        let discovery = self.scan_category(category, scope)?;
        report_failures(
            MODULE,
            &format!("{} in scope [{scope}]", category.subject()),
            &discovery.failures,
            &self.config,
            Level::Error,
        );
        Ok(discovery.names)
    }
}

fn named_by_instances(symbols: &SymbolSet, property: &'static str) -> Discovery {
    symbols
        .values()
        .fold(Discovery::default(), |mut discovery, symbol| {
            match instance_name(symbol, property) {
                Ok(name) => {
                    discovery.names.insert(name);
                }
                Err(cause) => {
                    discovery.failures.insert(symbol.name().to_string(), cause);
                }
            }
            discovery
        })
}

fn instance_name(symbol: &Symbol, property: &'static str) -> Result<String, FailureCause> {
    let instance = construct(symbol)?;
    match instance.property(property) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(FailureCause::MissingName { property }),
    }
}

/// Default-constructs `symbol`, catching construction panics.
fn construct(symbol: &Symbol) -> Result<Instance, FailureCause> {
    match symbol.constructor() {
        Constructor::Declared(instance) => Ok(instance.clone()),
        Constructor::Missing(reason) => Err(FailureCause::Construct(reason.clone())),
        Constructor::Factory(factory) => {
            contain_symbol_panic(|| factory().map_err(FailureCause::Construct))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{construct, instance_name};
    use crate::failure::FailureCause;
    use crate::symbol::model::{Instance, Symbol};

    #[test]
    fn construct_reports_missing_constructor_reason() {
        let symbol = Symbol::new("org.example.Abstract").without_constructor("abstract symbol");
        assert_eq!(
            construct(&symbol).expect_err("abstract symbol cannot be constructed"),
            FailureCause::Construct("abstract symbol".to_string())
        );
    }

    #[test]
    fn construct_catches_factory_panics() {
        let symbol = Symbol::new("org.example.Jenkinsy")
            .with_factory(|| panic!("Jenkins.getInstance() returned null"));
        assert_eq!(
            construct(&symbol).expect_err("panicking factory must fail"),
            FailureCause::Panicked("Jenkins.getInstance() returned null".to_string())
        );
    }

    #[test]
    fn blank_names_are_failures() {
        let symbol = Symbol::new("org.example.Blank")
            .constructs(Instance::with_properties([("functionName", "  ")]));
        assert_eq!(
            instance_name(&symbol, "functionName").expect_err("blank name must fail"),
            FailureCause::MissingName {
                property: "functionName"
            }
        );
    }

    #[test]
    fn factory_instances_are_named() {
        let symbol = Symbol::new("org.example.Dynamic")
            .with_factory(|| Ok(Instance::with_properties([("name", "env")])));
        assert_eq!(
            instance_name(&symbol, "name").expect("factory instance should be named"),
            "env"
        );
    }
}
