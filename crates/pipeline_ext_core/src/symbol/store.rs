//! Symbol store: compiled units and their manifests.
//!
//! # Responsibility
//! - Hold the units a scan can reach, in memory or as JSON manifests on disk.
//! - Load individual symbols, running their static initializers.
//! - Count open scan sessions so leaked sessions are observable.
//!
//! # Invariants
//! - Manifest files are re-read on every scan; nothing is indexed between scans.
//! - Manifest I/O and parse failures are fatal scan errors, never per-symbol.

use crate::failure::{contain_symbol_panic, FailureCause};
use crate::scan::error::{ScanError, ScanResult};
use crate::scan::session::{OriginFilter, ScanSession};
use crate::symbol::model::{is_valid_qualified_name, Instance, Marker, Symbol};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Where a unit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Compiled by the build under test.
    Local,
    /// Shipped by a dependency.
    Dependency,
}

/// Static initialization callback.
pub type InitializerFn = dyn Fn() -> Result<(), String> + Send + Sync;

/// Static initialization behavior of one symbol.
#[derive(Clone)]
pub enum Initializer {
    Ready,
    Fails(String),
    Hook(Arc<InitializerFn>),
}

impl Debug for Initializer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::Fails(reason) => f.debug_tuple("Fails").field(reason).finish(),
            Self::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

/// Catalog slot: symbol metadata plus its static initializer.
///
/// Metadata (name, supertypes, markers) is readable without loading, the way
/// a class file can be indexed without initializing the class.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    symbol: Arc<Symbol>,
    initializer: Initializer,
}

impl SymbolEntry {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol: Arc::new(symbol),
            initializer: Initializer::Ready,
        }
    }

    pub fn failing(symbol: Symbol, reason: impl Into<String>) -> Self {
        Self {
            symbol: Arc::new(symbol),
            initializer: Initializer::Fails(reason.into()),
        }
    }

    pub fn with_initializer<F>(symbol: Symbol, hook: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            symbol: Arc::new(symbol),
            initializer: Initializer::Hook(Arc::new(hook)),
        }
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }

    /// Unloaded metadata view.
    pub fn metadata(&self) -> &Symbol {
        &self.symbol
    }

    /// Loads the symbol. Panics raised by an initializer hook propagate.
    pub fn load(&self) -> Result<Arc<Symbol>, FailureCause> {
        match &self.initializer {
            Initializer::Ready => Ok(Arc::clone(&self.symbol)),
            Initializer::Fails(reason) => Err(FailureCause::Load(reason.clone())),
            Initializer::Hook(hook) => hook()
                .map(|()| Arc::clone(&self.symbol))
                .map_err(FailureCause::Load),
        }
    }

    /// Loads the symbol, turning initializer panics into `FailureCause::Panicked`.
    pub fn load_catching(&self) -> Result<Arc<Symbol>, FailureCause> {
        contain_symbol_panic(|| self.load())
    }
}

/// Named group of symbols sharing one origin.
#[derive(Debug, Clone)]
pub struct SymbolUnit {
    name: String,
    origin: Origin,
    entries: Vec<SymbolEntry>,
}

impl SymbolUnit {
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            entries: Vec::new(),
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, Origin::Local)
    }

    pub fn dependency(name: impl Into<String>) -> Self {
        Self::new(name, Origin::Dependency)
    }

    /// Adds a symbol whose initializer always succeeds.
    pub fn with_symbol(self, symbol: Symbol) -> Self {
        self.with_entry(SymbolEntry::new(symbol))
    }

    pub fn with_entry(mut self, entry: SymbolEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Parses a JSON unit manifest.
    pub fn from_manifest_str(text: &str, origin: Origin, path: &Path) -> ScanResult<Self> {
        let manifest: ManifestFile =
            serde_json::from_str(text).map_err(|err| manifest_error(path, err.to_string()))?;
        manifest.into_unit(origin, path)
    }

    /// Reads and parses a JSON unit manifest from disk.
    pub fn read_manifest(path: &Path, origin: Origin) -> ScanResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_manifest_str(&text, origin, path)
    }
}

#[derive(Debug, Clone)]
enum UnitSource {
    Memory(SymbolUnit),
    Manifest { path: PathBuf, origin: Origin },
}

impl UnitSource {
    fn origin(&self) -> Origin {
        match self {
            Self::Memory(unit) => unit.origin(),
            Self::Manifest { origin, .. } => *origin,
        }
    }
}

/// Every unit reachable by a scan.
#[derive(Debug, Default)]
pub struct SymbolStore {
    sources: Vec<UnitSource>,
    open_sessions: AtomicUsize,
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: SymbolUnit) -> Self {
        self.add_unit(unit);
        self
    }

    pub fn add_unit(&mut self, unit: SymbolUnit) {
        self.sources.push(UnitSource::Memory(unit));
    }

    /// Registers a manifest file; it is read lazily by each scan.
    pub fn add_manifest(&mut self, path: impl Into<PathBuf>, origin: Origin) {
        self.sources.push(UnitSource::Manifest {
            path: path.into(),
            origin,
        });
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>, origin: Origin) -> Self {
        self.add_manifest(path, origin);
        self
    }

    /// Opens a scan session over units admitted by `origins`.
    pub fn open_session(&self, origins: OriginFilter) -> ScanSession<'_> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        ScanSession::new(self, origins)
    }

    /// Number of sessions not yet released.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub(crate) fn release_session(&self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }

    /// Materializes every admitted unit, reading manifests from disk.
    pub(crate) fn read_units(&self, origins: OriginFilter) -> ScanResult<Vec<SymbolUnit>> {
        let mut units = Vec::new();
        for source in &self.sources {
            if !origins.admits(source.origin()) {
                continue;
            }
            match source {
                UnitSource::Memory(unit) => units.push(unit.clone()),
                UnitSource::Manifest { path, origin } => {
                    units.push(SymbolUnit::read_manifest(path, *origin)?)
                }
            }
        }
        Ok(units)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    unit: String,
    #[serde(default)]
    symbols: Vec<ManifestSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestSymbol {
    name: String,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    markers: Vec<ManifestMarker>,
    instance: Option<BTreeMap<String, String>>,
    construct_error: Option<String>,
    load_error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum ManifestMarker {
    Extension,
    Symbol { values: Vec<String> },
    Other { name: String },
}

impl ManifestFile {
    fn into_unit(self, origin: Origin, path: &Path) -> ScanResult<SymbolUnit> {
        if self.unit.trim().is_empty() {
            return Err(manifest_error(path, "unit name must not be empty"));
        }
        let mut unit = SymbolUnit::new(self.unit.trim(), origin);
        for raw in self.symbols {
            unit = unit.with_entry(raw.into_entry(path)?);
        }
        Ok(unit)
    }
}

impl ManifestSymbol {
    fn into_entry(self, path: &Path) -> ScanResult<SymbolEntry> {
        if !is_valid_qualified_name(&self.name) {
            return Err(manifest_error(
                path,
                format!("invalid symbol name `{}`", self.name),
            ));
        }

        let mut symbol = Symbol::new(self.name.as_str());
        for supertype in self.supertypes {
            if !is_valid_qualified_name(&supertype) {
                return Err(manifest_error(
                    path,
                    format!("invalid supertype `{supertype}` on `{}`", self.name),
                ));
            }
            symbol = symbol.extends(supertype);
        }
        for marker in self.markers {
            symbol = symbol.marked(match marker {
                ManifestMarker::Extension => Marker::Extension,
                ManifestMarker::Symbol { values } => Marker::Symbol(values),
                ManifestMarker::Other { name } => Marker::Other(name),
            });
        }

        symbol = match (self.instance, self.construct_error) {
            (Some(_), Some(_)) => {
                return Err(manifest_error(
                    path,
                    format!(
                        "symbol `{}` declares both `instance` and `construct_error`",
                        self.name
                    ),
                ));
            }
            (Some(properties), None) => symbol.constructs(Instance::new(properties)),
            (None, Some(reason)) => symbol.without_constructor(reason),
            (None, None) => symbol,
        };

        Ok(match self.load_error {
            Some(reason) => SymbolEntry::failing(symbol, reason),
            None => SymbolEntry::new(symbol),
        })
    }
}

fn manifest_error(path: &Path, message: impl Into<String>) -> ScanError {
    ScanError::Manifest {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Origin, SymbolEntry, SymbolUnit};
    use crate::failure::FailureCause;
    use crate::scan::error::ScanError;
    use crate::symbol::model::{Constructor, MarkerKind, Symbol};
    use std::path::Path;

    #[test]
    fn parses_manifest_with_markers_and_constructors() {
        let text = r#"{
            "unit": "workflow-basic-steps",
            "symbols": [
                {
                    "name": "org.example.EchoStep$DescriptorImpl",
                    "supertypes": ["org.jenkinsci.plugins.workflow.steps.StepDescriptor"],
                    "markers": [{"type": "extension"}, {"type": "symbol", "values": ["echo"]}],
                    "instance": {"functionName": "echo"}
                },
                {
                    "name": "org.example.Broken",
                    "construct_error": "abstract symbol",
                    "load_error": "ExceptionInInitializerError"
                }
            ]
        }"#;

        let unit = SymbolUnit::from_manifest_str(text, Origin::Dependency, Path::new("m.json"))
            .expect("manifest should parse");
        assert_eq!(unit.name(), "workflow-basic-steps");
        assert_eq!(unit.origin(), Origin::Dependency);
        assert_eq!(unit.entries().len(), 2);

        let echo = unit.entries()[0].load().expect("echo should load");
        assert!(echo.has_marker(MarkerKind::Extension));
        assert_eq!(echo.alias_names(), vec!["echo"]);
        assert!(matches!(echo.constructor(), Constructor::Declared(_)));

        let broken = &unit.entries()[1];
        assert!(matches!(broken.metadata().constructor(), Constructor::Missing(_)));
        assert_eq!(
            broken.load().expect_err("broken should fail to load"),
            FailureCause::Load("ExceptionInInitializerError".to_string())
        );
    }

    #[test]
    fn rejects_invalid_names_and_conflicting_constructors() {
        let path = Path::new("bad.json");
        let err = SymbolUnit::from_manifest_str(
            r#"{"unit": "u", "symbols": [{"name": "not a name"}]}"#,
            Origin::Local,
            path,
        )
        .expect_err("invalid name must fail");
        assert!(matches!(err, ScanError::Manifest { .. }));

        let err = SymbolUnit::from_manifest_str(
            r#"{"unit": "u", "symbols": [{"name": "a.B", "instance": {}, "construct_error": "x"}]}"#,
            Origin::Local,
            path,
        )
        .expect_err("conflicting constructor declarations must fail");
        assert!(err.to_string().contains("both"));

        let err = SymbolUnit::from_manifest_str(r#"{"unit": "  "}"#, Origin::Local, path)
            .expect_err("blank unit must fail");
        assert!(err.to_string().contains("unit name"));
    }

    #[test]
    fn rejects_unknown_marker_type() {
        let err = SymbolUnit::from_manifest_str(
            r#"{"unit": "u", "symbols": [{"name": "a.B", "markers": [{"type": "magic"}]}]}"#,
            Origin::Local,
            Path::new("bad.json"),
        )
        .expect_err("unknown marker must fail");
        assert!(matches!(err, ScanError::Manifest { .. }));
    }

    #[test]
    fn load_catching_converts_initializer_panics() {
        let entry = SymbolEntry::with_initializer(Symbol::new("org.example.Explodes"), || {
            panic!("static init exploded")
        });
        assert_eq!(
            entry.load_catching().expect_err("panicking init must fail"),
            FailureCause::Panicked("static init exploded".to_string())
        );

        let entry = SymbolEntry::with_initializer(Symbol::new("org.example.Refuses"), || {
            Err("NoClassDefFoundError: jenkins/model/Jenkins".to_string())
        });
        assert!(matches!(entry.load_catching(), Err(FailureCause::Load(_))));
    }
}
