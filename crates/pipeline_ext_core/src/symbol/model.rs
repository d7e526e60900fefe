//! Symbol catalog model.
//!
//! # Responsibility
//! - Describe one compiled symbol: qualified name, supertype chain, markers and
//!   how a default instance is constructed.
//! - Provide the matching predicates used by every query backend.
//!
//! # Invariants
//! - A `Symbol` is immutable once built; scans share it behind `Arc`.
//! - Supertype matching is reflexive and every symbol matches `UNIVERSAL_TOP`.

use crate::symbol::vocabulary::{self, UNIVERSAL_TOP};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

static QUALIFIED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("valid qualified name regex")
});

/// Returns whether `value` is a dotted qualified symbol name.
pub fn is_valid_qualified_name(value: &str) -> bool {
    QUALIFIED_NAME_RE.is_match(value)
}

/// Marker attribute attached to a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// "is-an-extension" marker.
    Extension,
    /// Alias marker with its declared names.
    Symbol(Vec<String>),
    /// Any other attribute; carried through scans, never queried.
    Other(String),
}

impl Marker {
    pub fn kind(&self) -> Option<MarkerKind> {
        match self {
            Self::Extension => Some(MarkerKind::Extension),
            Self::Symbol(_) => Some(MarkerKind::Alias),
            Self::Other(_) => None,
        }
    }
}

/// Queryable marker vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    Extension,
    Alias,
}

impl MarkerKind {
    /// Qualified attribute name used in logs.
    pub fn qualified_name(self) -> &'static str {
        match self {
            Self::Extension => vocabulary::EXTENSION_MARKER,
            Self::Alias => vocabulary::ALIAS_MARKER,
        }
    }
}

/// Default-constructed instance of a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instance {
    properties: BTreeMap<String, String>,
}

impl Instance {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Builds an instance from `(property, value)` pairs.
    pub fn with_properties<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// Construction callback for symbols with custom construction logic.
pub type FactoryFn = dyn Fn() -> Result<Instance, String> + Send + Sync;

/// How a symbol's default instance is obtained.
#[derive(Clone)]
pub enum Constructor {
    /// Default construction succeeds with these instance properties.
    Declared(Instance),
    /// No accessible default constructor.
    Missing(String),
    /// Construction runs caller code; it may fail or panic.
    Factory(Arc<FactoryFn>),
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declared(instance) => f.debug_tuple("Declared").field(instance).finish(),
            Self::Missing(reason) => f.debug_tuple("Missing").field(reason).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// One compiled symbol as seen by the catalog.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    supertypes: Vec<String>,
    markers: Vec<Marker>,
    constructor: Constructor,
}

impl Symbol {
    /// Creates a symbol with no supertypes, markers or default constructor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            markers: Vec::new(),
            constructor: Constructor::Missing("no default constructor".to_string()),
        }
    }

    /// Appends one supertype to the chain, nearest first.
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn marked(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declares that default construction yields `instance`.
    pub fn constructs(mut self, instance: Instance) -> Self {
        self.constructor = Constructor::Declared(instance);
        self
    }

    /// Declares that default construction fails with `reason`.
    pub fn without_constructor(mut self, reason: impl Into<String>) -> Self {
        self.constructor = Constructor::Missing(reason.into());
        self
    }

    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Instance, String> + Send + Sync + 'static,
    {
        self.constructor = Constructor::Factory(Arc::new(factory));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Returns whether this symbol is `supertype` or one of its subtypes.
    pub fn is_subtype_of(&self, supertype: &str) -> bool {
        supertype == UNIVERSAL_TOP
            || self.name == supertype
            || self.supertypes.iter().any(|value| value == supertype)
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|marker| marker.kind() == Some(kind))
    }

    /// Returns all alias names declared by alias markers, in declaration order.
    pub fn alias_names(&self) -> Vec<&str> {
        self.markers
            .iter()
            .filter_map(|marker| match marker {
                Marker::Symbol(values) => Some(values.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Returns whether this symbol is (or derives from) harness scaffolding.
    pub fn is_scaffolding(&self) -> bool {
        vocabulary::is_scaffolding_type(&self.name)
            || self
                .supertypes
                .iter()
                .any(|value| vocabulary::is_scaffolding_type(value))
    }
}

/// Optional namespace restriction for one query.
///
/// A scope `a.b` contains `a.b` itself and every name below it (`a.b.C`,
/// `a.b.c.D`), but not siblings sharing the prefix (`a.bc.D`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    prefix: Option<String>,
}

impl Scope {
    /// Whole reachable universe.
    pub fn all() -> Self {
        Self::default()
    }

    /// Namespace tree rooted at `prefix`; a blank prefix means everything.
    pub fn namespace(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            return Self::all();
        }
        Self {
            prefix: Some(trimmed.to_string()),
        }
    }

    pub fn from_option(prefix: Option<&str>) -> Self {
        prefix.map(Self::namespace).unwrap_or_default()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        let Some(prefix) = self.prefix.as_deref() else {
            return true;
        };
        match name.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('$'),
            None => false,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.prefix.as_deref() {
            Some(prefix) => write!(f, "{prefix}"),
            None => write!(f, "<all>"),
        }
    }
}
