//! Per-symbol failure collection and reporting policy.
//!
//! # Responsibility
//! - Record why a matched symbol could not be loaded, constructed or named.
//! - Log collected failures once per query, summarized or expanded.
//!
//! # Invariants
//! - Failures never abort a scan and are never returned as errors.
//! - Summary lines name failed symbols only; causes appear in expanded mode.

use crate::config::{DetectorConfig, EXPAND_FAILURES_ENV};
use log::{error, log, Level};
use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};

const MAX_PANIC_PAYLOAD_CHARS: usize = 200;

thread_local! {
    static CONTAINED_PANIC_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Failures keyed by qualified symbol name.
pub type FailureMap = BTreeMap<String, FailureCause>;

/// Why one symbol was excluded from a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Static initialization or symbol loading failed.
    Load(String),
    /// Default construction failed.
    Construct(String),
    /// Loading or construction panicked.
    Panicked(String),
    /// The instance does not declare a usable name.
    MissingName { property: &'static str },
}

impl Display for FailureCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(reason) => write!(f, "failed to load symbol: {reason}"),
            Self::Construct(reason) => write!(f, "failed to construct instance: {reason}"),
            Self::Panicked(payload) => write!(f, "panicked: {payload}"),
            Self::MissingName { property } => {
                write!(f, "instance does not declare a non-blank `{property}`")
            }
        }
    }
}

/// Converts a caught panic payload into a single-line description.
pub(crate) fn describe_panic(payload: &(dyn Any + Send)) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    let normalized = message.replace(['\n', '\r'], " ");
    let mut truncated = normalized
        .chars()
        .take(MAX_PANIC_PAYLOAD_CHARS)
        .collect::<String>();
    if normalized.chars().count() > MAX_PANIC_PAYLOAD_CHARS {
        truncated.push_str("...");
    }
    truncated
}

/// Runs per-symbol code, turning a panic into `FailureCause::Panicked`.
///
/// While `f` runs, the panic hook installed by `crate::logging` stays silent
/// on this thread; the failure is reported through `report_failures` only.
pub(crate) fn contain_symbol_panic<T>(
    f: impl FnOnce() -> Result<T, FailureCause>,
) -> Result<T, FailureCause> {
    let _scope = ContainedPanicScope::enter();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(FailureCause::Panicked(describe_panic(payload.as_ref()))),
    }
}

/// True while the current thread runs inside `contain_symbol_panic`.
pub(crate) fn panic_is_contained() -> bool {
    CONTAINED_PANIC_DEPTH.with(|depth| depth.get() > 0)
}

struct ContainedPanicScope;

impl ContainedPanicScope {
    fn enter() -> Self {
        CONTAINED_PANIC_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for ContainedPanicScope {
    fn drop(&mut self) {
        CONTAINED_PANIC_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Logs collected failures according to `config`.
///
/// `context` describes what was being resolved (e.g. `StepDescriptor names`);
/// `summary_level` is used for the single-line summary only.
pub(crate) fn report_failures(
    module: &str,
    context: &str,
    failures: &FailureMap,
    config: &DetectorConfig,
    summary_level: Level,
) {
    if failures.is_empty() {
        return;
    }

    if config.expand_failures() {
        for (symbol, cause) in failures {
            error!(
                "event=symbol_failure module={} status=error context=\"{}\" symbol={} cause=\"{}\"",
                module, context, symbol, cause
            );
        }
        return;
    }

    let names = failures.keys().map(String::as_str).collect::<Vec<_>>();
    log!(
        summary_level,
        "event=symbol_failures module={} status=error context=\"{}\" count={} failed=[{}] hint=\"set {}=true for detailed causes\"",
        module,
        context,
        failures.len(),
        names.join(", "),
        EXPAND_FAILURES_ENV
    );
}
