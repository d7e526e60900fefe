//! Detector configuration.
//!
//! # Responsibility
//! - Decide whether per-symbol failures are logged individually or summarized.
//!
//! # Invariants
//! - `FailureVerbosity::Environment` reads the process environment on every
//!   query; the value is never cached.
//! - Only the exact literal `"true"` enables expanded reporting.

/// Process variable toggling expanded failure reporting.
pub const EXPAND_FAILURES_ENV: &str = "PIPELINE_EXTENSION_DETECTOR_EXPAND_FAILURES";

/// Source of the failure-reporting verbosity switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureVerbosity {
    /// Read `EXPAND_FAILURES_ENV` at report time.
    #[default]
    Environment,
    /// One summary line naming failed symbols.
    Summary,
    /// One log line per failure, including its cause.
    Expanded,
}

impl FailureVerbosity {
    /// Resolves the switch for the current report.
    pub fn expand_failures(self) -> bool {
        match self {
            Self::Environment => {
                parse_expand_flag(std::env::var(EXPAND_FAILURES_ENV).ok().as_deref())
            }
            Self::Summary => false,
            Self::Expanded => true,
        }
    }
}

/// Interprets a raw switch value; anything but `"true"` is `false`.
pub fn parse_expand_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Configuration threaded into backends and the detector at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorConfig {
    pub verbosity: FailureVerbosity,
}

impl DetectorConfig {
    pub fn new(verbosity: FailureVerbosity) -> Self {
        Self { verbosity }
    }

    /// Fixed summary reporting, independent of the process environment.
    pub fn quiet() -> Self {
        Self::new(FailureVerbosity::Summary)
    }

    /// Fixed expanded reporting, independent of the process environment.
    pub fn expanded() -> Self {
        Self::new(FailureVerbosity::Expanded)
    }

    pub fn expand_failures(&self) -> bool {
        self.verbosity.expand_failures()
    }
}
