//! Scan-engine errors.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Message the subtype index reports when it holds no symbols at all.
///
/// The index uses the same error channel for "nothing compiled" and for a
/// misconfigured scanner; only this message tells the two apart.
pub const EMPTY_INDEX_MESSAGE: &str = "Couldn't find subtypes of Object. \
     Make sure SubTypesScanner initialized to include Object class - new SubTypesScanner(false)";

const EMPTY_INDEX_MARKER: &str = "Couldn't find subtypes of Object.";

pub type ScanResult<T> = Result<T, ScanError>;

/// Fatal scan-engine failure; distinct from an empty result.
#[derive(Debug)]
pub enum ScanError {
    /// The engine itself reported a failure.
    Engine { message: String },
    /// A unit manifest could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A unit manifest is malformed.
    Manifest { path: PathBuf, message: String },
}

impl ScanError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Returns whether this is the subtype index reporting an empty universe.
    pub fn is_empty_universe(&self) -> bool {
        match self {
            Self::Engine { message } => message.contains(EMPTY_INDEX_MARKER),
            _ => false,
        }
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine { message } => write!(f, "scan engine failure: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to read symbol manifest `{}`: {source}", path.display())
            }
            Self::Manifest { path, message } => {
                write!(f, "invalid symbol manifest `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Engine { .. } | Self::Manifest { .. } => None,
        }
    }
}
