//! Budget configuration errors.

use std::path::PathBuf;

/// A fatal problem with the exact-solver budget setup.
///
/// Every variant names the resource at fault so that a run aborted by it
/// says what to fix.
#[derive(Debug)]
pub enum ConfigError {
    /// The baseline file could not be opened or read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The baseline table is not valid delimited text.
    Csv { source: String, error: csv::Error },
    /// The baseline table has no usable rows.
    EmptyBaseline { source: String },
    /// A baseline entry is not a non-negative number of seconds.
    MalformedBaseline {
        source: String,
        line: u64,
        value: String,
    },
    /// The granted fraction of baseline time is outside `[0, 1]`.
    InvalidPercentage(f64),
    /// The per-call share of the remaining budget is outside `(0, 1]`.
    InvalidCallShare(f64),
    /// No baseline exists for an instance and budgeting is mandatory.
    MissingBaseline { instance: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Cannot read baseline table {}: {}", path.display(), source)
            }
            ConfigError::Csv { source, error } => {
                write!(f, "Baseline table {source} is not valid CSV: {error}")
            }
            ConfigError::EmptyBaseline { source } => {
                write!(f, "Baseline table {source} contains no instances")
            }
            ConfigError::MalformedBaseline {
                source,
                line,
                value,
            } => write!(
                f,
                "Baseline table {source} line {line}: '{value}' is not a baseline in seconds"
            ),
            ConfigError::InvalidPercentage(p) => {
                write!(f, "Budget percentage {p} is outside [0, 1]")
            }
            ConfigError::InvalidCallShare(s) => {
                write!(f, "Per-call budget share {s} is outside (0, 1]")
            }
            ConfigError::MissingBaseline { instance } => {
                write!(f, "No baseline time for instance {instance}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Csv { error, .. } => Some(error),
            _ => None,
        }
    }
}
