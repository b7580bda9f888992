//! Template error types

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while loading or rendering the manifest template
#[derive(Debug)]
pub enum TemplateError {
    /// Template file does not exist
    Missing(PathBuf),
    /// Template file exists but could not be read
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
    /// Template syntax is invalid
    Parse(minijinja::Error),
    /// Substitution failed (e.g. an undefined reference)
    Exec(minijinja::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(
                f,
                "RayService manifest template file missing at {}",
                path.display()
            ),
            Self::Read { path, source } => write!(
                f,
                "failed to read RayService manifest template {}: {}",
                path.display(),
                source
            ),
            Self::Parse(e) => write!(f, "failed to parse RayService manifest template: {}", e),
            Self::Exec(e) => write!(f, "failed to populate RayService manifest template: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Missing(_) => None,
            Self::Read { source, .. } => Some(source),
            Self::Parse(e) | Self::Exec(e) => Some(e),
        }
    }
}
