//! Template Renderer
//!
//! Loads the manifest template from disk and renders it. The file is read on
//! every call so operators can edit the template without a restart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::engine::TemplateEngine;
use super::error::TemplateError;
use super::params::RenderParams;

/// Renders the manifest template at a fixed path
pub struct TemplateRenderer {
    path: PathBuf,
    engine: TemplateEngine,
}

impl TemplateRenderer {
    /// Create a renderer for the template at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            engine: TemplateEngine::new(),
        }
    }

    /// Path the template is loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the template and render it with `params`
    ///
    /// # Errors
    ///
    /// - `TemplateError::Missing` if the file does not exist
    /// - `TemplateError::Read` for any other I/O failure
    /// - `TemplateError::Parse` / `TemplateError::Exec` from the engine
    pub async fn render(&self, params: &RenderParams) -> Result<String, TemplateError> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TemplateError::Missing(self.path.clone()),
                _ => TemplateError::Read {
                    path: self.path.clone(),
                    source: e,
                },
            })?;

        let rendered = self.engine.render(&source, params)?;
        debug!(path = %self.path.display(), manifest = %rendered, "rendered manifest template");
        Ok(rendered)
    }
}
