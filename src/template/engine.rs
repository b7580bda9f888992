//! minijinja wrapper with strict undefined handling
//!
//! A broken template and a template that references something we never
//! supply surface as different errors.

use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use super::error::TemplateError;
use super::params::RenderParams;

/// Template engine for manifest rendering
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create an engine with default `{{ ... }}` syntax and strict undefined behavior
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // Keep the manifest byte-for-byte, including its final newline
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render template source with the given parameters
    ///
    /// # Errors
    ///
    /// - `TemplateError::Parse` if the source is not a valid template
    /// - `TemplateError::Exec` if rendering fails (undefined variable, bad filter, ...)
    pub fn render(&self, source: &str, params: &RenderParams) -> Result<String, TemplateError> {
        self.env
            .render_str(source, params.to_value())
            .map_err(classify)
    }
}

fn classify(err: minijinja::Error) -> TemplateError {
    match err.kind() {
        ErrorKind::SyntaxError | ErrorKind::BadEscape => TemplateError::Parse(err),
        _ => TemplateError::Exec(err),
    }
}
