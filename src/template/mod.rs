//! Manifest templating
//!
//! The RayService manifest is a minijinja template with a single
//! substitution point, `{{ DockerImage }}`. Everything else in the file is
//! static YAML that this crate never interprets.

mod engine;
mod error;
mod params;
mod renderer;

pub use engine::TemplateEngine;
pub use error::TemplateError;
pub use params::{RenderParams, IMAGE_KEY};
pub use renderer::TemplateRenderer;
