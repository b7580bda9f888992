//! Parameters handed to the manifest template

use std::collections::BTreeMap;

use minijinja::Value;

/// Template variable the image reference is injected under
pub const IMAGE_KEY: &str = "DockerImage";

/// Key/value parameters for a render.
///
/// Only [`IMAGE_KEY`] is referenced by the shipped template; other keys are
/// passed through and simply go unused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderParams {
    values: BTreeMap<String, String>,
}

impl RenderParams {
    /// Parameters carrying just the image reference
    pub fn for_image(image: impl Into<String>) -> Self {
        Self::default().with(IMAGE_KEY, image)
    }

    /// Add or replace a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// The image reference, if set
    pub fn image(&self) -> Option<&str> {
        self.values.get(IMAGE_KEY).map(String::as_str)
    }

    /// Convert to a minijinja context value
    pub fn to_value(&self) -> Value {
        Value::from_serialize(&self.values)
    }
}
