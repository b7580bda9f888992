//! Manifest decoding
//!
//! Turns rendered template text into an untyped document. The manager never
//! models the RayService schema; it only threads the document through to the
//! control plane.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::ResourceDescriptor;

/// Errors from decoding a rendered manifest
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Text is not valid YAML or JSON
    #[error("failed to decode populated RayService manifest: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// Text decoded to nothing (whitespace, comments, `null`, `{}`)
    #[error("decoded RayService manifest is empty, check template output")]
    Empty,
}

/// Generic key-value tree for a single Kubernetes object
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDocument(Value);

impl ResourceDocument {
    /// Wrap an already-parsed value, rejecting empty trees
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.trim().is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        if empty {
            return Err(DecodeError::Empty);
        }
        Ok(Self(value))
    }

    /// The underlying tree
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying tree
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a value by JSON pointer (e.g. `/metadata/name`)
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }

    /// `apiVersion` field, if present
    pub fn api_version(&self) -> Option<&str> {
        self.pointer("/apiVersion").and_then(Value::as_str)
    }

    /// `kind` field, if present
    pub fn kind(&self) -> Option<&str> {
        self.pointer("/kind").and_then(Value::as_str)
    }

    /// `metadata.name`, if present
    pub fn name(&self) -> Option<&str> {
        self.pointer("/metadata/name").and_then(Value::as_str)
    }

    /// Pin the document to the descriptor's coordinates.
    ///
    /// Name and namespace always come from the descriptor. apiVersion and kind
    /// are filled in only when the template leaves them out. A document whose
    /// top level is not a mapping is returned untouched.
    pub fn bind_to(mut self, descriptor: &ResourceDescriptor) -> Self {
        if let Value::Object(root) = &mut self.0 {
            root.entry("apiVersion")
                .or_insert_with(|| Value::String(descriptor.api_version()));
            root.entry("kind")
                .or_insert_with(|| Value::String(descriptor.kind.clone()));

            let metadata = root
                .entry("metadata")
                .or_insert_with(|| Value::Object(Map::new()));
            if !metadata.is_object() {
                *metadata = Value::Object(Map::new());
            }
            if let Value::Object(meta) = metadata {
                meta.insert("name".to_string(), Value::String(descriptor.name.clone()));
                meta.insert(
                    "namespace".to_string(),
                    Value::String(descriptor.namespace.clone()),
                );
            }
        }
        self
    }
}

/// Decode YAML or JSON text into a [`ResourceDocument`].
///
/// For multi-document YAML only the first document is used.
pub fn decode(text: &str) -> Result<ResourceDocument, DecodeError> {
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let value = match serde_yaml::Deserializer::from_str(text).next() {
        Some(doc) => Value::deserialize(doc)?,
        None => Value::Null,
    };
    ResourceDocument::from_value(value)
}
