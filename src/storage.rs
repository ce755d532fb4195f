use std::path::PathBuf;

use serde_json::{Map, Value};

pub mod http;

/// Outcome of fetching one optional JSON document from a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// The document exists and holds a JSON object.
    Found(Map<String, Value>),
    /// The document does not exist.
    Missing,
    /// The document exists but is not a JSON object.
    Malformed(String),
}

impl Document {
    /// Parse raw bytes, classifying anything but a JSON object as malformed.
    pub fn from_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self::Found(map),
            Ok(other) => Self::Malformed(format!("expected a JSON object, got {}", kind(&other))),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    /// Whether the document exists and has at least one key.
    pub fn is_present(&self) -> bool {
        matches!(self, Document::Found(m) if !m.is_empty())
    }

    /// Resolve to a mapping, degrading malformed documents to an empty one.
    ///
    /// Applied identically to every transport; a malformed document is reported
    /// at `warn` level but never aborts the read.
    pub fn into_map_or_empty(self, name: &str) -> Map<String, Value> {
        match self {
            Document::Found(m) => m,
            Document::Missing => Map::new(),
            Document::Malformed(reason) => {
                log::warn!("ignoring malformed {name}: {reason}");
                Map::new()
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read access to the small JSON documents of a store.
///
/// `Err` is reserved for transport failures; absent and malformed documents
/// are ordinary [`Document`] variants.
pub trait MetadataSource {
    fn fetch(&self, relative: &str) -> crate::Result<Document>;
}

/// A store on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetadataSource for LocalSource {
    fn fetch(&self, relative: &str) -> crate::Result<Document> {
        let path = self.root.join(relative);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Document::from_slice(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::Missing),
            Err(e) => Err(e.into()),
        }
    }
}
