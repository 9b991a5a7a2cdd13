use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::pin::Pin;

/// A stream of content chunks.
///
/// The stream is treated as a single byte sequence split into chunks; chunk
/// boundaries carry no meaning and are not preserved across compression.
pub type ContentStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Contents of a [`Unit`].
///
/// The representation is fixed when the unit is created; the stage replaces
/// the contents but never changes a buffer into a stream or vice versa.
pub enum Content {
    /// Fully materialized contents.
    Buffer(Bytes),
    /// Incrementally produced contents.
    Stream(ContentStream),
    /// No contents at all, e.g. an entry representing a directory.
    Empty,
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Buffer(contents) => f.debug_tuple("Buffer").field(&contents.len()).finish(),
            Content::Stream(_) => f.write_str("Stream(..)"),
            Content::Empty => f.write_str("Empty"),
        }
    }
}

/// One file-like item flowing through the pipeline.
#[derive(Debug)]
pub struct Unit {
    /// Destination path; gains the format suffix when contents were
    /// compressed and appending is enabled.
    pub path: String,
    /// Current contents.
    pub content: Content,
    /// Pipeline-owned fields, carried through untouched.
    pub metadata: HashMap<String, String>,
}

impl Unit {
    /// Creates a unit with fully materialized contents.
    pub fn from_buffer(path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: Content::Buffer(contents.into()),
            metadata: HashMap::new(),
        }
    }

    /// Creates a unit with streaming contents.
    pub fn from_stream(path: impl Into<String>, contents: ContentStream) -> Self {
        Self {
            path: path.into(),
            content: Content::Stream(contents),
            metadata: HashMap::new(),
        }
    }

    /// Creates a unit carrying no contents.
    pub fn marker(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Content::Empty,
            metadata: HashMap::new(),
        }
    }
}
