//! Common items that identify where model objects came from.

use core::fmt;
use std::path::Path;
use std::sync::Arc;

/// FileId identifies the origin of scanned source code.
///
/// FileId is normally a file path, but tests frequently construct
/// parameters from strings with no backing file.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Creates an empty file identifier.
    pub fn new() -> Self {
        FileId::default()
    }

    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId(Arc::from(path))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&Path> for FileId {
    fn from(path: &Path) -> Self {
        FileId::from_path(path)
    }
}

impl From<&str> for FileId {
    fn from(path: &str) -> Self {
        FileId::from_string(path)
    }
}
