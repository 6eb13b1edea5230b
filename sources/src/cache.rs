//! Per-invocation memoization of parsed source units.
//!
//! The startup-driven generators visit the same driver source once per
//! device instance; a startup file with eight ROCs would otherwise parse
//! the same plugin source eight times. The cache is owned by the CLI
//! invocation, so memoization never outlives a run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use epicsgen_dsl::diagnostic::Diagnostic;
use epicsgen_parser::ParsedUnit;
use log::debug;

use crate::source::Source;

#[derive(Default)]
pub struct ParseCache {
    entries: HashMap<PathBuf, Arc<ParsedUnit>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the file at the path, or returns the unit parsed earlier in
    /// this run. Failures are not cached; a retry re-reads the file.
    pub fn parse(&mut self, path: &Path) -> Result<Arc<ParsedUnit>, Diagnostic> {
        if let Some(unit) = self.entries.get(path) {
            debug!("Using cached parse of {}", path.display());
            return Ok(unit.clone());
        }

        let source = Source::try_from_path(path)?;
        let unit = Arc::new(source.unit()?);
        self.entries.insert(path.to_path_buf(), unit.clone());
        Ok(unit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn parse_when_called_twice_then_single_entry_shared() {
        let file =
            write_source("createStatusParam(\"Acquiring\", 0x1, 1, 3); // Acquiring data\n");
        let mut cache = ParseCache::new();

        let first = cache.parse(file.path()).expect("must parse");
        let second = cache.parse(file.path()).expect("must parse");

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.params.len(), 1);
    }

    #[test]
    fn parse_when_file_missing_then_error_and_nothing_cached() {
        let mut cache = ParseCache::new();

        let result = cache.parse(Path::new("/nonexistent/RocPlugin_v52.cpp"));

        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
