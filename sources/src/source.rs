//! Source file abstraction and reading.

use std::borrow::Borrow;
use std::path::Path;

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_parser::{parse_unit, ParsedUnit};
use epicsgen_problems::Problem;
use log::{debug, trace};

/// The contents of a driver source file with parsing capabilities.
#[derive(Debug)]
pub struct Source {
    file_id: FileId,
    data: String,
}

impl Source {
    /// Create a new Source from content and file ID.
    pub fn new(data: String, file_id: &FileId) -> Self {
        Self {
            file_id: file_id.clone(),
            data,
        }
    }

    /// Create a Source by reading from a file.
    pub fn try_from_path(path: &Path) -> Result<Source, Diagnostic> {
        let content = read_file_content(path)?;
        Ok(Source::new(content, &FileId::from_path(path)))
    }

    /// Get the raw content as a string.
    pub fn as_string(&self) -> &str {
        self.data.borrow()
    }

    /// Get the file ID.
    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    /// Parse the declared parameters out of the source.
    pub fn unit(&self) -> Result<ParsedUnit, Diagnostic> {
        parse_unit(&self.data, &self.file_id)
    }
}

/// Read file content with encoding detection. Driver sources are usually
/// UTF-8 but some carry vendor comments in latin1.
pub fn read_file_content(path: &Path) -> Result<String, Diagnostic> {
    debug!("Reading file {}", path.display());

    let bytes = std::fs::read(path)
        .map_err(|e| diagnostic(Problem::CannotReadFile, path, e.to_string()))?;

    let decoders: [&'static encoding_rs::Encoding; 2] =
        [encoding_rs::UTF_8, encoding_rs::WINDOWS_1252];

    let result = decoders.into_iter().find_map(move |d| {
        let (res, encoding_used, had_errors) = d.decode(&bytes);
        if had_errors {
            trace!(
                "Path {} did not match encoding {}",
                path.display(),
                encoding_used.name()
            );
            return None;
        }
        trace!(
            "Path {} matched encoding {}",
            path.display(),
            encoding_used.name()
        );
        Some(res.to_string())
    });

    match result {
        Some(res) => Ok(res),
        None => Err(diagnostic(
            Problem::CannotReadFile,
            path,
            String::from("The file is not UTF-8 or latin1"),
        )),
    }
}

fn diagnostic(problem: Problem, path: &Path, message: String) -> Diagnostic {
    Diagnostic::problem(problem, Label::file(FileId::from_path(path), message))
}
