//! Provides definition for diagnostics, which are the errors and warnings
//! associated with scanning driver sources and generating output artifacts.
//!
//! There exist crates that make this easy, but the suite needs the same
//! diagnostic to drive both terminal reporting and exit-code policy, and no
//! one crate does both well.

use epicsgen_problems::Problem;

use crate::core::FileId;

/// How severe a diagnostic is. Warnings are surfaced but never change the
/// outcome of a run; errors make the run exit non-zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Warning,
    Error,
}

/// A label that refers to a line in a scanned file and a message
/// describing what was found there.
#[derive(Clone, Debug)]
pub struct Label {
    /// Identifier for the file.
    pub file_id: FileId,

    /// Line number (1-indexed). Zero means the label refers to the file
    /// in its entirety rather than a particular line.
    pub line: usize,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn line(file_id: impl Into<FileId>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            line,
            message: message.into(),
        }
    }

    /// A "position" that is a file in its entirety rather than a particular
    /// line number.
    pub fn file(file_id: impl Into<FileId>, message: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            line: 0,
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a severity, and a primary location in a scanned source file.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    pub severity: Severity,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions beyond the constant description.
    pub described: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified
    /// label. The severity follows the problem's code class.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            severity: if problem.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            description: problem.message().to_string(),
            primary,
            described: vec![],
        }
    }

    /// Adds to the problem description additional context about the problem,
    /// such as the parameter name the problem relates to.
    pub fn with_context(mut self, description: &str, item: impl AsRef<str>) -> Self {
        self.described
            .push(format!("{}={}", description, item.as_ref()));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}
