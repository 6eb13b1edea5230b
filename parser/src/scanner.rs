//! Line-oriented scanner for parameter declaration statements.
//!
//! Declarations are call-like statements: a case-sensitive `create...Param`
//! token, a parenthesized argument list and a `;` terminator, optionally
//! followed by a `//` comment that carries the description and extras block.
//! Matching is line oriented; the driver sources never wrap a declaration.

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_dsl::param::ParamKind;
use epicsgen_problems::Problem;
use lazy_static::lazy_static;
use regex::Regex;
use std::iter::Enumerate;
use std::str::Lines;

lazy_static! {
    /// Any line that opens with a call-like `create...Param(` token. Used to
    /// distinguish "not a declaration" from "a declaration we cannot handle".
    static ref CANDIDATE: Regex = Regex::new(r"^\s*create(\w+)Param\s*\(").unwrap();

    /// A complete declaration statement with optional trailing comment.
    static ref DECLARATION: Regex =
        Regex::new(r"^\s*create(\w+)Param\s*\((.*)\)\s*;\s*(?://\s*(.*))?$").unwrap();
}

/// Dispatch table from the signature stem (the text between `create` and
/// `Param`) to the parameter kind. Order is the explicit match precedence:
/// the channel and meta variants must be tested before the plain config
/// signature so that a union-alternative still selects exactly one kind.
const SIGNATURES: [(&str, ParamKind); 9] = [
    ("ChanConfig", ParamKind::ChannelConfig),
    ("MetaConfig", ParamKind::MetaConfig),
    ("Config", ParamKind::Config),
    ("Status", ParamKind::Status),
    ("Counter", ParamKind::Counter),
    ("Temp", ParamKind::Temperature),
    ("Upgrade", ParamKind::Upgrade),
    ("PreAmpCfg", ParamKind::PreAmpConfig),
    ("PreAmpTrig", ParamKind::PreAmpTrigger),
];

/// One matched declaration line, not yet interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeclaration {
    pub kind: ParamKind,
    /// Line number in the source unit (1-indexed).
    pub line: usize,
    /// The raw argument list between the parentheses.
    pub args: String,
    /// The raw comment text after `//`, if any.
    pub comment: Option<String>,
}

/// A lazy iterator over the declarations of one source unit.
pub struct DeclarationScanner<'a> {
    lines: Enumerate<Lines<'a>>,
    file_id: &'a FileId,
}

impl<'a> DeclarationScanner<'a> {
    pub fn new(source: &'a str, file_id: &'a FileId) -> Self {
        Self {
            lines: source.lines().enumerate(),
            file_id,
        }
    }

    fn scan_line(&self, line_no: usize, line: &str) -> Result<RawDeclaration, Diagnostic> {
        let unsupported = |stem: &str| {
            Diagnostic::problem(
                Problem::UnsupportedDeclaration,
                Label::line(
                    self.file_id.clone(),
                    line_no,
                    format!("create{}Param is not a recognized declaration", stem),
                ),
            )
        };

        let captures = match DECLARATION.captures(line) {
            Some(captures) => captures,
            None => {
                // The line opens like a declaration but is not a complete
                // statement.
                let stem = CANDIDATE
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                return Err(unsupported(stem));
            }
        };

        let stem = &captures[1];
        let kind = SIGNATURES
            .iter()
            .find(|(name, _)| *name == stem)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| unsupported(stem))?;

        Ok(RawDeclaration {
            kind,
            line: line_no,
            args: captures[2].to_string(),
            comment: captures.get(3).map(|m| m.as_str().to_string()),
        })
    }
}

impl Iterator for DeclarationScanner<'_> {
    type Item = Result<RawDeclaration, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            if !CANDIDATE.is_match(line) {
                continue;
            }
            return Some(self.scan_line(index + 1, line));
        }
        None
    }
}
