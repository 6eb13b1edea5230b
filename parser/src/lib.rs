//! Parser for parameter declarations embedded in device driver sources.
//!
//! The scanner recognizes comment-annotated declaration statements such as
//!
//! ```text
//! createConfigParam("AcquireMode", 'F', 0x0, 2, 4, 0); // Acquire mode (0=normal,1=verbose)
//! ```
//!
//! and the parser turns each match into an immutable
//! [`epicsgen_dsl::param::Param`]. Parsing one source unit is a single pass
//! over its lines; lines that do not look like declarations are skipped
//! silently while a declaration-like line of an unknown kind aborts the unit.

mod extras;
mod param;
mod scanner;

pub use scanner::{DeclarationScanner, RawDeclaration};

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::Diagnostic;
use epicsgen_dsl::param::Param;
use log::debug;

/// The result of parsing one source unit: the declared parameters in
/// declaration order plus any non-fatal warnings raised along the way.
#[derive(Debug, Default)]
pub struct ParsedUnit {
    pub params: Vec<Param>,
    pub warnings: Vec<Diagnostic>,
}

/// Parses all parameter declarations in one source unit.
///
/// Returns `Err` on the fatal conditions: an unsupported declaration kind or
/// a malformed argument list. Warnings (truncated or missing descriptions,
/// dropped extras tokens) accumulate in the returned unit.
pub fn parse_unit(source: &str, file_id: &FileId) -> Result<ParsedUnit, Diagnostic> {
    let mut unit = ParsedUnit::default();

    for declaration in DeclarationScanner::new(source, file_id) {
        let declaration = declaration?;
        let param = param::parse_declaration(&declaration, file_id, &mut unit.warnings)?;
        debug!(
            "Found {:?} parameter {} at line {}",
            param.kind, param.name, param.line
        );
        unit.params.push(param);
    }

    Ok(unit)
}
