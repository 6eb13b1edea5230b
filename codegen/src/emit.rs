//! Low-level record-block emitter.
//!
//! Provides a builder that accumulates `info` and `field` assignments for
//! one record and renders the block in the fixed database text layout:
//!
//! ```text
//! record(bo, "$(P)Enable")
//! {
//!     info(autosaveFields, "VAL")
//!     field(DESC, "Channel enable")
//! }
//! ```

use std::fmt::Write;

/// Accumulates one output record block.
pub(crate) struct Record {
    record_type: &'static str,
    name: String,
    infos: Vec<(&'static str, String)>,
    fields: Vec<(&'static str, String)>,
}

impl Record {
    pub fn new(record_type: &'static str, name: impl Into<String>) -> Self {
        Record {
            record_type,
            name: name.into(),
            infos: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn info(&mut self, name: &'static str, value: impl Into<String>) {
        self.infos.push((name, value.into()));
    }

    pub fn field(&mut self, name: &'static str, value: impl Into<String>) {
        self.fields.push((name, value.into()));
    }

    /// Renders the block. Double quotes inside values are escaped so the
    /// record text stays parseable.
    pub fn render(&self, out: &mut String) {
        let _ = writeln!(out, "record({}, \"{}\")", self.record_type, self.name);
        out.push_str("{\n");
        for (name, value) in &self.infos {
            let _ = writeln!(out, "    info({}, \"{}\")", name, escape(value));
        }
        for (name, value) in &self.fields {
            // The field name and comma pad to five columns so the values
            // line up, matching the layout operators are used to reading.
            let _ = writeln!(out, "    field({:<5} \"{}\")", format!("{},", name), escape(value));
        }
        out.push_str("}\n");
    }
}

fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}
