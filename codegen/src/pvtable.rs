//! Snapshot-table (PVTable) generation and merging.
//!
//! A snapshot table lists the front-end records of one device so operators
//! can capture and restore a known-good configuration. Unlike the other
//! artifacts this one is read back: regenerating over an existing table
//! must not lose the saved values operators captured, so generation is a
//! merge against the previous file rather than a plain overwrite.

use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_dsl::param::Param;
use epicsgen_problems::Problem;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename = "pvtable")]
pub struct PvTable {
    #[serde(rename = "@version")]
    pub version: String,
    pub pvlist: PvList,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PvList {
    #[serde(rename = "pv", default)]
    pub pvs: Vec<Pv>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Pv {
    pub selected: bool,
    pub name: String,
    pub tolerance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_value: Option<String>,
}

/// Builds a fresh table with one entry per parameter. The saved value
/// starts out as the declared default (zero for kinds without one); a
/// later merge replaces it with whatever the operator captured.
pub fn build_table<'a>(params: impl IntoIterator<Item = &'a Param>, prefix: &str) -> PvTable {
    let pvs = params
        .into_iter()
        .map(|param| Pv {
            selected: true,
            name: format!("{}{}", prefix, param.name),
            tolerance: 0.1,
            saved_value: Some(param.default.unwrap_or(0).to_string()),
        })
        .collect();
    PvTable {
        version: String::from("2.0"),
        pvlist: PvList { pvs },
    }
}

/// Splits the unit's parameters into per-group tables, named after
/// [`epicsgen_dsl::param::ParamKind::group`], in declaration order.
pub fn group_tables(params: &[Param], prefix: &str) -> Vec<(&'static str, PvTable)> {
    let mut groups: Vec<(&'static str, Vec<&Param>)> = Vec::new();
    for param in params {
        let group = param.kind.group();
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => members.push(param),
            None => groups.push((group, vec![param])),
        }
    }
    groups
        .into_iter()
        .map(|(group, members)| (group, build_table(members, prefix)))
        .collect()
}

/// Folds an existing table into a freshly generated one. Fresh entries win
/// on membership and order; an entry also present in the existing table
/// keeps its captured state. Existing entries the fresh table does not
/// know about (other devices, retired parameters) are kept at the end.
/// The merge is idempotent.
pub fn merge(fresh: PvTable, existing: &PvTable) -> PvTable {
    let mut pvs: Vec<Pv> = fresh
        .pvlist
        .pvs
        .into_iter()
        .map(|pv| match existing.pvlist.pvs.iter().find(|e| e.name == pv.name) {
            Some(captured) => captured.clone(),
            None => pv,
        })
        .collect();

    for entry in &existing.pvlist.pvs {
        if !pvs.iter().any(|pv| pv.name == entry.name) {
            pvs.push(entry.clone());
        }
    }

    PvTable {
        version: fresh.version,
        pvlist: PvList { pvs },
    }
}

pub fn to_xml(table: &PvTable) -> Result<String, Diagnostic> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 4);
    table
        .serialize(serializer)
        .map_err(|err| serialize_error(err.to_string()))?;
    Ok(format!("<?xml version=\"1.0\"?>\n{}\n", body))
}

pub fn from_xml(xml: &str, file_id: impl Into<String>) -> Result<PvTable, Diagnostic> {
    let file_id = file_id.into();
    quick_xml::de::from_str(xml).map_err(|err| {
        Diagnostic::problem(
            Problem::CannotReadFile,
            Label::file(file_id.as_str(), err.to_string()),
        )
        .with_context("reason", "existing snapshot table is not valid XML")
    })
}

fn serialize_error(message: String) -> Diagnostic {
    Diagnostic::problem(Problem::CannotWriteFile, Label::file("", message))
}
