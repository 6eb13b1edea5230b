//! IOC startup descriptor (`st.cmd`) parsing.
//!
//! The snapshot-table and archive generators are driven by the devices an
//! IOC actually loads, not by a single source file. The startup descriptor
//! names those devices in `dbLoadRecords` lines such as
//!
//! ```text
//! dbLoadRecords("../../db/RocPlugin_v52.db","P=$(PREFIX)roc1:,PORT=roc1")
//! ```
//!
//! along with `epicsEnvSet` macros for the record-name prefix and the IOC
//! name. Include directives (`< extra.cmd`) are followed one level deep,
//! relative to the descriptor's directory.

use std::collections::HashMap;
use std::path::Path;

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_problems::Problem;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::source::read_file_content;

lazy_static! {
    static ref ENV: Regex =
        Regex::new(r#"^epicsEnvSet[ \t"\(]*(\w+)[, \t"\)]*([^"\n]*)"#).expect("env regex");
    static ref DEVICE: Regex =
        Regex::new(r#"^dbLoadRecords.*".*/(\w+_v\d+)\.db".*P=([^,"]*[:\)](\w+):)"#)
            .expect("device regex");
    static ref INCLUDE: Regex = Regex::new(r"^< *(\S*)").expect("include regex");
}

/// One loaded device: the plugin source stem (`RocPlugin_v52`), the full
/// record-name prefix (`BL99:Det:roc1:`) and the bare device name (`roc1`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInstance {
    pub plugin: String,
    pub prefix: String,
    pub device: String,
}

/// The parts of a startup descriptor the generators consume.
#[derive(Debug)]
pub struct Startup {
    pub prefix: String,
    pub ioc_name: String,
    pub devices: Vec<DeviceInstance>,
}

impl Startup {
    /// Loads and parses a startup descriptor. The command-line prefix, when
    /// given, wins over the `PREFIX` macro in the file; having neither is
    /// an error. The prefix is normalized to end with a colon.
    pub fn load(path: &Path, prefix_override: Option<&str>) -> Result<Startup, Diagnostic> {
        let content = read_file_content(path)?;

        let mut env = HashMap::new();
        for line in content.lines() {
            if let Some(captures) = ENV.captures(line) {
                env.insert(captures[1].to_string(), captures[2].to_string());
            }
        }
        debug!("Found {} macros in {}", env.len(), path.display());

        let prefix = prefix_override
            .map(str::to_string)
            .or_else(|| env.get("PREFIX").cloned())
            .ok_or_else(|| {
                Diagnostic::problem(
                    Problem::InvalidStartupFile,
                    Label::file(
                        FileId::from_path(path),
                        "no PREFIX macro and no prefix given on the command line",
                    ),
                )
            })?;
        let prefix = if prefix.ends_with(':') {
            prefix
        } else {
            format!("{}:", prefix)
        };

        let ioc_name = env.get("IOCNAME").cloned().unwrap_or_else(|| {
            format!("{}_ioc", prefix.trim_end_matches(':').replace(':', "_"))
        });

        let mut devices = Vec::new();
        scan_devices(&content, &prefix, &mut devices);

        // Includes are resolved against the descriptor's directory and
        // followed one level deep.
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for line in content.lines() {
            if let Some(captures) = INCLUDE.captures(line) {
                let include = base.join(&captures[1]);
                debug!("Following include {}", include.display());
                let included = read_file_content(&include)?;
                scan_devices(&included, &prefix, &mut devices);
            }
        }

        Ok(Startup {
            prefix,
            ioc_name,
            devices,
        })
    }
}

fn scan_devices(content: &str, prefix: &str, devices: &mut Vec<DeviceInstance>) {
    let doubled = format!("{}:", prefix);
    for line in content.lines() {
        let line = line.replace(",undefined", "");
        if let Some(captures) = DEVICE.captures(&line) {
            let device_prefix = captures[2]
                .replace("$(PREFIX)", prefix)
                .replace(&doubled, prefix);
            devices.push(DeviceInstance {
                plugin: captures[1].to_string(),
                prefix: device_prefix,
                device: captures[3].to_string(),
            });
        }
    }
}
