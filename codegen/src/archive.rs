//! Archiver engine-config generation.
//!
//! Emits one `<group>` fragment per run with a `<channel>` for every
//! archived front-end record. The fragment is meant to be pasted into the
//! archiver's engine configuration, so it is indented as a child of the
//! document root.

use std::fmt::Write;

use epicsgen_dsl::param::{ArchiveMode, Param};

use crate::screen::xml_escape;

/// One archiver channel: a full record name and its sampling policy.
pub struct ArchiveChannel {
    pub name: String,
    pub period: String,
    pub mode: ArchiveMode,
}

/// Collects the archived parameters of one unit as channels with the given
/// record-name prefix. Parameters without an archive policy do not appear.
pub fn collect_channels(params: &[Param], prefix: &str) -> Vec<ArchiveChannel> {
    params
        .iter()
        .filter_map(|param| {
            param.archive.as_ref().map(|policy| ArchiveChannel {
                name: format!("{}{}", prefix, param.name),
                period: policy.period.clone(),
                mode: policy.mode,
            })
        })
        .collect()
}

/// Renders the engine-config `<group>` fragment.
pub fn generate_group(group_name: &str, channels: &[ArchiveChannel]) -> String {
    let mut xml = String::new();
    xml.push_str("    <group>\n");
    let _ = writeln!(xml, "        <name>{}</name>", xml_escape(group_name));
    for channel in channels {
        xml.push_str("        <channel>\n");
        let _ = writeln!(xml, "            <name>{}</name>", xml_escape(&channel.name));
        let _ = writeln!(xml, "            <period>{}</period>", channel.period);
        match channel.mode {
            ArchiveMode::Monitor => xml.push_str("            <monitor/>\n"),
            ArchiveMode::Scan => xml.push_str("            <scan/>\n"),
        }
        xml.push_str("        </channel>\n");
    }
    xml.push_str("    </group>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use epicsgen_dsl::core::FileId;
    use epicsgen_parser::parse_unit;

    fn channels(source: &str) -> Vec<ArchiveChannel> {
        let unit = parse_unit(source, &FileId::default()).expect("must parse");
        collect_channels(&unit.params, "BL99:Det:dsp1:")
    }

    #[test]
    fn collect_channels_when_not_archived_then_excluded() {
        let channels = channels(
            "createStatusParam(\"Acquiring\", 0x1, 1, 3); // Acquiring data\n\
             createTempParam(\"TempBoard\", 0x0, 16, 0); // Board temp (archive:monitor)\n",
        );

        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "BL99:Det:dsp1:TempBoard");
        assert_eq!(channels[0].period, "00:00:01");
    }

    #[test]
    fn generate_group_when_monitor_then_monitor_element() {
        let channels = channels(
            "createTempParam(\"TempBoard\", 0x0, 16, 0); // Board temp (archive:monitor)\n",
        );

        let xml = generate_group("bl99_ioc", &channels);

        assert_eq!(
            xml,
            "    <group>\n\
            \x20       <name>bl99_ioc</name>\n\
            \x20       <channel>\n\
            \x20           <name>BL99:Det:dsp1:TempBoard</name>\n\
            \x20           <period>00:00:01</period>\n\
            \x20           <monitor/>\n\
            \x20       </channel>\n\
            \x20   </group>\n"
        );
    }

    #[test]
    fn generate_group_when_scan_then_scan_element() {
        let channels =
            channels("createStatusParam(\"Rate\", 0x2, 16, 0); // Event rate (archive:scan)\n");

        let xml = generate_group("bl99_ioc", &channels);

        assert!(xml.contains("<scan/>"));
        assert!(!xml.contains("<monitor/>"));
    }
}
