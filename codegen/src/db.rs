//! EPICS record graph generation.
//!
//! Device support for the parameter port is unidirectional, so writable
//! parameters cannot live in a single record. Each one becomes a graph of
//! four records (the Mark Rivers bidirectional pattern): the front-end the
//! operator touches, a device-write node, a device-read node, and a sync
//! node that folds device-side changes back into the front-end without
//! re-triggering a write. Read-only parameters stay a single input record,
//! unless a calculation expression interposes a `calc` node over a raw
//! readback.

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_dsl::param::{ArchiveMode, ArchivePolicy, Direction, EnumOption, Param};
use epicsgen_problems::Problem;

use crate::emit::Record;
use crate::topology::{self, Topology};

/// Value, string and severity field mnemonics for the sixteen slots of the
/// multi-state record types, in slot order.
const MNEMONICS: [(&str, &str, &str); 16] = [
    ("ZRVL", "ZRST", "ZRSV"),
    ("ONVL", "ONST", "ONSV"),
    ("TWVL", "TWST", "TWSV"),
    ("THVL", "THST", "THSV"),
    ("FRVL", "FRST", "FRSV"),
    ("FVVL", "FVST", "FVSV"),
    ("SXVL", "SXST", "SXSV"),
    ("SVVL", "SVST", "SVSV"),
    ("EIVL", "EIST", "EISV"),
    ("NIVL", "NIST", "NISV"),
    ("TEVL", "TEST", "TESV"),
    ("ELVL", "ELST", "ELSV"),
    ("TVVL", "TVST", "TVSV"),
    ("TTVL", "TTST", "TTSV"),
    ("FTVL", "FTST", "FTSV"),
    ("FFVL", "FFST", "FFSV"),
];

/// Generates the record database text for one parsed source unit.
///
/// A parameter that cannot be represented (bad two-state keys, too many
/// options) is skipped with an error diagnostic; its siblings still
/// generate. Warnings accumulate alongside.
pub fn generate_db(params: &[Param], file_id: &FileId) -> (String, Vec<Diagnostic>) {
    let mut out = String::new();
    let mut diagnostics = Vec::new();

    for param in params {
        match generate_param(param, file_id, &mut diagnostics) {
            Ok(records) => {
                log::debug!("Generated {} record(s) for {}", records.len(), param.name);
                for record in records {
                    record.render(&mut out);
                }
            }
            Err(diagnostic) => {
                log::warn!("Skipping parameter {}: {}", param.name, diagnostic.description());
                diagnostics.push(diagnostic);
            }
        }
    }

    (out, diagnostics)
}

fn generate_param(
    param: &Param,
    file_id: &FileId,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Vec<Record>, Diagnostic> {
    validate(param, file_id)?;

    match param.direction {
        Direction::InOut => Ok(writable_nodes(param, file_id, warnings)),
        Direction::In => Ok(readonly_nodes(param, file_id, warnings)),
    }
}

/// Representability checks that fail the whole parameter.
fn validate(param: &Param, file_id: &FileId) -> Result<(), Diagnostic> {
    if param.options.len() > MNEMONICS.len() {
        return Err(Diagnostic::problem(
            Problem::TooManyOptions,
            Label::line(
                file_id.clone(),
                param.line,
                format!("{} options declared", param.options.len()),
            ),
        )
        .with_context("parameter", &param.name));
    }
    if topology::underlying(param) == Topology::TwoState {
        let mut keys: Vec<i64> = param.options.iter().map(|o| o.key).collect();
        keys.sort_unstable();
        if keys != [0, 1] {
            return Err(Diagnostic::problem(
                Problem::InvalidTwoStateKeys,
                Label::line(
                    file_id.clone(),
                    param.line,
                    format!("option keys are {:?}", keys),
                ),
            )
            .with_context("parameter", &param.name));
        }
    }
    Ok(())
}

/// The output and input record types for the parameter's value encoding.
fn record_types(param: &Param) -> (&'static str, &'static str) {
    match topology::underlying(param) {
        Topology::TwoState => ("bo", "bi"),
        Topology::MultiState => ("mbbo", "mbbi"),
        Topology::ScaledAnalog => ("ao", "ai"),
        Topology::PlainInteger | Topology::Derived => ("longout", "longin"),
    }
}

fn archive_info(record: &mut Record, policy: &Option<ArchivePolicy>) {
    if let Some(policy) = policy {
        let mode = match policy.mode {
            ArchiveMode::Monitor => "Monitor",
            ArchiveMode::Scan => "Scan",
        };
        record.info(
            "archive",
            format!("{}, {}, {}", mode, policy.period, policy.fields),
        );
    }
}

/// The four-node bidirectional pattern, plus calcout interposers when the
/// parameter carries calculation expressions.
fn writable_nodes(param: &Param, file_id: &FileId, warnings: &mut Vec<Diagnostic>) -> Vec<Record> {
    let (out_type, in_type) = record_types(param);
    let name = &param.name;
    let mut records = Vec::new();

    // Front-end record: the one operators and clients use.
    let mut front = Record::new(out_type, format!("$(P){}", name));
    archive_info(&mut front, &param.archive);
    front.info("autosaveFields", "VAL");
    front.field("ASG", "BEAMLINE");
    front.field("DESC", param.description.as_str());
    front.field("PINI", "YES");
    if param.calc_write.is_some() {
        front.field("OUT", format!("$(P){}_WCalc PP", name));
    } else {
        front.field("OUT", format!("$(P){}W PP", name));
    }
    if topology::underlying(param) == Topology::PlainInteger {
        let (low, high) = topology::bounds(param.layout.width(), param.conversion);
        front.field("LOPR", low.to_string());
        front.field("HOPR", high.to_string());
    }
    value_table(&mut front, param, param.default, file_id, Some(warnings));
    records.push(front);

    if let Some(calc_write) = &param.calc_write {
        let mut wcalc = Record::new("calcout", format!("$(P){}_WCalc", name));
        wcalc.field("INPA", format!("$(P){} NPP", name));
        wcalc.field("CALC", calc_write.as_str());
        wcalc.field("OUT", format!("$(P){}W PP", name));
        wcalc.field("OOPT", "Every Time");
        wcalc.field("SDIS", format!("$(P){}S.PACT", name));
        wcalc.field("DISV", "1");
        records.push(wcalc);
    }

    // Device-write node. Disabled while the sync node is processing so a
    // device-side change does not bounce back to the device.
    let mut write = Record::new(out_type, format!("$(P){}W", name));
    write.field("ASG", "BEAMLINE");
    write.field("DESC", param.description.as_str());
    write.field("DTYP", "asynInt32");
    write.field("OUT", format!("@asyn($(PORT)){}", name));
    write.field("SDIS", format!("$(P){}S.PACT", name));
    write.field("DISV", "1");
    value_table(&mut write, param, None, file_id, None);
    records.push(write);

    // Device-read node, processed on device interrupts.
    let mut read = Record::new(in_type, format!("$(P){}R", name));
    read.field("DTYP", "asynInt32");
    read.field("DESC", param.description.as_str());
    read.field("INP", format!("@asyn($(PORT)){}", name));
    read.field("SCAN", "I/O Intr");
    if param.calc_read.is_some() {
        read.field("FLNK", format!("$(P){}_RCalc", name));
    } else {
        read.field("FLNK", format!("$(P){}S", name));
    }
    value_table(&mut read, param, None, file_id, None);
    records.push(read);

    if let Some(calc_read) = &param.calc_read {
        let mut rcalc = Record::new("calcout", format!("$(P){}_RCalc", name));
        rcalc.field("INPA", format!("$(P){}R NPP", name));
        if let Some(link) = &param.calc_link {
            rcalc.field("INPB", format!("$(P){} NPP", link));
        }
        rcalc.field("CALC", calc_read.as_str());
        rcalc.field("OUT", format!("$(P){}S PP", name));
        rcalc.field("SDIS", format!("$(P){}W.PACT", name));
        rcalc.field("DISV", "1");
        records.push(rcalc);
    }

    // Sync node: folds device-side changes into the front-end without
    // re-triggering the write chain.
    let mut sync = Record::new(out_type, format!("$(P){}S", name));
    if param.calc_read.is_some() {
        sync.field("DOL", format!("$(P){}_RCalc NPP", name));
    } else {
        sync.field("DOL", format!("$(P){}R NPP", name));
    }
    sync.field("OMSL", "closed_loop");
    sync.field("OUT", format!("$(P){} PP", name));
    value_table(&mut sync, param, None, file_id, None);
    records.push(sync);

    records
}

/// A single input record, or a calc node over a raw readback when a read
/// calculation is present.
fn readonly_nodes(param: &Param, file_id: &FileId, warnings: &mut Vec<Diagnostic>) -> Vec<Record> {
    let (_, in_type) = record_types(param);
    let name = &param.name;

    let Some(calc_read) = &param.calc_read else {
        let mut record = Record::new(in_type, format!("$(P){}", name));
        archive_info(&mut record, &param.archive);
        record.field("DESC", param.description.as_str());
        record.field("DTYP", "asynInt32");
        record.field("INP", format!("@asyn($(PORT)){}", name));
        record.field("SCAN", "I/O Intr");
        value_table(&mut record, param, None, file_id, Some(warnings));
        return vec![record];
    };

    let mut calc = Record::new("calc", format!("$(P){}", name));
    archive_info(&mut calc, &param.archive);
    calc.field("DESC", param.description.as_str());
    calc.field("INPA", format!("$(P){}_Raw NPP", name));
    if let Some(link) = &param.calc_link {
        calc.field("INPB", format!("$(P){} NPP", link));
    }
    calc.field("CALC", calc_read.as_str());
    numeric_fields(&mut calc, param);

    let mut raw = Record::new(in_type, format!("$(P){}_Raw", name));
    raw.field("FLNK", format!("$(P){}", name));
    raw.field("DESC", param.description.as_str());
    raw.field("DTYP", "asynInt32");
    raw.field("INP", format!("@asyn($(PORT)){}", name));
    raw.field("SCAN", "I/O Intr");

    vec![calc, raw]
}

/// Appends the value-encoding fields for the parameter's shape. The default
/// (and the warning sink for a default that matches no option) is supplied
/// only for the front-end node so the warning fires once per parameter.
fn value_table(
    record: &mut Record,
    param: &Param,
    default: Option<i64>,
    file_id: &FileId,
    warnings: Option<&mut Vec<Diagnostic>>,
) {
    match topology::underlying(param) {
        Topology::TwoState => {
            // validate() pinned the keys to exactly {0, 1}.
            let zero = param.options.iter().find(|o| o.key == 0);
            let one = param.options.iter().find(|o| o.key == 1);
            if let (Some(zero), Some(one)) = (zero, one) {
                two_state_fields(record, zero, one);
                match default {
                    Some(value @ (0 | 1)) => record.field("VAL", value.to_string()),
                    Some(value) => default_not_found(param, value, file_id, warnings),
                    None => {}
                }
            }
        }
        Topology::MultiState => {
            let mut val = None;
            for (option, &(vl, st, sv)) in param.options.iter().zip(MNEMONICS.iter()) {
                record.field(vl, option.key.to_string());
                record.field(st, option.label.as_str());
                if option.alarm {
                    record.field(sv, "MAJOR");
                }
                // The selector is the slot position, not the key; options
                // may be declared out of numeric order.
                if default == Some(option.key) {
                    val = param.option_position(option.key);
                }
            }
            match (default, val) {
                (Some(_), Some(position)) => record.field("VAL", position.to_string()),
                (Some(default), None) => default_not_found(param, default, file_id, warnings),
                (None, _) => {}
            }
        }
        Topology::ScaledAnalog => {
            record.field("LINR", "SLOPE");
            if let Some(scale) = param.scale {
                record.field("ESLO", scale.to_string());
            }
            if let Some(offset) = param.offset_term {
                record.field("EOFF", offset.to_string());
            }
            if let Some(default) = default {
                record.field("VAL", default.to_string());
            }
            numeric_fields(record, param);
        }
        Topology::PlainInteger | Topology::Derived => {
            if let Some(default) = default {
                record.field("VAL", default.to_string());
            }
            numeric_fields(record, param);
        }
    }
}

fn two_state_fields(record: &mut Record, zero: &EnumOption, one: &EnumOption) {
    record.field("ZNAM", zero.label.as_str());
    if zero.alarm {
        record.field("ZSV", "MAJOR");
    }
    record.field("ONAM", one.label.as_str());
    if one.alarm {
        record.field("OSV", "MAJOR");
    }
}

/// Display and alarm metadata for numeric shapes.
fn numeric_fields(record: &mut Record, param: &Param) {
    if let Some(prec) = &param.precision {
        record.field("PREC", prec.as_str());
    }
    if let Some(unit) = &param.unit {
        record.field("EGU", unit.as_str());
    }
    if let Some(low) = &param.low_limit {
        record.field("LOW", low.as_str());
        record.field("LSV", "MAJOR");
    }
    if let Some(high) = &param.high_limit {
        record.field("HIGH", high.as_str());
        record.field("HSV", "MAJOR");
    }
}

fn default_not_found(
    param: &Param,
    default: i64,
    file_id: &FileId,
    warnings: Option<&mut Vec<Diagnostic>>,
) {
    if let Some(warnings) = warnings {
        warnings.push(
            Diagnostic::problem(
                Problem::DefaultNotInOptions,
                Label::line(
                    file_id.clone(),
                    param.line,
                    format!("default value {} matches no option key", default),
                ),
            )
            .with_context("parameter", &param.name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epicsgen_parser::parse_unit;

    fn generate(source: &str) -> (String, Vec<Diagnostic>) {
        let file_id = FileId::from_string("Plugin.cpp");
        let unit = parse_unit(source, &file_id).expect("must parse");
        generate_db(&unit.params, &file_id)
    }

    #[test]
    fn generate_db_when_multi_state_config_then_four_node_pattern() {
        let source = "createConfigParam(\"AcquireMode\", 'F', 0x0, 2, 4, 0); \
                      // Acquire mode (0=normal,1=verbose,2=fakedata,3=trigger)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert_eq!(
            db,
            "record(mbbo, \"$(P)AcquireMode\")\n\
             {\n\
            \x20   info(autosaveFields, \"VAL\")\n\
            \x20   field(ASG,  \"BEAMLINE\")\n\
            \x20   field(DESC, \"Acquire mode\")\n\
            \x20   field(PINI, \"YES\")\n\
            \x20   field(OUT,  \"$(P)AcquireModeW PP\")\n\
            \x20   field(ZRVL, \"0\")\n\
            \x20   field(ZRST, \"normal\")\n\
            \x20   field(ONVL, \"1\")\n\
            \x20   field(ONST, \"verbose\")\n\
            \x20   field(TWVL, \"2\")\n\
            \x20   field(TWST, \"fakedata\")\n\
            \x20   field(THVL, \"3\")\n\
            \x20   field(THST, \"trigger\")\n\
            \x20   field(VAL,  \"0\")\n\
             }\n\
             record(mbbo, \"$(P)AcquireModeW\")\n\
             {\n\
            \x20   field(ASG,  \"BEAMLINE\")\n\
            \x20   field(DESC, \"Acquire mode\")\n\
            \x20   field(DTYP, \"asynInt32\")\n\
            \x20   field(OUT,  \"@asyn($(PORT))AcquireMode\")\n\
            \x20   field(SDIS, \"$(P)AcquireModeS.PACT\")\n\
            \x20   field(DISV, \"1\")\n\
            \x20   field(ZRVL, \"0\")\n\
            \x20   field(ZRST, \"normal\")\n\
            \x20   field(ONVL, \"1\")\n\
            \x20   field(ONST, \"verbose\")\n\
            \x20   field(TWVL, \"2\")\n\
            \x20   field(TWST, \"fakedata\")\n\
            \x20   field(THVL, \"3\")\n\
            \x20   field(THST, \"trigger\")\n\
             }\n\
             record(mbbi, \"$(P)AcquireModeR\")\n\
             {\n\
            \x20   field(DTYP, \"asynInt32\")\n\
            \x20   field(DESC, \"Acquire mode\")\n\
            \x20   field(INP,  \"@asyn($(PORT))AcquireMode\")\n\
            \x20   field(SCAN, \"I/O Intr\")\n\
            \x20   field(FLNK, \"$(P)AcquireModeS\")\n\
            \x20   field(ZRVL, \"0\")\n\
            \x20   field(ZRST, \"normal\")\n\
            \x20   field(ONVL, \"1\")\n\
            \x20   field(ONST, \"verbose\")\n\
            \x20   field(TWVL, \"2\")\n\
            \x20   field(TWST, \"fakedata\")\n\
            \x20   field(THVL, \"3\")\n\
            \x20   field(THST, \"trigger\")\n\
             }\n\
             record(mbbo, \"$(P)AcquireModeS\")\n\
             {\n\
            \x20   field(DOL,  \"$(P)AcquireModeR NPP\")\n\
            \x20   field(OMSL, \"closed_loop\")\n\
            \x20   field(OUT,  \"$(P)AcquireMode PP\")\n\
            \x20   field(ZRVL, \"0\")\n\
            \x20   field(ZRST, \"normal\")\n\
            \x20   field(ONVL, \"1\")\n\
            \x20   field(ONST, \"verbose\")\n\
            \x20   field(TWVL, \"2\")\n\
            \x20   field(TWST, \"fakedata\")\n\
            \x20   field(THVL, \"3\")\n\
            \x20   field(THST, \"trigger\")\n\
             }\n"
        );
    }

    #[test]
    fn generate_db_when_two_state_status_then_single_bi_with_alarm() {
        let source = "createStatusParam(\"Acquiring\", 0x1, 1, 3); \
                      // Acquiring data (0=not acquiring [alarm],1=acquiring)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert_eq!(
            db,
            "record(bi, \"$(P)Acquiring\")\n\
             {\n\
            \x20   field(DESC, \"Acquiring data\")\n\
            \x20   field(DTYP, \"asynInt32\")\n\
            \x20   field(INP,  \"@asyn($(PORT))Acquiring\")\n\
            \x20   field(SCAN, \"I/O Intr\")\n\
            \x20   field(ZNAM, \"not acquiring\")\n\
            \x20   field(ZSV,  \"MAJOR\")\n\
            \x20   field(ONAM, \"acquiring\")\n\
             }\n"
        );
    }

    #[test]
    fn generate_db_when_multi_state_keys_out_of_order_then_val_is_position() {
        let source = "createConfigParam(\"Mode\", 'F', 0x0, 2, 0, 2); \
                      // Mode (2=fast,0=slow)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert!(db.contains("field(ZRVL, \"2\")"));
        assert!(db.contains("field(ZRST, \"fast\")"));
        assert!(db.contains("field(ONVL, \"0\")"));
        // Default key 2 sits in slot 0, so the selector is 0.
        assert!(db.contains("field(VAL,  \"0\")"));
    }

    #[test]
    fn generate_db_when_default_not_in_options_then_warning_and_no_val() {
        let source = "createConfigParam(\"Mode\", 'F', 0x0, 2, 0, 7); \
                      // Mode (0=slow,1=fast)\n";

        let (db, diagnostics) = generate(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::DefaultNotInOptions.code());
        assert!(!diagnostics[0].is_error());
        assert!(!db.contains("field(VAL,"));
    }

    #[test]
    fn generate_db_when_two_state_keys_invalid_then_error_and_siblings_survive() {
        let source = "\
            createStatusParam(\"Bad\", 0x0, 1, 0); // Bad flag (0=ok,2=bad)\n\
            createStatusParam(\"Good\", 0x0, 1, 1); // Good flag (0=no,1=yes)\n";

        let (db, diagnostics) = generate(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::InvalidTwoStateKeys.code());
        assert!(diagnostics[0].is_error());
        assert!(!db.contains("$(P)Bad"));
        assert!(db.contains("record(bi, \"$(P)Good\")"));
    }

    #[test]
    fn generate_db_when_more_than_sixteen_options_then_error() {
        let options: Vec<String> = (0..17).map(|i| format!("{}=opt{}", i, i)).collect();
        let source = format!(
            "createConfigParam(\"Wide\", 'F', 0x0, 8, 0, 0); // Wide ({})\n",
            options.join(",")
        );

        let (db, diagnostics) = generate(&source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::TooManyOptions.code());
        assert!(diagnostics[0].is_error());
        assert!(db.is_empty());
    }

    #[test]
    fn generate_db_when_plain_integer_config_then_bounds_and_default() {
        let source = "createConfigParam(\"Threshold\", 'E', 0x4, 12, 0, 400); \
                      // Detection threshold (unit:mV,low:10,high:4000)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert!(db.contains("record(longout, \"$(P)Threshold\")"));
        assert!(db.contains("field(LOPR, \"0\")"));
        assert!(db.contains("field(HOPR, \"4095\")"));
        assert!(db.contains("field(VAL,  \"400\")"));
        assert!(db.contains("field(EGU,  \"mV\")"));
        assert!(db.contains("field(LOW,  \"10\")"));
        assert!(db.contains("field(LSV,  \"MAJOR\")"));
        assert!(db.contains("field(HIGH, \"4000\")"));
        assert!(db.contains("field(HSV,  \"MAJOR\")"));
        assert!(db.contains("record(longin, \"$(P)ThresholdR\")"));
    }

    #[test]
    fn generate_db_when_signed_conversion_then_negative_lower_bound() {
        let source = "createConfigParam(\"Offset\", 'E', 0x8, 16, 0, 0, CONV_SIGN_2COMP); \
                      // Position offset\n";

        let (db, _) = generate(source);

        assert!(db.contains("field(LOPR, \"-32768\")"));
        assert!(db.contains("field(HOPR, \"32767\")"));
    }

    #[test]
    fn generate_db_when_scaled_then_analog_records_with_slope() {
        let source = "createConfigParam(\"Delay\", 'F', 0x2, 16, 0, 100); \
                      // Trigger delay (scale:0.1,unit:ns,prec:1)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert!(db.contains("record(ao, \"$(P)Delay\")"));
        assert!(db.contains("record(ai, \"$(P)DelayR\")"));
        assert!(db.contains("field(LINR, \"SLOPE\")"));
        assert!(db.contains("field(ESLO, \"0.1\")"));
        assert!(db.contains("field(PREC, \"1\")"));
        assert!(db.contains("field(EGU,  \"ns\")"));
        assert!(!db.contains("LOPR"));
    }

    #[test]
    fn generate_db_when_scale_and_offset_then_eslo_and_eoff() {
        let source = "createConfigParam(\"Position\", 'F', 0x8, 16, 0, 0); \
                      // Detector position (scale:0.5,offset:10)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert!(db.contains("field(ESLO, \"0.5\")"));
        assert!(db.contains("field(EOFF, \"10\")"));
        assert!(!db.contains("ZRVL"));
    }

    #[test]
    fn generate_db_when_readonly_derived_then_calc_over_raw_pair() {
        let source = "createTempParam(\"TempBoard\", 0x0, 16, 0, CONV_SIGN_2COMP); \
                      // Board temperature (calc:A/16,unit:C,prec:1,archive:monitor)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert_eq!(
            db,
            "record(calc, \"$(P)TempBoard\")\n\
             {\n\
            \x20   info(archive, \"Monitor, 00:00:01, VAL\")\n\
            \x20   field(DESC, \"Board temperature\")\n\
            \x20   field(INPA, \"$(P)TempBoard_Raw NPP\")\n\
            \x20   field(CALC, \"A/16\")\n\
            \x20   field(PREC, \"1\")\n\
            \x20   field(EGU,  \"C\")\n\
             }\n\
             record(longin, \"$(P)TempBoard_Raw\")\n\
             {\n\
            \x20   field(FLNK, \"$(P)TempBoard\")\n\
            \x20   field(DESC, \"Board temperature\")\n\
            \x20   field(DTYP, \"asynInt32\")\n\
            \x20   field(INP,  \"@asyn($(PORT))TempBoard\")\n\
            \x20   field(SCAN, \"I/O Intr\")\n\
             }\n"
        );
    }

    #[test]
    fn generate_db_when_readonly_derived_with_link_then_inpb() {
        let source = "createStatusParam(\"RatePercent\", 0x2, 16, 0); \
                      // Rate in percent (calc:A*100/B,calclink:RateMax)\n";

        let (db, _) = generate(source);

        assert!(db.contains("field(INPA, \"$(P)RatePercent_Raw NPP\")"));
        assert!(db.contains("field(INPB, \"$(P)RateMax NPP\")"));
        assert!(db.contains("field(CALC, \"A*100/B\")"));
    }

    #[test]
    fn generate_db_when_writable_derived_then_calcout_interposers() {
        let source = "createConfigParam(\"Window\", 'F', 0x4, 16, 0, 100); \
                      // Window width (calcread:A*10,calcwrite:A/10,unit:ns)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        // Front-end writes through the write-side transform.
        assert!(db.contains("field(OUT,  \"$(P)Window_WCalc PP\")"));
        assert!(db.contains("record(calcout, \"$(P)Window_WCalc\")"));
        assert!(db.contains("field(CALC, \"A/10\")"));
        assert!(db.contains("field(OOPT, \"Every Time\")"));
        // Device readback routes through the read-side transform.
        assert!(db.contains("field(FLNK, \"$(P)Window_RCalc\")"));
        assert!(db.contains("record(calcout, \"$(P)Window_RCalc\")"));
        assert!(db.contains("field(CALC, \"A*10\")"));
        assert!(db.contains("field(DOL,  \"$(P)Window_RCalc NPP\")"));
    }

    #[test]
    fn generate_db_when_writable_derived_with_link_then_inpb_in_read_calc() {
        let source = "createConfigParam(\"Window\", 'F', 0x4, 16, 0, 100); \
                      // Window width (calcread:A*2,calcwrite:A/2,calclink:WindowMax,unit:ns)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        let rcalc = db
            .split("record(calcout, \"$(P)Window_RCalc\")")
            .nth(1)
            .expect("read-side calcout block");
        let rcalc = rcalc.split('}').next().expect("block body");
        assert!(rcalc.contains("field(INPA, \"$(P)WindowR NPP\")"));
        assert!(rcalc.contains("field(INPB, \"$(P)WindowMax NPP\")"));
        assert!(rcalc.contains("field(CALC, \"A*2\")"));
        assert!(rcalc.contains("field(OUT,  \"$(P)WindowS PP\")"));
    }

    #[test]
    fn generate_db_when_archived_then_info_on_front_end_only() {
        let source = "createConfigParam(\"Rate\", 'F', 0x6, 16, 0, 0); \
                      // Event rate (archive:monitor)\n";

        let (db, _) = generate(source);

        assert_eq!(db.matches("info(archive, \"Monitor, 00:00:01, VAL\")").count(), 1);
        let front = db.split("record(").nth(1).expect("front-end block");
        assert!(front.contains("info(archive,"));
    }

    #[test]
    fn generate_db_when_meta_config_then_writable_pattern_without_address() {
        let source = "createMetaConfigParam(\"SaveFile\", 1, 0); // Save to file (0=no,1=yes)\n";

        let (db, diagnostics) = generate(source);

        assert!(diagnostics.is_empty());
        assert!(db.contains("record(bo, \"$(P)SaveFile\")"));
        assert!(db.contains("record(bo, \"$(P)SaveFileW\")"));
        assert!(db.contains("record(bi, \"$(P)SaveFileR\")"));
        assert!(db.contains("record(bo, \"$(P)SaveFileS\")"));
        assert!(db.contains("field(VAL,  \"0\")"));
    }
}
