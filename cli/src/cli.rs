//! Implements the command line behavior.

use codespan_reporting::{
    diagnostic::{Diagnostic, Label, LabelStyle, Severity},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use std::{
    collections::{HashMap, HashSet},
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use epicsgen_codegen::{
    archive::{collect_channels, generate_group},
    db::generate_db,
    pvtable::{self, PvList, PvTable},
    screen::generate_screens,
};
use epicsgen_dsl::core::FileId;
use epicsgen_problems::Problem;
use epicsgen_sources::{cache::ParseCache, source::Source, startup::Startup};

/// Generates the record database for one driver source.
pub fn db(input: &Path, output: &Path, suppress_output: bool) -> Result<(), String> {
    let (source, unit) = load_unit(input, suppress_output)?;
    let file_id = source.file_id().clone();

    let (text, generated) = generate_db(&unit.params, &file_id);
    let mut diagnostics = unit.warnings;
    diagnostics.extend(generated);

    if let Err(diagnostic) = write_output(output, &text) {
        diagnostics.push(diagnostic);
    }

    let sources = vec![(file_id, source.as_string().to_string())];
    finish(diagnostics, &sources, suppress_output)
}

/// Generates the per-group screen files for one driver source.
pub fn screen(input: &Path, outdir: &Path, suppress_output: bool) -> Result<(), String> {
    let (source, unit) = load_unit(input, suppress_output)?;
    let file_id = source.file_id().clone();

    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("screen"));

    let mut diagnostics = unit.warnings;
    match ensure_dir(outdir) {
        Ok(()) => {
            for screen in generate_screens(&unit.params, &stem) {
                let path = outdir.join(&screen.file_name);
                if let Err(diagnostic) = write_output(&path, &screen.xml) {
                    diagnostics.push(diagnostic);
                }
            }
        }
        Err(diagnostic) => diagnostics.push(diagnostic),
    }

    let sources = vec![(file_id, source.as_string().to_string())];
    finish(diagnostics, &sources, suppress_output)
}

/// Generates snapshot tables for every device the startup descriptor
/// loads, merging into existing tables rather than overwriting them.
pub fn pvtable(
    startup_path: &Path,
    src_dir: &Path,
    outdir: Option<&Path>,
    prefix: Option<&str>,
    force: bool,
    suppress_output: bool,
) -> Result<(), String> {
    let outdir =
        outdir.ok_or_else(|| String::from("Can't derive output directory, use -o to specify it"))?;

    let startup = match Startup::load(startup_path, prefix) {
        Ok(startup) => startup,
        Err(diagnostic) => {
            emit_diagnostics(&[diagnostic], &[], suppress_output);
            return Err(String::from("Invalid IOC startup file"));
        }
    };

    let mut diagnostics = Vec::new();
    if let Err(diagnostic) = ensure_dir(outdir) {
        emit_diagnostics(&[diagnostic], &[], suppress_output);
        return Err(String::from("Can't create output directory"));
    }

    let mut cache = ParseCache::new();
    let mut reported: HashSet<PathBuf> = HashSet::new();
    let mut all_config = Vec::new();

    for device in &startup.devices {
        let src = src_dir.join(format!("{}.cpp", device.plugin));
        let unit = match cache.parse(&src) {
            Ok(unit) => unit,
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                continue;
            }
        };
        // Parse warnings are per source file, not per device instance.
        if reported.insert(src) {
            diagnostics.extend(unit.warnings.iter().cloned());
        }

        for (group, table) in pvtable::group_tables(&unit.params, &device.prefix) {
            if group == "config" {
                all_config.extend(table.pvlist.pvs.iter().cloned());
            }
            let path = outdir.join(format!("{}_{}.pvs", device.device, group));
            if let Err(diagnostic) = write_table(&path, table, force) {
                diagnostics.push(diagnostic);
            }
        }
    }

    // The aggregate table restores every device's configuration at once.
    if !all_config.is_empty() {
        let table = PvTable {
            version: String::from("2.0"),
            pvlist: PvList { pvs: all_config },
        };
        let path = outdir.join("all_config.pvs");
        if let Err(diagnostic) = write_table(&path, table, force) {
            diagnostics.push(diagnostic);
        }
    }

    finish(diagnostics, &[], suppress_output)
}

/// Generates the archiver engine-config fragment for an IOC.
pub fn archive(
    startup_path: &Path,
    src_dir: &Path,
    prefix: Option<&str>,
    output: Option<&Path>,
    suppress_output: bool,
) -> Result<(), String> {
    let startup = match Startup::load(startup_path, prefix) {
        Ok(startup) => startup,
        Err(diagnostic) => {
            emit_diagnostics(&[diagnostic], &[], suppress_output);
            return Err(String::from("Invalid IOC startup file"));
        }
    };

    let mut diagnostics = Vec::new();
    let mut cache = ParseCache::new();
    let mut reported: HashSet<PathBuf> = HashSet::new();
    let mut channels = Vec::new();

    for device in &startup.devices {
        let src = src_dir.join(format!("{}.cpp", device.plugin));
        let unit = match cache.parse(&src) {
            Ok(unit) => unit,
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                continue;
            }
        };
        if reported.insert(src) {
            diagnostics.extend(unit.warnings.iter().cloned());
        }
        channels.extend(collect_channels(&unit.params, &device.prefix));
    }

    let xml = generate_group(&startup.ioc_name, &channels);
    match output {
        Some(path) => {
            if let Err(diagnostic) = write_output(path, &xml) {
                diagnostics.push(diagnostic);
            }
        }
        None => print!("{}", xml),
    }

    finish(diagnostics, &[], suppress_output)
}

fn load_unit(
    input: &Path,
    suppress_output: bool,
) -> Result<(Source, epicsgen_parser::ParsedUnit), String> {
    let source = match Source::try_from_path(input) {
        Ok(source) => source,
        Err(diagnostic) => {
            emit_diagnostics(&[diagnostic], &[], suppress_output);
            return Err(String::from("Unable to read input file"));
        }
    };

    match source.unit() {
        Ok(unit) => Ok((source, unit)),
        Err(diagnostic) => {
            let sources = vec![(source.file_id().clone(), source.as_string().to_string())];
            emit_diagnostics(&[diagnostic], &sources, suppress_output);
            Err(String::from("Unable to parse input file"))
        }
    }
}

/// Emits the accumulated diagnostics, then turns the run into an exit
/// status: warnings alone leave the run successful.
fn finish(
    diagnostics: Vec<epicsgen_dsl::diagnostic::Diagnostic>,
    sources: &[(FileId, String)],
    suppress_output: bool,
) -> Result<(), String> {
    let errors = emit_diagnostics(&diagnostics, sources, suppress_output);
    if errors > 0 {
        return Err(format!("Number of errors: {}", errors));
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), epicsgen_dsl::diagnostic::Diagnostic> {
    fs::create_dir_all(path).map_err(|e| {
        epicsgen_dsl::diagnostic::Diagnostic::problem(
            Problem::CannotWriteFile,
            epicsgen_dsl::diagnostic::Label::file(FileId::from_path(path), e.to_string()),
        )
    })
}

fn write_output(path: &Path, content: &str) -> Result<(), epicsgen_dsl::diagnostic::Diagnostic> {
    log::debug!("Writing {}", path.display());
    fs::write(path, content).map_err(|e| {
        epicsgen_dsl::diagnostic::Diagnostic::problem(
            Problem::CannotWriteFile,
            epicsgen_dsl::diagnostic::Label::file(FileId::from_path(path), e.to_string()),
        )
    })
}

/// Writes one snapshot table. An existing file is merged into unless
/// `--force` was given; an existing file that is not a snapshot table is
/// never overwritten without `--force`.
fn write_table(
    path: &Path,
    table: PvTable,
    force: bool,
) -> Result<(), epicsgen_dsl::diagnostic::Diagnostic> {
    let table = if path.exists() && !force {
        let existing_xml = fs::read_to_string(path).map_err(|e| {
            epicsgen_dsl::diagnostic::Diagnostic::problem(
                Problem::CannotReadFile,
                epicsgen_dsl::diagnostic::Label::file(FileId::from_path(path), e.to_string()),
            )
        })?;
        match pvtable::from_xml(&existing_xml, path.to_string_lossy()) {
            Ok(existing) => pvtable::merge(table, &existing),
            Err(_) => {
                return Err(epicsgen_dsl::diagnostic::Diagnostic::problem(
                    Problem::OutputExists,
                    epicsgen_dsl::diagnostic::Label::file(
                        FileId::from_path(path),
                        "existing file is not a snapshot table; use --force to overwrite",
                    ),
                ));
            }
        }
    } else {
        table
    };

    let xml = pvtable::to_xml(&table)?;
    write_output(path, &xml)
}

/// Prints diagnostics to stderr and returns the number that are errors.
fn emit_diagnostics(
    diagnostics: &[epicsgen_dsl::diagnostic::Diagnostic],
    sources: &[(FileId, String)],
    suppress_output: bool,
) -> usize {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if suppress_output || diagnostics.is_empty() {
        return errors;
    }

    let writer = StandardStream::stderr(ColorChoice::Always);
    let config = codespan_reporting::term::Config::default();

    let mut files: SimpleFiles<String, String> = SimpleFiles::new();
    let mut handles: HashMap<FileId, (usize, String)> = HashMap::new();
    for (file_id, content) in sources {
        let handle = files.add(file_id.to_string(), content.clone());
        handles.insert(file_id.clone(), (handle, content.clone()));
    }

    for diagnostic in diagnostics {
        let (handle, range) = match handles.get(&diagnostic.primary.file_id) {
            Some((handle, content)) => (*handle, line_range(content, diagnostic.primary.line)),
            None => {
                // Diagnostics about files we never loaded (outputs, startup
                // includes) still render with their file name.
                let handle = files.add(diagnostic.primary.file_id.to_string(), String::new());
                handles.insert(
                    diagnostic.primary.file_id.clone(),
                    (handle, String::new()),
                );
                (handle, 0..0)
            }
        };

        let severity = if diagnostic.is_error() {
            Severity::Error
        } else {
            Severity::Warning
        };
        let label = Label::new(LabelStyle::Primary, handle, range)
            .with_message(diagnostic.primary.message.clone());
        let mapped = Diagnostic::new(severity)
            .with_code(diagnostic.code.clone())
            .with_message(diagnostic.description())
            .with_labels(vec![label]);

        let _ = term::emit(&mut writer.lock(), &config, &files, &mapped).map_err(|err| {
            println!("Failed writing to terminal: {}", err);
            1usize
        });
    }

    errors
}

/// The byte range of a 1-indexed line. Line zero refers to the file as a
/// whole and maps to an empty range at the start.
fn line_range(content: &str, line: usize) -> Range<usize> {
    if line == 0 {
        return 0..0;
    }
    let mut offset = 0usize;
    for (index, text) in content.lines().enumerate() {
        if index + 1 == line {
            return offset..offset + text.len();
        }
        offset += text.len() + 1;
    }
    0..0
}
