use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::PathBuf, process::Command};
use tempfile::{tempdir, NamedTempFile};

pub fn path_to_test_resource(name: &'static str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("resources");
    path.push("test");
    path.push(name);
    path
}

fn epicsgen() -> Command {
    Command::cargo_bin("epicsgen").expect("binary must build")
}

#[test]
fn db_when_valid_source_then_creates_database() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new()?;
    let mut cmd = epicsgen();

    cmd.arg("db")
        .arg("-i")
        .arg(path_to_test_resource("RocPlugin_v52.cpp"))
        .arg("-o")
        .arg(output.path());
    cmd.assert().success();

    let text = fs::read_to_string(output.path())?;
    assert!(text.contains("record(mbbo, \"$(P)AcquireMode\")"));
    assert!(text.contains("record(mbbo, \"$(P)AcquireModeS\")"));
    assert!(text.contains("record(calc, \"$(P)TempBoard\")"));

    Ok(())
}

#[test]
fn db_when_not_a_file_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new()?;
    let mut cmd = epicsgen();

    cmd.arg("db")
        .arg("-i")
        .arg("test/file/doesnt/exist")
        .arg("-o")
        .arg(output.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("E0001"));

    Ok(())
}

#[test]
fn db_when_unknown_declaration_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new()?;
    let mut cmd = epicsgen();

    cmd.arg("db")
        .arg("-i")
        .arg(path_to_test_resource("BadPlugin_v10.cpp"))
        .arg("-o")
        .arg(output.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("E0003"));

    Ok(())
}

#[test]
fn db_when_warnings_only_then_ok_with_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new()?;
    let mut cmd = epicsgen();

    cmd.arg("db")
        .arg("-i")
        .arg(path_to_test_resource("WarnPlugin_v10.cpp"))
        .arg("-o")
        .arg(output.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("W0001"))
        .stderr(predicate::str::contains("W0002"));

    Ok(())
}

#[test]
fn screen_when_valid_source_then_creates_group_files() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempdir()?;
    let mut cmd = epicsgen();

    cmd.arg("screen")
        .arg("-i")
        .arg(path_to_test_resource("RocPlugin_v52.cpp"))
        .arg("-o")
        .arg(outdir.path());
    cmd.assert().success();

    let config = fs::read_to_string(outdir.path().join("RocPlugin_v52_config.bob"))?;
    assert!(config.contains("<widget type=\"combo\" version=\"2.0.0\">"));
    assert!(config.contains("<pv_name>$(P)Threshold_Saved</pv_name>"));
    assert!(outdir.path().join("RocPlugin_v52_status.bob").exists());
    assert!(outdir.path().join("RocPlugin_v52_temp.bob").exists());

    Ok(())
}

#[test]
fn pvtable_when_valid_startup_then_creates_tables() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempdir()?;
    let mut cmd = epicsgen();

    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(outdir.path());
    cmd.assert().success();

    let table = fs::read_to_string(outdir.path().join("roc1_config.pvs"))?;
    assert!(table.contains("<pvtable version=\"2.0\">"));
    assert!(table.contains("<name>BL99:Det:roc1:Threshold</name>"));
    assert!(table.contains("<saved_value>400</saved_value>"));

    let aggregate = fs::read_to_string(outdir.path().join("all_config.pvs"))?;
    assert!(aggregate.contains("<name>BL99:Det:roc1:AcquireMode</name>"));
    assert!(aggregate.contains("<name>BL99:Det:roc2:AcquireMode</name>"));

    Ok(())
}

#[test]
fn pvtable_when_run_twice_then_merge_is_stable() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempdir()?;

    let mut cmd = epicsgen();
    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(outdir.path());
    cmd.assert().success();
    let first = fs::read_to_string(outdir.path().join("roc1_config.pvs"))?;

    let mut cmd = epicsgen();
    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(outdir.path());
    cmd.assert().success();
    let second = fs::read_to_string(outdir.path().join("roc1_config.pvs"))?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn pvtable_when_existing_file_not_a_table_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempdir()?;
    fs::write(outdir.path().join("roc1_config.pvs"), "not xml at all")?;

    let mut cmd = epicsgen();
    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(outdir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("E0009"));

    Ok(())
}

#[test]
fn pvtable_when_force_then_overwrites_non_table() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempdir()?;
    fs::write(outdir.path().join("roc1_config.pvs"), "not xml at all")?;

    let mut cmd = epicsgen();
    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(outdir.path())
        .arg("--force");
    cmd.assert().success();

    let table = fs::read_to_string(outdir.path().join("roc1_config.pvs"))?;
    assert!(table.contains("<pvtable version=\"2.0\">"));

    Ok(())
}

#[test]
fn pvtable_when_missing_outdir_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = epicsgen();

    cmd.arg("pvtable")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("-o"));

    Ok(())
}

#[test]
fn archive_when_valid_startup_then_prints_group() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = epicsgen();

    cmd.arg("archive")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<name>bl99-ioc1</name>"))
        .stdout(predicate::str::contains("<name>BL99:Det:roc1:Threshold</name>"))
        .stdout(predicate::str::contains("<name>BL99:Det:roc2:TempBoard</name>"))
        .stdout(predicate::str::contains("<monitor/>"));

    Ok(())
}

#[test]
fn archive_when_output_file_then_written() -> Result<(), Box<dyn std::error::Error>> {
    let output = NamedTempFile::new()?;
    let mut cmd = epicsgen();

    cmd.arg("archive")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-o")
        .arg(output.path());
    cmd.assert().success();

    let xml = fs::read_to_string(output.path())?;
    assert!(xml.contains("<group>"));
    assert!(xml.contains("<period>00:00:01</period>"));

    Ok(())
}

#[test]
fn archive_when_prefix_override_then_channels_renamed() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = epicsgen();

    cmd.arg("archive")
        .arg(path_to_test_resource("st.cmd"))
        .arg("--src-dir")
        .arg(path_to_test_resource(""))
        .arg("-b")
        .arg("BL7:Det");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<name>BL7:Det:roc1:Threshold</name>"));

    Ok(())
}
