use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_library(root: &Path) {
    let family = root.join("fonts").join("Amaranth");
    fs::create_dir_all(&family).expect("family dir");
    fs::write(
        family.join("metadata.json"),
        r#"{"Family": "Amaranth", "Subfamilies": [
            {"Basename": "amaranth-regular", "Formats": ["woff"], "Style": "normal", "Weight": 400}
        ]}"#,
    )
    .expect("metadata");
    fs::write(family.join("amaranth-regular.woff"), b"wOFF").expect("font");

    let templates = root.join("templates");
    fs::create_dir_all(&templates).expect("templates dir");
    fs::write(templates.join("eot.css"), "{{family}}").expect("eot template");
    fs::write(templates.join("woff.css"), "{{family}}").expect("woff template");
}

fn fontcss(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fontcss"))
        .current_dir(root)
        .args(args)
        .output()
        .expect("run fontcss")
}

#[test]
fn version_flag_prints_package_version() {
    let tmp = tempdir().expect("tempdir");
    let output = fontcss(tmp.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout: {stdout}"
    );
}

#[test]
fn empty_whitelist_stops_startup() {
    let tmp = tempdir().expect("tempdir");
    write_library(tmp.path());
    fs::write(tmp.path().join("whitelist.json"), r#"{"Domains": []}"#).expect("whitelist");

    let output = fontcss(tmp.path(), &["-b", "127.0.0.1:0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty whitelist"), "stderr: {stderr}");
}

#[test]
fn empty_library_stops_startup() {
    let tmp = tempdir().expect("tempdir");
    write_library(tmp.path());
    fs::create_dir_all(tmp.path().join("bare")).expect("bare dir");
    fs::write(tmp.path().join("whitelist.json"), r#"{"Domains": [""]}"#).expect("whitelist");

    let output = fontcss(tmp.path(), &["-b", "127.0.0.1:0", "-l", "bare"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty font library"), "stderr: {stderr}");
}

#[test]
fn missing_whitelist_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    write_library(tmp.path());

    let output = fontcss(tmp.path(), &["-b", "127.0.0.1:0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("whitelist.json"), "stderr: {stderr}");
}
