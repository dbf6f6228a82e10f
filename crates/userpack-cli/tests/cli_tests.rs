use assert_cmd::Command;
use indoc::indoc;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn userpack_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("userpack"))
}

const PACKAGE_JSON: &str = r#"{
  "name": "example-mod",
  "version": "1.2.0",
  "description": "Example mod",
  "author": "netux <netux@example.com>",
  "license": "MIT",
  "dependencies": {
    "internet-roadtrip-framework": "^0.4.1-beta"
  },
  "devDependencies": {
    "@violentmonkey/dom": "2.1.7",
    "@violentmonkey/ui": "0.7.9"
  }
}"#;

const META_JS: &str = indoc! {"
    // ==UserScript==
    // @name        placeholder
    // @description placeholder
    // @match       https://neal.fun/internet-roadtrip/*
    // @grant       GM.getValues
    // @grant       GM.setValues
    // ==/UserScript==
"};

const CONFIG: &str = indoc! {r#"
    header: src/meta.js
    payload: build/index.js
    metadata:
      name: Internet Roadtrip - Example
      namespace: me.netux.site/user-scripts/internet-roadtrip/example
    externals:
      - module: internet-roadtrip-framework
        exposeAs: IRF
      - module: "@violentmonkey/dom"
        exposeAs: VM
      - module: "@violentmonkey/ui"
        exposeAs: VM
"#};

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::create_dir_all(temp_dir.path().join("build")).unwrap();
    fs::write(temp_dir.path().join("package.json"), PACKAGE_JSON).unwrap();
    fs::write(temp_dir.path().join("src/meta.js"), META_JS).unwrap();
    fs::write(temp_dir.path().join("build/index.js"), "(function () {})();\n").unwrap();
    fs::write(temp_dir.path().join("userpack.yaml"), CONFIG).unwrap();
    temp_dir
}

// ============================================================================
// PROJECT INITIALIZATION TESTS
// ============================================================================

#[test]
fn test_init_creates_project_files() {
    let temp_dir = TempDir::new().unwrap();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("userpack.yaml"));

    assert!(temp_dir.path().join("userpack.yaml").exists());
    assert!(temp_dir.path().join("src/meta.js").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// PACKAGING TESTS
// ============================================================================

#[test]
fn test_package_to_stdout() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("// ==UserScript==\n"))
        .stdout(predicate::str::contains(
            "// @name         Internet Roadtrip - Example",
        ))
        .stdout(predicate::str::contains("// @version      1.2.0"))
        .stdout(predicate::str::contains("// @author       netux"))
        .stdout(predicate::str::contains("// @license      MIT"))
        .stdout(predicate::str::contains(
            "// @require      https://cdn.jsdelivr.net/npm/combine/internet-roadtrip-framework@0.4.1-beta,@violentmonkey/dom@2.1.7,@violentmonkey/ui@0.7.9",
        ))
        .stdout(predicate::str::ends_with(
            "// ==/UserScript==\n\n(function () {})();\n",
        ))
        .stderr(predicate::str::contains("not locked to a specific version"));
}

#[test]
fn test_package_to_out_file() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--out-file")
        .arg("dist/example.user.js")
        .assert()
        .success();

    let script = fs::read_to_string(temp_dir.path().join("dist/example.user.js")).unwrap();
    assert!(script.starts_with("// ==UserScript==\n"));
    assert!(script.contains("// @grant        GM.getValues\n// @grant        GM.setValues\n"));
}

#[test]
fn test_missing_external_version_fails() {
    let temp_dir = project();
    let config = format!(
        "{}  - module: solid-js\n    exposeAs: Solid\n",
        CONFIG
    );
    fs::write(temp_dir.path().join("userpack.yaml"), config).unwrap();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--out-file")
        .arg("dist/example.user.js")
        .assert()
        .failure()
        .stderr(predicate::str::contains("solid-js"));

    assert!(!temp_dir.path().join("dist/example.user.js").exists());
}

#[test]
fn test_conflicting_header_fails() {
    let temp_dir = project();
    fs::write(
        temp_dir.path().join("src/meta.js"),
        "// ==UserScript==\n// @noframes\n// @noframes yes\n// ==/UserScript==\n",
    )
    .unwrap();

    userpack_cmd()
        .current_dir(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'noframes' was provided twice"));
}

#[test]
fn test_missing_manifest_fails() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--manifest")
        .arg("missing.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

// ============================================================================
// INSPECTION TESTS
// ============================================================================

#[test]
fn test_print_requires() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--print-requires")
        .arg("--cdn-base")
        .arg("https://fastly.jsdelivr.net/npm")
        .assert()
        .success()
        .stdout(
            "https://fastly.jsdelivr.net/npm/combine/internet-roadtrip-framework@0.4.1-beta,@violentmonkey/dom@2.1.7,@violentmonkey/ui@0.7.9\n",
        );
}

#[test]
fn test_print_globals() {
    let temp_dir = project();

    let output = userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--print-globals")
        .output()
        .unwrap();
    assert!(output.status.success());

    let globals: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(globals["internet-roadtrip-framework"], "IRF");
    assert_eq!(globals["@violentmonkey/ui"], "VM");
}

#[test]
fn test_check_normalizes_header() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("// @name         placeholder"))
        .stdout(predicate::str::contains("// @description  placeholder"));
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
fn test_rust_log_enables_debug_output() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .env("RUST_LOG", "debug")
        .env("NO_COLOR", "1")
        .arg("--check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsed 4 metadata key(s)"));
}

#[test]
fn test_default_log_level_is_info() {
    let temp_dir = project();

    userpack_cmd()
        .current_dir(&temp_dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--check")
        .assert()
        .success()
        .stderr(predicate::str::contains("4 metadata key(s)"))
        .stderr(predicate::str::contains("Parsed").not());
}
