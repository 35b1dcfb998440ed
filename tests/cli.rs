// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use tempfile::tempdir;

/// A `jbuild` command whose tools can never be found, so runs stay hermetic.
fn jbuild(dir: &Path) -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("jbuild"));
  cmd
    .current_dir(dir)
    .env("CLICOLOR", "0")
    .env("NO_COLOR", "1")
    .env("RUST_LOG", "info")
    .env("JBUILD_TOOLS__JAVAC", "jbuild-test-missing-javac")
    .env("JBUILD_TOOLS__JAR", "jbuild-test-missing-jar")
    .env("JBUILD_TOOLS__JAVADOC", "jbuild-test-missing-javadoc")
    .env("JBUILD_TOOLS__JAVA", "jbuild-test-missing-java")
    .env_remove("JBUILD_LOG_FILE")
    .env_remove("JBUILD_CONFIG");
  cmd
}

fn project(name: &str) -> (TempDir, PathBuf) {
  let temp = tempdir().unwrap();
  let root = temp.path().join(name);
  let pkg = root.join("src/main/java/com/example");
  fs::create_dir_all(root.join("lib")).unwrap();
  fs::create_dir_all(&pkg).unwrap();
  fs::write(pkg.join("Main.java"), "package com.example;\npublic class Main {}\n").unwrap();
  fs::write(pkg.join("Util.java"), "package com.example;\nclass Util {}\n").unwrap();
  (temp, root)
}

#[test]
fn test_missing_lib_dir_fails() {
  let temp = tempdir().unwrap();
  let root = temp.path().join("app");
  fs::create_dir_all(root.join("src")).unwrap();

  jbuild(&root)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Directory not found: lib/"));

  assert!(!root.join("bin").exists());
}

#[test]
fn test_missing_src_dir_fails() {
  let temp = tempdir().unwrap();
  let root = temp.path().join("app");
  fs::create_dir_all(root.join("lib")).unwrap();

  jbuild(&root)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Directory not found: src/main/java/ or src/"));
}

#[test]
fn test_invalid_project_name_fails_without_output() {
  let (_temp, root) = project("not valid");

  jbuild(&root)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid project directory name 'not valid'"));

  assert!(!root.join("bin").exists());
}

#[test]
fn test_more_than_one_argument_is_a_usage_error() {
  let (_temp, root) = project("app");

  jbuild(&root)
    .arg("com.example.Main")
    .arg("extra")
    .assert()
    .code(2);
}

#[test]
fn test_library_build_completes_even_without_tools() {
  let (_temp, root) = project("app");

  jbuild(&root)
    .assert()
    .success()
    .stdout(predicate::str::contains("Building app"))
    .stdout(predicate::str::contains("Total time:"))
    .stderr(predicate::str::contains("Creating library (no main class provided)"))
    .stderr(predicate::str::contains("Compiler could not be started"));

  assert!(root.join("bin").is_dir());
  assert!(!root.join("app").exists());
}

#[test]
fn test_executable_build_writes_launchers_and_report() {
  let (_temp, root) = project("app");
  let report_path = root.join("report.json");

  jbuild(&root)
    .arg("com.example.Main")
    .arg("--report-path")
    .arg(&report_path)
    .assert()
    .success()
    .stderr(predicate::str::contains(
      "Creating executable for main class: com.example.Main",
    ));

  let unix = fs::read_to_string(root.join("app")).unwrap();
  let windows = fs::read_to_string(root.join("app.bat")).unwrap();
  assert!(unix.contains("java -cp \"bin/*:lib/*\" com.example.Main"));
  assert!(windows.contains("java -cp \"bin\\*;lib\\*\" com.example.Main %*"));

  let report: Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
  assert_eq!(report["project"], "app");
  assert_eq!(report["entry_point"], "com.example.Main");
  assert_eq!(report["source_layout"], "conventional");
  assert_eq!(report["sources"], 2);
  assert_eq!(report["compile"]["state"], "not_started");
  assert_eq!(report["units"][0]["unit"], "com.example.Util");
  assert_eq!(report["units"][0]["outcome"], "not_started");
  assert_eq!(report["units"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_file_selects_flat_layout() {
  let temp = tempdir().unwrap();
  let root = temp.path().join("both");
  fs::create_dir_all(root.join("lib")).unwrap();
  fs::create_dir_all(root.join("src/main/java")).unwrap();
  fs::write(root.join("src/Flat.java"), "class Flat {}\n").unwrap();
  fs::write(
    root.join("jbuild.toml"),
    "[profile]\nsource_layout = \"flat\"\n",
  )
  .unwrap();
  let report_path = root.join("report.json");

  jbuild(&root)
    .arg("--report-path")
    .arg(&report_path)
    .assert()
    .success();

  let report: Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
  assert_eq!(report["source_layout"], "flat");
  assert_eq!(report["sources"], 1);
}
