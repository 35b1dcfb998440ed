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
use crate::command::CommandRunner;
use crate::command::Invocation;
use crate::command::ToolStatus;
use crate::manifest::BuildManifest;
use crate::manifest::unit_name;
use serde::Serialize;
use std::path::Path;
use tracing::Instrument;

/// What the launcher prints when a class has no `main` method.
pub const NO_MAIN_DIAGNOSTIC: &str = "Error: Main method not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Passed,
  NoTests,
  Failed,
  NotStarted,
}

/// The result of launching one compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutcome {
  pub unit: String,
  pub outcome: Outcome,
}

/// Shared arguments for every unit launch.
#[derive(Debug, Clone)]
pub struct Harness<'a> {
  pub java: &'a str,
  pub search_path: &'a str,
  pub root: &'a Path,
  pub entry_point: Option<&'a str>,
}

impl Harness<'_> {
  /// Launches every unit in the manifest except the entry point, one at a time.
  ///
  /// A failing unit never stops the loop.
  pub async fn run_all<R: CommandRunner>(
    &self,
    runner: &mut R,
    manifest: &BuildManifest,
  ) -> Vec<UnitOutcome> {
    let mut outcomes = Vec::new();

    for path in manifest.files() {
      let unit = match unit_name(path) {
        Ok(unit) => unit,
        Err(e) => {
          tracing::error!(path = %path.display(), error = %e, "Failed to read source file. Skipping.");
          continue;
        }
      };

      if self.entry_point == Some(unit.as_str()) {
        tracing::debug!(%unit, "Skipping entry point");
        continue;
      }

      let span = tracing::info_span!("unit", %unit);
      let outcome = self.run_one(runner, &unit).instrument(span).await;
      outcomes.push(UnitOutcome { unit, outcome });
    }

    outcomes
  }

  async fn run_one<R: CommandRunner>(&self, runner: &mut R, unit: &str) -> Outcome {
    let invocation = Invocation::new(self.java)
      .args(["-ea", "-cp", self.search_path, unit])
      .current_dir(self.root);
    println!("{invocation}");

    let captured = match runner.run(&invocation).await {
      Ok(captured) => captured,
      Err(e) => {
        tracing::error!(error = %e, "Test unit could not be launched");
        println!();
        return Outcome::NotStarted;
      }
    };

    if !captured.stdout.is_empty() {
      print!("{}", String::from_utf8_lossy(&captured.stdout));
    }

    let stderr = captured.stderr_text();
    let outcome = classify(captured.status, &stderr);
    match outcome {
      Outcome::NoTests => eprintln!("no tests found"),
      _ if !stderr.is_empty() => eprintln!("{}", stderr.trim_end()),
      _ => {}
    }
    println!();

    outcome
  }
}

fn classify(status: ToolStatus, stderr: &str) -> Outcome {
  if stderr.starts_with(NO_MAIN_DIAGNOSTIC) {
    Outcome::NoTests
  } else if status.is_success() {
    Outcome::Passed
  } else {
    Outcome::Failed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_main_means_no_tests() {
    let stderr = "Error: Main method not found in class com.example.Util, please define the main method as:\n";
    assert_eq!(classify(ToolStatus::Failed { code: Some(1) }, stderr), Outcome::NoTests);
  }

  #[test]
  fn exit_status_decides_everything_else() {
    assert_eq!(classify(ToolStatus::Succeeded, ""), Outcome::Passed);
    assert_eq!(
      classify(ToolStatus::Failed { code: Some(1) }, "Exception in thread \"main\" java.lang.AssertionError"),
      Outcome::Failed
    );
  }
}
