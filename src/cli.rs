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
use crate::config::Overrides;
use crate::config::SourceLayout;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Compile, package, document and smoke-test a plain Java project")]
pub struct Cli {
  /// Fully-qualified main class. When given, launcher scripts are generated
  /// and the class is excluded from the test run.
  /// Example: com.example.Main
  pub entry_point: Option<String>,

  /// Configuration file, relative to the project directory.
  #[arg(long, env = "JBUILD_CONFIG")]
  pub config: Option<PathBuf>,

  /// Where sources live. `auto` tries src/main/java, then src.
  #[arg(long, value_enum)]
  pub layout: Option<SourceLayout>,

  /// Java language version passed to `javac --release`.
  #[arg(long)]
  pub release: Option<String>,

  /// Stop after compilation if the compiler fails.
  #[arg(long)]
  pub strict: bool,

  /// Write a JSON summary of the run to this file.
  #[arg(long)]
  pub report_path: Option<PathBuf>,
}

impl Cli {
  pub fn overrides(&self) -> Overrides {
    Overrides {
      config_file: self.config.clone(),
      source_layout: self.layout,
      language_version: self.release.clone(),
      strict: self.strict,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_or_one_positional_argument() {
    let library = Cli::try_parse_from(["jbuild"]).unwrap();
    assert_eq!(library.entry_point, None);

    let executable = Cli::try_parse_from(["jbuild", "com.example.Main"]).unwrap();
    assert_eq!(executable.entry_point.as_deref(), Some("com.example.Main"));
  }

  #[test]
  fn more_than_one_positional_argument_is_rejected() {
    assert!(Cli::try_parse_from(["jbuild", "com.example.Main", "extra"]).is_err());
  }

  #[test]
  fn flags_become_overrides() {
    let cli = Cli::try_parse_from(["jbuild", "--layout", "flat", "--release", "21", "--strict"]).unwrap();
    let overrides = cli.overrides();
    assert_eq!(overrides.source_layout, Some(SourceLayout::Flat));
    assert_eq!(overrides.language_version.as_deref(), Some("21"));
    assert!(overrides.strict);
  }
}
