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
use crate::error::ConfigurationError;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "jbuild.toml";

/// Prefix of the environment variables layered over the file.
pub const ENV_PREFIX: &str = "JBUILD_";

/// Where the compiler should look for sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceLayout {
  /// Try the conventional location first, then the flat one.
  #[default]
  Auto,
  /// `src/main/java` style.
  Conventional,
  /// Everything directly under `src`.
  Flat,
}

/// Parameters that used to distinguish the two copies of the build script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildProfile {
  pub source_layout: SourceLayout,
  #[serde(deserialize_with = "string_or_number")]
  pub language_version: String,
  pub encoding: String,
}

impl Default for BuildProfile {
  fn default() -> Self {
    BuildProfile {
      source_layout: SourceLayout::Auto,
      language_version: "17".to_string(),
      encoding: "utf-8".to_string(),
    }
  }
}

/// Project-relative directory names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
  pub dependencies: PathBuf,
  pub output: PathBuf,
  pub docs: PathBuf,
  pub conventional_source: PathBuf,
  pub flat_source: PathBuf,
  pub resources: PathBuf,
}

impl Default for Layout {
  fn default() -> Self {
    Layout {
      dependencies: PathBuf::from("lib"),
      output: PathBuf::from("bin"),
      docs: PathBuf::from("javadoc"),
      conventional_source: PathBuf::from("src/main/java"),
      flat_source: PathBuf::from("src"),
      resources: PathBuf::from("src/main/resources"),
    }
  }
}

/// Programs invoked for each external concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
  pub javac: String,
  pub jar: String,
  pub javadoc: String,
  pub java: String,
}

impl Default for Tools {
  fn default() -> Self {
    Tools {
      javac: "javac".to_string(),
      jar: "jar".to_string(),
      javadoc: "javadoc".to_string(),
      java: "java".to_string(),
    }
  }
}

/// Fully layered configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub profile: BuildProfile,
  pub layout: Layout,
  pub tools: Tools,
  /// Stop after compilation when the compiler fails.
  pub strict: bool,
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub config_file: Option<PathBuf>,
  pub source_layout: Option<SourceLayout>,
  pub language_version: Option<String>,
  pub strict: bool,
}

impl Config {
  /// Defaults, then the project's config file, then `JBUILD_*` variables.
  ///
  /// Nested keys use `__`, e.g. `JBUILD_TOOLS__JAVAC`.
  pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
      .merge(Toml::file(config_file))
      .merge(Env::prefixed(ENV_PREFIX).split("__"))
  }

  pub fn load(project_root: &Path, overrides: Overrides) -> Result<Self, ConfigurationError> {
    let config_file = match overrides.config_file {
      Some(ref path) if path.is_absolute() => path.clone(),
      Some(ref path) => project_root.join(path),
      None => project_root.join(CONFIG_FILE_NAME),
    };

    let mut config: Config = Self::figment(&config_file)
      .extract()
      .map_err(|e| ConfigurationError::Load(Box::new(e)))?;

    if let Some(layout) = overrides.source_layout {
      config.profile.source_layout = layout;
    }
    if let Some(version) = overrides.language_version {
      config.profile.language_version = version;
    }
    config.strict |= overrides.strict;

    tracing::debug!(?config, file = %config_file.display(), "Resolved configuration");
    Ok(config)
  }
}

/// Accepts `language_version = 17` as well as `"17"`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Token {
    Text(String),
    Whole(u64),
  }

  Ok(match Token::deserialize(deserializer)? {
    Token::Text(text) => text,
    Token::Whole(n) => n.to_string(),
  })
}
