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
use crate::config::Config;
use crate::config::SourceLayout;
use crate::error::BuildError;
use crate::error::ConfigurationError;
use crate::error::InvalidNameError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// A project name made only of ASCII letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
  pub fn parse(name: &str) -> Result<Self, InvalidNameError> {
    let valid = !name.is_empty()
      && name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
      Ok(ProjectName(name.to_string()))
    } else {
      Err(InvalidNameError {
        name: name.to_string(),
      })
    }
  }

  /// Derives the name from the final segment of `dir`.
  pub fn from_dir(dir: &Path) -> Result<Self, BuildError> {
    let segment = dir
      .file_name()
      .ok_or_else(|| ConfigurationError::NoDirectoryName(dir.to_path_buf()))?;
    Ok(Self::parse(&segment.to_string_lossy())?)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProjectName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A project directory that passed validation.
#[derive(Debug, Clone)]
pub struct Environment {
  pub root: PathBuf,
  pub name: ProjectName,
  pub dependency_dir: PathBuf,
  /// Source root relative to `root`, as handed to the tools.
  pub source_rel: PathBuf,
  /// Either `Conventional` or `Flat`, never `Auto`.
  pub source_layout: SourceLayout,
}

impl Environment {
  pub fn source_dir(&self) -> PathBuf {
    self.root.join(&self.source_rel)
  }
}

/// Checks the dependency directory, then the source directory, then the name.
///
/// Nothing is written to disk here, so a failure leaves the project untouched.
pub fn resolve_environment(root: &Path, config: &Config) -> Result<Environment, BuildError> {
  let layout = &config.layout;

  let dependency_dir = root.join(&layout.dependencies);
  if !dependency_dir.is_dir() {
    return Err(ConfigurationError::MissingDependencyDir(layout.dependencies.clone()).into());
  }

  let (source_rel, source_layout) = resolve_source_dir(root, config)?;
  let name = ProjectName::from_dir(root)?;

  tracing::debug!(
    %name,
    source = %source_rel.display(),
    ?source_layout,
    "Environment validated"
  );

  Ok(Environment {
    root: root.to_path_buf(),
    name,
    dependency_dir,
    source_rel,
    source_layout,
  })
}

fn resolve_source_dir(
  root: &Path,
  config: &Config,
) -> Result<(PathBuf, SourceLayout), ConfigurationError> {
  let conventional = &config.layout.conventional_source;
  let flat = &config.layout.flat_source;

  match config.profile.source_layout {
    SourceLayout::Auto => {
      if root.join(conventional).is_dir() {
        Ok((conventional.clone(), SourceLayout::Conventional))
      } else if root.join(flat).is_dir() {
        Ok((flat.clone(), SourceLayout::Flat))
      } else {
        Err(ConfigurationError::MissingSourceDir {
          conventional: conventional.clone(),
          flat: flat.clone(),
        })
      }
    }
    SourceLayout::Conventional if root.join(conventional).is_dir() => {
      Ok((conventional.clone(), SourceLayout::Conventional))
    }
    SourceLayout::Conventional => Err(ConfigurationError::MissingForcedSourceDir(conventional.clone())),
    SourceLayout::Flat if root.join(flat).is_dir() => Ok((flat.clone(), SourceLayout::Flat)),
    SourceLayout::Flat => Err(ConfigurationError::MissingForcedSourceDir(flat.clone())),
  }
}
