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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for a build run.
#[derive(Error, Debug)]
pub enum BuildError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  InvalidName(#[from] InvalidNameError),

  #[error("{context}: {path}")]
  Io {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Compilation failed ({status}); stopping because strict mode is enabled")]
  CompileFailed { status: String },
}

impl BuildError {
  pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    BuildError::Io {
      context,
      path: path.into(),
      source,
    }
  }
}

/// Fatal problems with the project layout or the configuration sources.
#[derive(Error, Debug)]
pub enum ConfigurationError {
  #[error("Directory not found: {0}/. At top level of project?")]
  MissingDependencyDir(PathBuf),

  #[error("Directory not found: {conventional}/ or {flat}/. At top level of project?")]
  MissingSourceDir {
    conventional: PathBuf,
    flat: PathBuf,
  },

  #[error("Source directory not found: {0}/")]
  MissingForcedSourceDir(PathBuf),

  #[error("Failed to load configuration")]
  Load(#[source] Box<figment::Error>),

  #[error("Working directory has no final path segment: {0}")]
  NoDirectoryName(PathBuf),
}

/// The working directory's name cannot be used as a project name.
#[derive(Error, Debug, PartialEq, Eq)]
#[error(
  "Invalid project directory name '{name}': it must be non-empty, have no spaces and use only _, -, A-Z, a-z, 0-9"
)]
pub struct InvalidNameError {
  pub name: String,
}

/// Errors raised while talking to an external tool.
#[derive(Error, Debug)]
pub enum CommandError {
  #[error("Failed to start {program}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to wait for {program}")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },
}
