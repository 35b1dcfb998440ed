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
use crate::error::BuildError;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Suffix of the files handed to the compiler.
pub const SOURCE_SUFFIX: &str = ".java";

/// Deep enough never to matter in practice.
const MAX_DEPTH: usize = 999;

/// Every source file found under the source root, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildManifest {
  files: Vec<PathBuf>,
}

impl BuildManifest {
  /// Walks `source_dir` and keeps regular files ending in [`SOURCE_SUFFIX`].
  ///
  /// Entries are visited sorted by file name, so two walks of the same tree
  /// agree. Paths are absolute whenever `source_dir` is.
  pub fn discover(source_dir: &Path) -> Self {
    let files = WalkDir::new(source_dir)
      .max_depth(MAX_DEPTH)
      .sort_by_file_name()
      .into_iter()
      .filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
          tracing::warn!(error = %e, "Skipping unreadable entry while scanning sources");
          None
        }
      })
      .filter(|entry| entry.file_type().is_file())
      .filter(|entry| entry.file_name().to_string_lossy().ends_with(SOURCE_SUFFIX))
      .map(walkdir::DirEntry::into_path)
      .collect();

    BuildManifest { files }
  }

  pub fn files(&self) -> &[PathBuf] {
    &self.files
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Writes the manifest to a temporary argument file, one path per line.
  pub fn write_list_file(&self) -> Result<ListFile, BuildError> {
    let lines = self.files.iter().map(|path| argfile_entry(path));
    ListFile::create(lines)
  }

  /// Writes a `jar` argument file that adds every source under its path
  /// relative to `source_dir`, one `-C <source_dir> <relative>` pair per line.
  pub fn write_archive_list_file(&self, source_dir: &Path) -> Result<ListFile, BuildError> {
    let root = argfile_entry(source_dir);
    let lines = self.files.iter().filter_map(|path| {
      let relative = pathdiff::diff_paths(path, source_dir)?;
      Some(format!("-C {root} {}", argfile_entry(&relative)))
    });
    ListFile::create(lines)
  }
}

/// The on-disk copy of a [`BuildManifest`]. Removed when dropped.
#[derive(Debug)]
pub struct ListFile {
  file: NamedTempFile,
}

impl ListFile {
  fn create(lines: impl Iterator<Item = String>) -> Result<Self, BuildError> {
    let mut file = tempfile::Builder::new()
      .prefix("jbuild-")
      .suffix(".list")
      .tempfile()
      .map_err(|e| BuildError::io("Failed to create source list file", std::env::temp_dir(), e))?;

    let mut contents = String::new();
    let mut count = 0;
    for line in lines {
      contents.push_str(&line);
      contents.push('\n');
      count += 1;
    }

    file
      .write_all(contents.as_bytes())
      .and_then(|()| file.flush())
      .map_err(|e| BuildError::io("Failed to write source list file", file.path(), e))?;

    tracing::debug!(path = %file.path().display(), lines = count, "Source list written");
    Ok(ListFile { file })
  }

  pub fn path(&self) -> &Path {
    self.file.path()
  }

  /// The `@file` form understood by javac, javadoc and jar.
  pub fn arg(&self) -> String {
    format!("@{}", self.path().display())
  }
}

/// Quotes a path for an argument file if it contains whitespace or quotes.
fn argfile_entry(path: &Path) -> String {
  let raw = path.display().to_string();
  if raw.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
  } else {
    raw
  }
}

/// Reads a source file and returns its fully-qualified unit name.
pub fn unit_name(path: &Path) -> io::Result<String> {
  let bytes = fs::read(path)?;
  let source = String::from_utf8_lossy(&bytes);
  let class = class_name(path);

  Ok(match package_of(&source) {
    Some(package) => format!("{package}.{class}"),
    None => class,
  })
}

fn class_name(path: &Path) -> String {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  match file_name.strip_suffix(SOURCE_SUFFIX) {
    Some(stem) => stem.to_string(),
    None => file_name,
  }
}

/// The first `package x.y.z;` declaration, if any.
pub fn package_of(source: &str) -> Option<String> {
  source.lines().find_map(|line| {
    let rest = line.trim_start().strip_prefix("package")?;
    if !rest.starts_with(char::is_whitespace) {
      return None;
    }
    let name = rest.split(';').next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
  })
}
