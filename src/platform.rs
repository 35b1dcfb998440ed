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
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// The operating-system family a generated command or script targets.
///
/// Only separator and quoting conventions depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Unix,
  Windows,
}

impl Platform {
  /// The platform this binary was compiled for.
  pub fn host() -> Self {
    Self::from_os_name(std::env::consts::OS)
  }

  /// Classifies an OS name; anything starting with "windows" is Windows.
  pub fn from_os_name(os_name: &str) -> Self {
    if os_name.to_ascii_lowercase().starts_with("windows") {
      Platform::Windows
    } else {
      Platform::Unix
    }
  }

  pub fn search_path_separator(self) -> char {
    match self {
      Platform::Unix => ':',
      Platform::Windows => ';',
    }
  }

  /// Rewrites a relative, `/`-separated path for this platform.
  pub fn localize(self, relative: &str) -> String {
    match self {
      Platform::Unix => relative.replace('\\', "/"),
      Platform::Windows => relative.replace('/', "\\"),
    }
  }

  /// Joins `dir/*` wildcard entries into a search path for this platform.
  pub fn wildcard_search_path<S: AsRef<str>>(self, dirs: &[S]) -> String {
    dirs
      .iter()
      .map(|dir| self.localize(&format!("{}/*", dir.as_ref().trim_end_matches('/'))))
      .collect::<Vec<_>>()
      .join(&self.search_path_separator().to_string())
  }

  /// A search path with `class_dir` itself first, then `dir/*` for every
  /// entry of `jar_dirs`.
  ///
  /// The launcher's `*` only matches jars, so loose `.class` files are
  /// reachable only through the bare directory.
  pub fn class_search_path<S: AsRef<str>>(self, class_dir: &str, jar_dirs: &[S]) -> String {
    let jars = self.wildcard_search_path(jar_dirs);
    let class_dir = self.localize(class_dir.trim_end_matches('/'));
    if jars.is_empty() {
      class_dir
    } else {
      format!("{class_dir}{}{jars}", self.search_path_separator())
    }
  }

  /// The other family, used to emit launchers for both.
  pub fn other(self) -> Self {
    match self {
      Platform::Unix => Platform::Windows,
      Platform::Windows => Platform::Unix,
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Platform::Unix => f.write_str("unix"),
      Platform::Windows => f.write_str("windows"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn os_names_starting_with_windows_are_windows() {
    assert_eq!(Platform::from_os_name("Windows 11"), Platform::Windows);
    assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
    assert_eq!(Platform::from_os_name("Linux"), Platform::Unix);
    assert_eq!(Platform::from_os_name("Mac OS X"), Platform::Unix);
  }

  #[test]
  fn search_paths_use_platform_separators() {
    let dirs = ["bin", "lib"];
    assert_eq!(Platform::Unix.wildcard_search_path(&dirs), "bin/*:lib/*");
    assert_eq!(Platform::Windows.wildcard_search_path(&dirs), "bin\\*;lib\\*");
  }

  #[test]
  fn class_search_path_puts_the_class_directory_first() {
    let jars = ["bin", "lib"];
    assert_eq!(Platform::Unix.class_search_path("bin", &jars), "bin:bin/*:lib/*");
    assert_eq!(
      Platform::Windows.class_search_path("bin/", &jars),
      "bin;bin\\*;lib\\*"
    );
  }

  #[test]
  fn localize_only_touches_separators() {
    assert_eq!(Platform::Windows.localize("src/main/java"), "src\\main\\java");
    assert_eq!(Platform::Unix.localize("src/main/java"), "src/main/java");
  }
}
