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
use crate::config::Layout;
use crate::error::BuildError;
use crate::platform::Platform;
use crate::project::ProjectName;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A launcher for one platform family, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherScript {
  pub file_name: String,
  pub contents: String,
}

impl LauncherScript {
  pub fn render(platform: Platform, name: &ProjectName, entry_point: &str, layout: &Layout) -> Self {
    let search_path = platform.wildcard_search_path(&[
      layout.output.to_string_lossy(),
      layout.dependencies.to_string_lossy(),
    ]);

    match platform {
      Platform::Unix => LauncherScript {
        file_name: name.to_string(),
        contents: format!("#!/bin/sh\njava -cp \"{search_path}\" {entry_point} \"$@\"\n"),
      },
      Platform::Windows => LauncherScript {
        file_name: format!("{name}.bat"),
        contents: format!("@echo off\r\njava -cp \"{search_path}\" {entry_point} %*\r\n"),
      },
    }
  }
}

/// Writes launchers for the host family and the other one into `root`.
///
/// Existing files with the same names are overwritten.
pub fn write_launchers(
  root: &Path,
  name: &ProjectName,
  entry_point: &str,
  layout: &Layout,
  host: Platform,
) -> Result<Vec<PathBuf>, BuildError> {
  [host, host.other()]
    .into_iter()
    .map(|platform| -> Result<PathBuf, BuildError> {
      let script = LauncherScript::render(platform, name, entry_point, layout);
      let path = root.join(&script.file_name);
      fs::write(&path, &script.contents)
        .map_err(|e| BuildError::io("Failed to write launcher script", &path, e))?;
      if platform == Platform::Unix {
        mark_executable(&path)?;
      }
      tracing::info!("  {}", path.display());
      Ok(path)
    })
    .collect()
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), BuildError> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755))
    .map_err(|e| BuildError::io("Failed to mark launcher executable", path, e))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), BuildError> {
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn app() -> ProjectName {
    ProjectName::parse("app").unwrap()
  }

  #[test]
  fn unix_launcher_uses_colon_search_path() {
    let script = LauncherScript::render(Platform::Unix, &app(), "com.example.Main", &Layout::default());
    assert_eq!(script.file_name, "app");
    assert_eq!(
      script.contents,
      "#!/bin/sh\njava -cp \"bin/*:lib/*\" com.example.Main \"$@\"\n"
    );
  }

  #[test]
  fn windows_launcher_uses_semicolon_search_path() {
    let script = LauncherScript::render(Platform::Windows, &app(), "com.example.Main", &Layout::default());
    assert_eq!(script.file_name, "app.bat");
    assert_eq!(
      script.contents,
      "@echo off\r\njava -cp \"bin\\*;lib\\*\" com.example.Main %*\r\n"
    );
  }
}
