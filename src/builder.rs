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
use crate::command::log_diagnostics;
use crate::config::Config;
use crate::config::SourceLayout;
use crate::error::BuildError;
use crate::harness::Harness;
use crate::harness::UnitOutcome;
use crate::launcher::write_launchers;
use crate::manifest::BuildManifest;
use crate::manifest::ListFile;
use crate::platform::Platform;
use crate::project::Environment;
use crate::project::ProjectName;
use crate::project::resolve_environment;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use walkdir::WalkDir;

const SEPARATOR: &str = "--------------------------------------------------------------";

/// Extension of both archives.
pub const ARCHIVE_EXTENSION: &str = "jar";

/// Everything the pipeline needs from the outside world.
///
/// The working directory and host platform are passed in rather than read
/// mid-run, so a run is a function of this value and the file system.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub root: PathBuf,
  pub platform: Platform,
  pub entry_point: Option<String>,
  pub build_date: NaiveDate,
  pub config: Config,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub project: ProjectName,
  pub entry_point: Option<String>,
  pub build_date: NaiveDate,
  pub source_layout: SourceLayout,
  pub sources: usize,
  pub compile: ToolStatus,
  pub resources: Option<ResourceCopy>,
  pub archives: Vec<String>,
  pub launchers: Vec<PathBuf>,
  pub units: Vec<UnitOutcome>,
  pub elapsed_secs: f64,
}

/// Counts from the resource copy stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceCopy {
  pub copied: usize,
  pub skipped: usize,
  pub failed: usize,
}

/// `{name}-{YYYYMMDD}.jar` and `{name}-{YYYYMMDD}-sources.jar`.
pub fn archive_names(name: &ProjectName, date: NaiveDate) -> (String, String) {
  let stamp = date.format("%Y%m%d");
  (
    format!("{name}-{stamp}.{ARCHIVE_EXTENSION}"),
    format!("{name}-{stamp}-sources.{ARCHIVE_EXTENSION}"),
  )
}

/// Runs the whole pipeline once.
///
/// Validation failures return before anything is written. Once the source
/// list files exist they are removed on every path out of this function, after
/// all dispatched tools have been reaped.
pub async fn run_build<R: CommandRunner>(
  ctx: &BuildContext,
  runner: &mut R,
) -> Result<BuildReport, BuildError> {
  let start = Instant::now();
  let env = resolve_environment(&ctx.root, &ctx.config)?;

  println!("{SEPARATOR}");
  println!("Building {}", env.name);
  println!("{SEPARATOR}");

  match &ctx.entry_point {
    Some(entry_point) => tracing::info!("Creating executable for main class: {}", entry_point),
    None => tracing::info!("Creating library (no main class provided)"),
  }

  let manifest = BuildManifest::discover(&env.source_dir());
  tracing::info!(
    "Found {} source files under {}",
    manifest.len(),
    env.source_rel.display()
  );
  let list = manifest.write_list_file()?;
  let sources_list = manifest.write_archive_list_file(&env.source_dir())?;

  let result = Pipeline {
    ctx,
    env: &env,
    manifest: &manifest,
    list: &list,
    sources_list: &sources_list,
  }
  .run(runner)
  .await;

  runner.reap().await;
  drop(sources_list);
  drop(list);

  let mut report = result?;
  report.elapsed_secs = start.elapsed().as_secs_f64();

  println!("{SEPARATOR}");
  println!("Total time: {:.3} s", report.elapsed_secs);
  println!("{SEPARATOR}");

  Ok(report)
}

struct Pipeline<'a> {
  ctx: &'a BuildContext,
  env: &'a Environment,
  manifest: &'a BuildManifest,
  list: &'a ListFile,
  sources_list: &'a ListFile,
}

impl Pipeline<'_> {
  async fn run<R: CommandRunner>(&self, runner: &mut R) -> Result<BuildReport, BuildError> {
    let config = &self.ctx.config;
    let platform = self.ctx.platform;
    let output_dir = self.env.root.join(&config.layout.output);

    clean_output(&output_dir, &config.layout.output)?;

    let compile = self.compile(runner).await;
    if config.strict && !compile.is_success() {
      return Err(BuildError::CompileFailed {
        status: compile.to_string(),
      });
    }

    let resource_dir = self.env.root.join(&config.layout.resources);
    let resources = resource_dir
      .is_dir()
      .then(|| copy_resources(&resource_dir, &output_dir));

    let archives = self.archive(runner).await;

    let launchers = match &self.ctx.entry_point {
      Some(entry_point) => {
        tracing::info!("Creating run files");
        write_launchers(
          &self.env.root,
          &self.env.name,
          entry_point,
          &config.layout,
          platform,
        )?
      }
      None => Vec::new(),
    };

    self.document(runner).await;

    tracing::info!("Running tests");
    let search_path = platform.class_search_path(
      &config.layout.output.to_string_lossy(),
      &[
        config.layout.output.to_string_lossy(),
        config.layout.dependencies.to_string_lossy(),
      ],
    );
    let units = Harness {
      java: &config.tools.java,
      search_path: &search_path,
      root: &self.env.root,
      entry_point: self.ctx.entry_point.as_deref(),
    }
    .run_all(runner, self.manifest)
    .await;

    Ok(BuildReport {
      project: self.env.name.clone(),
      entry_point: self.ctx.entry_point.clone(),
      build_date: self.ctx.build_date,
      source_layout: self.env.source_layout,
      sources: self.manifest.len(),
      compile,
      resources,
      archives,
      launchers,
      units,
      elapsed_secs: 0.0,
    })
  }

  fn localize(&self, path: &Path) -> String {
    self.ctx.platform.localize(&path.to_string_lossy())
  }

  async fn compile<R: CommandRunner>(&self, runner: &mut R) -> ToolStatus {
    let config = &self.ctx.config;
    let class_path = self
      .ctx
      .platform
      .wildcard_search_path(&[config.layout.dependencies.to_string_lossy()]);

    let invocation = Invocation::new(&config.tools.javac)
      .args(["-encoding", config.profile.encoding.as_str()])
      .args(["--release", config.profile.language_version.as_str()])
      .args(["-d".to_string(), self.localize(&config.layout.output)])
      .args(["-cp".to_string(), class_path])
      .arg(self.list.arg())
      .current_dir(&self.env.root);

    tracing::info!("Compiling on {} with:", self.ctx.platform);
    tracing::info!("  {}", invocation);

    match runner.run(&invocation).await {
      Ok(captured) => {
        log_diagnostics(&config.tools.javac, &captured.stdout);
        log_diagnostics(&config.tools.javac, &captured.stderr);
        if !captured.status.is_success() {
          tracing::error!(status = %captured.status, "Compiler reported failure");
        }
        captured.status
      }
      Err(e) => {
        tracing::error!(error = %e, "Compiler could not be started");
        ToolStatus::NotStarted
      }
    }
  }

  async fn archive<R: CommandRunner>(&self, runner: &mut R) -> Vec<String> {
    let config = &self.ctx.config;
    let output = &config.layout.output;
    let (main_jar, sources_jar) = archive_names(&self.env.name, self.ctx.build_date);

    tracing::info!("Creating jar file");
    let main = Invocation::new(&config.tools.jar)
      .args(["cf".to_string(), self.localize(&output.join(&main_jar))])
      .args(["-C".to_string(), self.localize(output), ".".to_string()])
      .current_dir(&self.env.root);
    self.dispatch(runner, &main).await;

    tracing::info!("Creating source jar");
    let sources = Invocation::new(&config.tools.jar)
      .args(["cf".to_string(), self.localize(&output.join(&sources_jar))])
      .arg(self.sources_list.arg())
      .current_dir(&self.env.root);
    self.dispatch(runner, &sources).await;

    vec![main_jar, sources_jar]
  }

  async fn document<R: CommandRunner>(&self, runner: &mut R) {
    let config = &self.ctx.config;

    tracing::info!("Creating javadoc");
    let invocation = Invocation::new(&config.tools.javadoc)
      .arg("--ignore-source-errors")
      .args(["-sourcepath".to_string(), self.localize(&self.env.source_rel)])
      .args(["-d".to_string(), self.localize(&config.layout.docs)])
      .arg(self.list.arg())
      .current_dir(&self.env.root);
    self.dispatch(runner, &invocation).await;
  }

  async fn dispatch<R: CommandRunner>(&self, runner: &mut R, invocation: &Invocation) {
    tracing::info!("  {}", invocation);
    if let Err(e) = runner.dispatch(invocation).await {
      tracing::error!(error = %e, "Tool could not be started");
    }
  }
}

/// Deletes a previous output directory, children first, and recreates it empty.
///
/// A missing directory is not an error. Symlinks are never followed.
pub fn clean_output(output_dir: &Path, relative: &Path) -> Result<(), BuildError> {
  let is_dir = fs::symlink_metadata(output_dir)
    .map(|meta| meta.is_dir())
    .unwrap_or(false);

  if is_dir {
    tracing::info!("Deleting {}/ directory", relative.display());
    fs::remove_dir_all(output_dir)
      .map_err(|e| BuildError::io("Failed to delete output directory", output_dir, e))?;
  }

  fs::create_dir_all(output_dir)
    .map_err(|e| BuildError::io("Failed to create output directory", output_dir, e))
}

/// Copies every entry of `resource_dir` to the same relative path under `output_dir`.
///
/// Destinations that already exist are left alone. Other failures are logged
/// and counted; they never stop the copy.
pub fn copy_resources(resource_dir: &Path, output_dir: &Path) -> ResourceCopy {
  tracing::info!("Copying resources");
  let mut stats = ResourceCopy::default();
  let mut options = fs_extra::file::CopyOptions::new();
  options.skip_exist = true;

  for entry in WalkDir::new(resource_dir).min_depth(1) {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        tracing::error!(error = %e, "Failed to read resource entry");
        stats.failed += 1;
        continue;
      }
    };

    let Some(relative) = pathdiff::diff_paths(entry.path(), resource_dir) else {
      stats.failed += 1;
      continue;
    };
    let destination = output_dir.join(relative);

    if entry.file_type().is_dir() {
      if let Err(e) = fs::create_dir_all(&destination) {
        tracing::error!(path = %destination.display(), error = %e, "Failed to create resource directory");
        stats.failed += 1;
      }
      continue;
    }

    if destination.exists() {
      stats.skipped += 1;
      continue;
    }

    match fs_extra::file::copy(entry.path(), &destination, &options) {
      Ok(_) => stats.copied += 1,
      Err(e) => {
        tracing::error!(path = %entry.path().display(), error = %e, "Failed to copy resource");
        stats.failed += 1;
      }
    }
  }

  tracing::debug!(?stats, "Resources copied");
  stats
}
