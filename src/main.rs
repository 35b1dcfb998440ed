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
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use jbuild::builder::BuildContext;
use jbuild::builder::run_build;
use jbuild::cli::Cli;
use jbuild::command::SystemRunner;
use jbuild::config::Config;
use jbuild::logging::setup_tracing;
use jbuild::platform::Platform;
use std::fs;

#[tokio::main]
async fn main() -> Result<()> {
  let _guard = setup_tracing()?;

  let cli = Cli::parse();
  let main_span = tracing::info_span!("orchestrator");
  let _enter = main_span.enter();

  let root = std::env::current_dir().context("Failed to read the working directory")?;
  let config = Config::load(&root, cli.overrides())?;

  let ctx = BuildContext {
    root,
    platform: Platform::host(),
    entry_point: cli.entry_point,
    build_date: chrono::Local::now().date_naive(),
    config,
  };

  let mut runner = SystemRunner::new();
  let report = run_build(&ctx, &mut runner).await?;

  if let Some(path) = cli.report_path {
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!("Build report written to {}", path.display());
  }

  Ok(())
}
