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
use crate::error::CommandError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Stdio;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// One external tool call: the program and its arguments.
///
/// Arguments are passed as-is; nothing goes through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  #[serde(skip)]
  pub current_dir: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Invocation {
      program: program.into(),
      args: Vec::new(),
      current_dir: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: &Path) -> Self {
    self.current_dir = Some(dir.to_path_buf());
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " \"{arg}\"")?;
      } else {
        write!(f, " {arg}")?;
      }
    }
    Ok(())
  }
}

/// How an external tool finished, as far as the orchestrator cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ToolStatus {
  Succeeded,
  Failed { code: Option<i32> },
  NotStarted,
}

impl ToolStatus {
  pub fn is_success(self) -> bool {
    matches!(self, ToolStatus::Succeeded)
  }
}

impl From<ExitStatus> for ToolStatus {
  fn from(status: ExitStatus) -> Self {
    if status.success() {
      ToolStatus::Succeeded
    } else {
      ToolStatus::Failed {
        code: status.code(),
      }
    }
  }
}

impl fmt::Display for ToolStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolStatus::Succeeded => f.write_str("exit code 0"),
      ToolStatus::Failed { code: Some(code) } => write!(f, "exit code {code}"),
      ToolStatus::Failed { code: None } => f.write_str("terminated by signal"),
      ToolStatus::NotStarted => f.write_str("not started"),
    }
  }
}

/// Everything an awaited tool produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
  pub status: ToolStatus,
}

impl Captured {
  pub fn stderr_text(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }
}

/// The only way the orchestrator touches external processes.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
  /// Runs the tool to completion and captures both output streams.
  async fn run(&mut self, invocation: &Invocation) -> Result<Captured, CommandError>;

  /// Starts the tool and returns without waiting for it.
  async fn dispatch(&mut self, invocation: &Invocation) -> Result<(), CommandError>;

  /// Waits for every dispatched tool, discarding exit statuses.
  async fn reap(&mut self) {}
}

struct Dispatched {
  program: String,
  child: Child,
  stderr_task: JoinHandle<()>,
}

/// Runs tools as real child processes.
#[derive(Default)]
pub struct SystemRunner {
  pending: Vec<Dispatched>,
}

impl SystemRunner {
  pub fn new() -> Self {
    Self::default()
  }

  fn command(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args).stdin(Stdio::null());
    if let Some(dir) = &invocation.current_dir {
      cmd.current_dir(dir);
    }
    cmd
  }
}

impl CommandRunner for SystemRunner {
  async fn run(&mut self, invocation: &Invocation) -> Result<Captured, CommandError> {
    let mut cmd = Self::command(invocation);
    tracing::debug!(?cmd, "Running tool");

    let output = cmd.output().await.map_err(|source| CommandError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

    Ok(Captured {
      stdout: output.stdout,
      stderr: output.stderr,
      status: output.status.into(),
    })
  }

  async fn dispatch(&mut self, invocation: &Invocation) -> Result<(), CommandError> {
    let mut cmd = Self::command(invocation);
    cmd.stdout(Stdio::null()).stderr(Stdio::piped());
    tracing::debug!(?cmd, "Dispatching tool");

    let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

    let program = invocation.program.clone();
    let stderr_task = match child.stderr.take() {
      Some(stderr) => tokio::spawn(
        read_and_log_stderr(stderr, program.clone())
          .instrument(tracing::info_span!("stderr_handler", tool = %program)),
      ),
      None => tokio::spawn(async {}),
    };

    self.pending.push(Dispatched {
      program,
      child,
      stderr_task,
    });
    Ok(())
  }

  async fn reap(&mut self) {
    for Dispatched {
      program,
      mut child,
      stderr_task,
    } in self.pending.drain(..)
    {
      match child.wait().await {
        Ok(status) => {
          let status = ToolStatus::from(status);
          tracing::debug!(tool = %program, %status, "Dispatched tool finished");
        }
        Err(source) => {
          let e = CommandError::Wait { program, source };
          tracing::warn!(error = %e, "Lost track of dispatched tool");
        }
      }
      if let Err(e) = stderr_task.await {
        tracing::warn!(error = %e, "Stderr reader task failed");
      }
    }
  }
}

/// Reads lines from a dispatched tool's stderr and logs them.
///
/// javadoc and jar report routine progress on stderr, so lines go out at
/// `info`; nobody waits on these tools' exit status anyway.
async fn read_and_log_stderr<R: AsyncRead + Unpin>(stream: R, tool: String) {
  let mut reader = BufReader::new(stream).lines();

  loop {
    match reader.next_line().await {
      Ok(Some(line)) => tracing::info!(tool = %tool, "{}", line),
      Ok(None) => break,
      Err(e) => {
        tracing::warn!(tool = %tool, error = %e, "Failed to read stderr");
        break;
      }
    }
  }
}

/// Logs each line of captured diagnostics against the tool that produced them.
pub fn log_diagnostics(tool: &str, stderr: &[u8]) {
  for line in String::from_utf8_lossy(stderr).lines() {
    tracing::warn!(tool = %tool, "{}", line);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;
  use std::sync::Arc;
  use std::sync::Mutex;
  use tracing_subscriber::fmt::MakeWriter;

  #[test]
  fn display_quotes_arguments_with_spaces() {
    let invocation = Invocation::new("javac")
      .args(["-d", "bin"])
      .arg("@/tmp/my list");
    assert_eq!(invocation.to_string(), "javac -d bin \"@/tmp/my list\"");
  }

  #[derive(Clone, Default)]
  struct Sink(Arc<Mutex<Vec<u8>>>);

  impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  impl<'a> MakeWriter<'a> for Sink {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
      self.clone()
    }
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn dispatched_stderr_is_logged_at_info() {
    let sink = Sink::default();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(sink.clone())
      .with_max_level(tracing::Level::INFO)
      .with_ansi(false)
      .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let mut runner = SystemRunner::new();
    let invocation = Invocation::new("sh").args(["-c", "echo Loading source files >&2"]);
    runner.dispatch(&invocation).await.unwrap();
    runner.reap().await;

    let logged = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    let line = logged
      .lines()
      .find(|line| line.contains("Loading source files"))
      .unwrap();
    assert!(line.contains("INFO"), "{line}");
    assert!(!logged.contains("WARN"), "{logged}");
  }

  #[tokio::test]
  async fn missing_program_is_a_spawn_error() {
    let mut runner = SystemRunner::new();
    let invocation = Invocation::new("jbuild-definitely-not-a-real-tool");

    assert!(matches!(runner.run(&invocation).await, Err(CommandError::Spawn { .. })));
    assert!(matches!(runner.dispatch(&invocation).await, Err(CommandError::Spawn { .. })));
    runner.reap().await;
  }
}
