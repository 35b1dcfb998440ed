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

//! # jbuild
//!
//! `jbuild` is a single-shot, full-rebuild orchestrator for plain Java
//! projects: a `lib/` directory of jars next to a source tree. It drives
//! `javac`, `jar`, `javadoc` and `java` in a fixed order and never tries to
//! be clever about what changed.
//!
//! ## Core Modules
//!
//! * [`builder`]: `run_build`, the ordered pipeline from cleaning the output
//!   directory through archiving, launcher scripts, javadoc and test runs.
//! * [`project`]: Validates the project directory and its name before
//!   anything is written.
//! * [`manifest`]: Discovers source files and writes the temporary `@file`
//!   list handed to the tools.
//! * [`command`]: The `CommandRunner` seam and its process-backed
//!   implementation.
//! * [`harness`]: Launches every compiled unit as an ad-hoc test.
//! * [`launcher`]: Renders the Unix and Windows launch scripts.
//! * [`config`]: Layered configuration (`jbuild.toml`, `JBUILD_*`, CLI).
//! * [`platform`]: Separator conventions for Unix and Windows.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod builder;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod harness;
pub mod launcher;
pub mod logging;
pub mod manifest;
pub mod platform;
pub mod project;
