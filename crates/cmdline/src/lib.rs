#![forbid(unsafe_code)]
//! Build external-process command lines from parameters and structured options,
//! render them as shell-safe strings, and start them with single-use stdin.
//!
//! Rendering is for display and logging only. Processes are always started from
//! the argument vector, never by re-parsing the rendered string.

mod command_line;
pub mod compose;
mod defaults;
mod env;
mod error;
mod input;
mod launcher;
mod options;
mod platform;
pub mod process;
pub mod quoting;

pub use command_line::CommandLine;
pub use compose::{compose, Operator};
pub use defaults::UNSET_EXE_PLACEHOLDER;
pub use env::EnvValue;
pub use error::{CommandLineError, QuoteError};
pub use launcher::{Launcher, LauncherBuilder};
pub use options::{OptionItem, OptionValue, Options};
pub use platform::Platform;
pub use process::{
    CommandOutput, LaunchRequest, LaunchedProcess, ProcessLauncher, Spawned, StdinDelivery,
};
