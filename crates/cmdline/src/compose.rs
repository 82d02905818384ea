//! Chaining rendered command lines through the platform shell.
//!
//! Only the rendered strings are combined; environment overlays and stdin of the
//! inputs are not carried over. Short-circuit behaviour belongs to the shell.

use crate::{CommandLine, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Stops at the first failing command.
    And,
    /// Stops at the first succeeding command.
    Or,
    /// Runs every command regardless of exit status.
    Sequence,
}

impl Operator {
    pub fn token(self, platform: Platform) -> &'static str {
        match (self, platform) {
            (Operator::And, _) => "&&",
            (Operator::Or, _) => "||",
            (Operator::Sequence, Platform::Posix) => ";",
            (Operator::Sequence, Platform::Windows) => "&",
        }
    }
}

/// Wraps the rendered `commands`, joined by `operator`, in `sh -c` or `cmd /c`.
pub fn compose<'a, I>(platform: Platform, operator: Operator, commands: I) -> CommandLine
where
    I: IntoIterator<Item = &'a CommandLine>,
{
    let separator = format!(" {} ", operator.token(platform));
    let script = commands
        .into_iter()
        .map(CommandLine::command_line_string)
        .collect::<Vec<_>>()
        .join(&separator);

    let (shell, flag) = platform.shell();
    let mut composed = CommandLine::with_exe_path(shell).on_platform(platform);
    composed.add_parameter(flag).add_parameter(script);
    composed
}

impl CommandLine {
    pub fn and<'a>(commands: impl IntoIterator<Item = &'a CommandLine>) -> CommandLine {
        compose(Platform::current(), Operator::And, commands)
    }

    pub fn or<'a>(commands: impl IntoIterator<Item = &'a CommandLine>) -> CommandLine {
        compose(Platform::current(), Operator::Or, commands)
    }

    pub fn sequence<'a>(commands: impl IntoIterator<Item = &'a CommandLine>) -> CommandLine {
        compose(Platform::current(), Operator::Sequence, commands)
    }
}
