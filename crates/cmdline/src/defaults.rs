use std::time::Duration;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Rendered in place of a missing executable path.
///
/// Inherited from the host platform's command-line type; kept as-is until callers
/// agree on an error instead.
pub const UNSET_EXE_PLACEHOLDER: &str = "<null>";

pub(crate) const POSIX_SHELL: &str = "sh";
pub(crate) const POSIX_SHELL_FLAG: &str = "-c";
pub(crate) const WINDOWS_SHELL: &str = "cmd";
pub(crate) const WINDOWS_SHELL_FLAG: &str = "/c";
