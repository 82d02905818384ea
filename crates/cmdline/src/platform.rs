use serde::{Deserialize, Serialize};

use crate::defaults::{POSIX_SHELL, POSIX_SHELL_FLAG, WINDOWS_SHELL, WINDOWS_SHELL_FLAG};

/// Target convention for option syntax and shell composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `--name value`, `-n`, composed through `sh -c`.
    Posix,
    /// `/name:value`, composed through `cmd /c`.
    Windows,
}

impl Platform {
    /// The convention of the platform this crate was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub(crate) fn shell(self) -> (&'static str, &'static str) {
        match self {
            Platform::Posix => (POSIX_SHELL, POSIX_SHELL_FLAG),
            Platform::Windows => (WINDOWS_SHELL, WINDOWS_SHELL_FLAG),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}
