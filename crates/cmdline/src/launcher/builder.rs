use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use crate::{defaults::DEFAULT_TIMEOUT, launcher::Launcher};

#[derive(Debug, Clone)]
pub struct LauncherBuilder {
    pub(crate) working_dir: Option<PathBuf>,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) clear_env: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) mirror_stdout: bool,
    pub(crate) mirror_stderr: bool,
}

impl Default for LauncherBuilder {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: BTreeMap::new(),
            clear_env: false,
            timeout: Some(DEFAULT_TIMEOUT),
            mirror_stdout: false,
            mirror_stderr: false,
        }
    }
}

impl LauncherBuilder {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Base variable applied beneath every command's own environment overlay.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Start children with an empty environment instead of inheriting this process's.
    pub fn clear_env(mut self, enabled: bool) -> Self {
        self.clear_env = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mirror_stdout(mut self, enabled: bool) -> Self {
        self.mirror_stdout = enabled;
        self
    }

    pub fn mirror_stderr(mut self, enabled: bool) -> Self {
        self.mirror_stderr = enabled;
        self
    }

    pub fn build(self) -> Launcher {
        Launcher {
            working_dir: self.working_dir,
            env: self.env,
            clear_env: self.clear_env,
            timeout: self.timeout,
            mirror_stdout: self.mirror_stdout,
            mirror_stderr: self.mirror_stderr,
        }
    }
}
