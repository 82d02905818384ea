use std::{collections::BTreeMap, io, path::PathBuf, process::Stdio, time::Duration};

use tokio::process::{Child, Command};

use crate::{
    process::{self, CommandOutput, LaunchRequest, ProcessLauncher, Spawned},
    CommandLineError,
};

mod builder;

pub use builder::LauncherBuilder;

/// Tokio-backed [`ProcessLauncher`].
///
/// Children get piped stdout/stderr and are killed if their handle is dropped.
#[derive(Debug, Clone)]
pub struct Launcher {
    pub(crate) working_dir: Option<PathBuf>,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) clear_env: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) mirror_stdout: bool,
    pub(crate) mirror_stderr: bool,
}

impl Default for Launcher {
    fn default() -> Self {
        LauncherBuilder::default().build()
    }
}

impl Launcher {
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::default()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Drains stdout/stderr and waits for exit, honouring the configured timeout.
    pub async fn collect(
        &self,
        spawned: Spawned<Child>,
    ) -> Result<CommandOutput, CommandLineError> {
        process::collect_output(
            spawned,
            self.timeout,
            self.mirror_stdout,
            self.mirror_stderr,
        )
        .await
    }
}

impl ProcessLauncher for Launcher {
    type Process = Child;

    fn launch(&self, request: &LaunchRequest<'_>) -> io::Result<Child> {
        let mut command = Command::new(request.program);
        command.args(request.args);

        if let Some(dir) = self.working_dir.as_ref() {
            command.current_dir(dir);
        }

        if self.clear_env {
            command.env_clear();
        }
        process::apply_env(&mut command, &self.env);
        process::apply_env(&mut command, request.env);

        command.stdin(if request.pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        command.spawn()
    }
}
