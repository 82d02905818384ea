//! Boundary between a finished [`crate::CommandLine`] and whatever starts the process.

use std::{collections::BTreeMap, io, process::ExitStatus, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    process::{Child, ChildStdin, Command},
    task::JoinHandle,
    time,
};
use tracing::warn;

use crate::{input::StdinBuffer, CommandLineError};

/// Everything a launcher needs to start one process.
///
/// `args` is the finalized vector; it is never re-parsed from a rendered string.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub env: &'a BTreeMap<String, String>,
    /// Stdin must be a pipe because buffered input follows right after start.
    pub pipe_stdin: bool,
}

/// Starts processes. Implementations must not log or echo stdin contents.
pub trait ProcessLauncher {
    type Process: LaunchedProcess;

    fn launch(&self, request: &LaunchRequest<'_>) -> io::Result<Self::Process>;
}

/// A started process whose stdin pipe can be taken once.
pub trait LaunchedProcess {
    type Stdin: AsyncWrite + Unpin + Send + 'static;

    fn take_stdin(&mut self) -> Option<Self::Stdin>;
}

impl LaunchedProcess for Child {
    type Stdin = ChildStdin;

    fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }
}

/// A started process plus the in-flight delivery of its buffered stdin.
///
/// The write runs on its own task so the caller can drain stdout/stderr while it
/// is in progress. A failed write does not discard the handle; the process may
/// still have useful output or an exit code.
#[derive(Debug)]
pub struct Spawned<P> {
    pub process: P,
    pub stdin: StdinDelivery,
}

impl<P> Spawned<P> {
    pub fn into_parts(self) -> (P, StdinDelivery) {
        (self.process, self.stdin)
    }
}

/// Handle on the background task writing buffered stdin into a child.
///
/// The task owns the buffer, so the bytes are wiped when it finishes or is aborted.
#[derive(Debug, Default)]
pub struct StdinDelivery {
    task: Option<JoinHandle<io::Result<()>>>,
}

impl StdinDelivery {
    pub(crate) fn start<W>(program: &str, buffer: StdinBuffer, stdin: Option<W>) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let program = program.to_string();
        let task = tokio::spawn(async move {
            let written = buffer.deliver(stdin).await;
            if let Err(error) = written.as_ref() {
                warn!(program = %program, %error, "failed to write buffered stdin");
            }
            written
        });
        Self { task: Some(task) }
    }

    /// `true` while a write was started and has not been awaited yet.
    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    /// Waits for the write to finish and returns its error, if any.
    ///
    /// Returns `None` when there was no input or the result was already taken.
    pub async fn wait(&mut self) -> Option<io::Error> {
        let task = self.task.as_mut()?;
        let written = match task.await {
            Ok(written) => written,
            Err(join) => Err(io::Error::other(join.to_string())),
        };
        self.task = None;
        written.err()
    }

    /// Stops an unfinished write; the buffer is wiped as the task unwinds.
    pub fn abort(&self) {
        if let Some(task) = self.task.as_ref() {
            task.abort();
        }
    }
}

#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdin_error: Option<io::Error>,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Console stream a drained pipe is copied to as it arrives.
#[derive(Clone, Copy)]
pub(crate) enum Mirror {
    Stdout,
    Stderr,
}

impl Mirror {
    fn writer(self) -> Box<dyn AsyncWrite + Send + Unpin> {
        match self {
            Mirror::Stdout => Box::new(tokio::io::stdout()),
            Mirror::Stderr => Box::new(tokio::io::stderr()),
        }
    }
}

/// Reads `pipe` to EOF, optionally echoing each chunk to the console.
pub(crate) async fn drain_pipe<R>(mut pipe: R, mirror: Option<Mirror>) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut console = mirror.map(Mirror::writer);
    let mut collected = Vec::new();
    let mut chunk = vec![0u8; 8 * 1024];
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        if let Some(console) = console.as_mut() {
            console.write_all(&chunk[..read]).await?;
            console.flush().await?;
        }
        collected.extend_from_slice(&chunk[..read]);
    }
    Ok(collected)
}

async fn join_pipe(
    task: &mut JoinHandle<io::Result<Vec<u8>>>,
) -> Result<io::Result<Vec<u8>>, CommandLineError> {
    task.await.map_err(|e| CommandLineError::Join(e.to_string()))
}

/// Waits for exit while stdin is written and both pipes are drained concurrently.
///
/// `timeout` covers the whole exchange. When it fires the child is killed and the
/// stdin and drain tasks are aborted.
pub(crate) async fn collect_output(
    spawned: Spawned<Child>,
    timeout: Option<Duration>,
    mirror_stdout: bool,
    mirror_stderr: bool,
) -> Result<CommandOutput, CommandLineError> {
    let (mut child, mut stdin) = spawned.into_parts();

    let stdout = child.stdout.take().ok_or(CommandLineError::MissingStdout)?;
    let stderr = child.stderr.take().ok_or(CommandLineError::MissingStderr)?;

    let mut stdout_task =
        tokio::spawn(drain_pipe(stdout, mirror_stdout.then_some(Mirror::Stdout)));
    let mut stderr_task =
        tokio::spawn(drain_pipe(stderr, mirror_stderr.then_some(Mirror::Stderr)));

    let exchange = async {
        let status = child.wait().await.map_err(CommandLineError::Wait)?;
        let stdin_error = stdin.wait().await;
        let stdout = join_pipe(&mut stdout_task)
            .await?
            .map_err(CommandLineError::StdoutRead)?;
        let stderr = join_pipe(&mut stderr_task)
            .await?
            .map_err(CommandLineError::StderrRead)?;
        Ok::<_, CommandLineError>(CommandOutput {
            status,
            stdout,
            stderr,
            stdin_error,
        })
    };

    let Some(dur) = timeout else {
        return exchange.await;
    };
    match time::timeout(dur, exchange).await {
        Ok(collected) => collected,
        Err(_) => {
            let _ = child.start_kill();
            stdin.abort();
            stdout_task.abort();
            stderr_task.abort();
            Err(CommandLineError::Timeout { timeout: dur })
        }
    }
}

pub(crate) fn apply_env(command: &mut Command, env: &BTreeMap<String, String>) {
    for (k, v) in env {
        command.env(k, v);
    }
}
