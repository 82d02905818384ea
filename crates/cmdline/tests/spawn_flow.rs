use std::{
    collections::BTreeMap,
    io,
    sync::{Arc, Mutex},
};

use cmdline::{CommandLine, CommandLineError, LaunchRequest, LaunchedProcess, ProcessLauncher};
use tokio::io::{AsyncReadExt, DuplexStream};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Recorded {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    pipe_stdin: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Accept,
    ReaderGone,
    RefuseSpawn,
}

struct FakeLauncher {
    behavior: Behavior,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeLauncher {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn recorded(&self) -> Vec<Recorded> {
        self.seen.lock().expect("lock").clone()
    }
}

#[derive(Debug)]
struct FakeProcess {
    stdin: Option<DuplexStream>,
    reader: Option<DuplexStream>,
}

impl LaunchedProcess for FakeProcess {
    type Stdin = DuplexStream;

    fn take_stdin(&mut self) -> Option<DuplexStream> {
        self.stdin.take()
    }
}

impl ProcessLauncher for FakeLauncher {
    type Process = FakeProcess;

    fn launch(&self, request: &LaunchRequest<'_>) -> io::Result<FakeProcess> {
        self.seen.lock().expect("lock").push(Recorded {
            program: request.program.to_string(),
            args: request.args.to_vec(),
            env: request.env.clone(),
            pipe_stdin: request.pipe_stdin,
        });

        if self.behavior == Behavior::RefuseSpawn {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        if !request.pipe_stdin {
            return Ok(FakeProcess {
                stdin: None,
                reader: None,
            });
        }

        let (writer, reader) = tokio::io::duplex(1024);
        let reader = match self.behavior {
            Behavior::ReaderGone => {
                drop(reader);
                None
            }
            _ => Some(reader),
        };
        Ok(FakeProcess {
            stdin: Some(writer),
            reader,
        })
    }
}

#[tokio::test]
async fn launcher_receives_vector_not_rendered_string() {
    let launcher = FakeLauncher::new(Behavior::Accept);
    let mut cmd = CommandLine::with_parameters("grep", ["two words", "\"quoted\""]);
    cmd.with_environment([("MODE", true)]);

    cmd.spawn_with(&launcher).await.expect("spawn");

    let recorded = launcher.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].program, "grep");
    assert_eq!(recorded[0].args, vec!["two words", "\"quoted\""]);
    assert_eq!(recorded[0].env.get("MODE").map(String::as_str), Some("1"));
    assert!(!recorded[0].pipe_stdin);
}

#[tokio::test]
async fn buffered_input_is_written_then_cleared() {
    let launcher = FakeLauncher::new(Behavior::Accept);
    let mut cmd = CommandLine::with_exe_path("cat");
    cmd.with_input("TEST");

    let mut spawned = cmd.spawn_with(&launcher).await.expect("spawn");
    assert!(!cmd.has_input());

    let mut reader = spawned.process.reader.take().expect("reader kept");
    let mut received = Vec::new();
    reader.read_to_end(&mut received).await.expect("read");
    assert_eq!(received, b"TEST");
    assert!(spawned.stdin.wait().await.is_none());
    assert!(!spawned.stdin.is_pending());

    cmd.spawn_with(&launcher).await.expect("second spawn");
    let recorded = launcher.recorded();
    assert!(recorded[0].pipe_stdin);
    assert!(!recorded[1].pipe_stdin, "second run must not pipe stdin");
}

#[tokio::test]
async fn write_failure_is_reported_next_to_the_handle() {
    let launcher = FakeLauncher::new(Behavior::ReaderGone);
    let mut cmd = CommandLine::with_exe_path("cat");
    cmd.with_input("TEST");

    let mut spawned = cmd.spawn_with(&launcher).await.expect("handle still returned");
    let error = spawned.stdin.wait().await.expect("write error surfaced");
    assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    assert!(!cmd.has_input());
}

#[tokio::test]
async fn spawn_failure_still_clears_input() {
    let launcher = FakeLauncher::new(Behavior::RefuseSpawn);
    let mut cmd = CommandLine::with_exe_path("missing-tool");
    cmd.with_input("secret");

    let err = cmd.spawn_with(&launcher).await.expect_err("spawn must fail");
    match err {
        CommandLineError::Spawn { program, source } => {
            assert_eq!(program.to_string_lossy(), "missing-tool");
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("expected Spawn, got {other:?}"),
    }
    assert!(!cmd.has_input());
}

#[tokio::test]
async fn input_larger_than_the_pipe_is_written_while_caller_reads() {
    let launcher = FakeLauncher::new(Behavior::Accept);
    let mut cmd = CommandLine::with_exe_path("cat");
    cmd.with_input(vec![b'x'; 64 * 1024]);

    let mut spawned = cmd.spawn_with(&launcher).await.expect("spawn returns before the write");
    let mut reader = spawned.process.reader.take().expect("reader kept");
    let mut received = Vec::new();
    reader.read_to_end(&mut received).await.expect("read");

    assert_eq!(received.len(), 64 * 1024);
    assert!(spawned.stdin.wait().await.is_none());
}

#[tokio::test]
async fn nul_byte_is_rejected_before_launch() {
    let launcher = FakeLauncher::new(Behavior::Accept);
    let mut cmd = CommandLine::with_parameters("printf", ["ok", "bad\0arg"]);
    cmd.with_input("secret");

    let err = cmd.spawn_with(&launcher).await.expect_err("nul byte");
    match err {
        CommandLineError::NulByte { field } => assert_eq!(field, "argument 1"),
        other => panic!("expected NulByte, got {other:?}"),
    }
    assert!(!cmd.has_input());
    assert!(launcher.recorded().is_empty());

    let mut cmd = CommandLine::with_exe_path("env");
    cmd.with_environment([("TOKEN", "a\0b")]);
    let err = cmd.spawn_with(&launcher).await.expect_err("nul in env");
    assert_eq!(err.to_string(), "environment variable `TOKEN` contains a NUL byte");
}

#[tokio::test]
async fn missing_exe_fails_before_launch_and_clears_input() {
    let launcher = FakeLauncher::new(Behavior::Accept);
    let mut cmd = CommandLine::new();
    cmd.with_input("secret");

    let err = cmd.spawn_with(&launcher).await.expect_err("no exe");
    assert!(matches!(err, CommandLineError::MissingExePath));
    assert!(!cmd.has_input());
    assert!(launcher.recorded().is_empty());
}

#[cfg(unix)]
mod unix {
    use std::{fs, time::Duration};

    use cmdline::{compose, CommandLine, CommandLineError, Launcher, Operator, Platform};
    use tempfile::TempDir;

    #[tokio::test]
    async fn stdin_round_trips_through_cat_once() {
        let launcher = Launcher::builder()
            .timeout(Some(Duration::from_secs(5)))
            .build();
        let mut cmd = CommandLine::with_exe_path("cat");
        cmd.with_input("TEST");

        let first = cmd.output(&launcher).await.expect("first run");
        assert!(first.status.success(), "{:?}", first.status);
        assert!(first.stdin_error.is_none());
        assert_eq!(first.stdout_lossy(), "TEST");

        let second = cmd.output(&launcher).await.expect("second run");
        assert!(second.status.success());
        assert!(second.stdout.is_empty(), "buffer must not be resent");
    }

    #[tokio::test]
    async fn environment_overlay_reaches_child() {
        let launcher = Launcher::builder().env("BASE", "base").build();
        let mut cmd =
            CommandLine::with_parameters("sh", ["-c", "printf '%s-%s-%s' \"$BASE\" \"$TRUE\" \"$FALSE\""]);
        cmd.with_environment([("TRUE", true), ("FALSE", false)]);

        let out = cmd.output(&launcher).await.expect("run");
        assert_eq!(out.stdout_lossy(), "base-1-0");
    }

    #[tokio::test]
    async fn command_env_overrides_launcher_env() {
        let launcher = Launcher::builder().env("WHO", "launcher").build();
        let mut cmd = CommandLine::with_parameters("sh", ["-c", "printf %s \"$WHO\""]);
        cmd.with_environment([("WHO", "command")]);

        let out = cmd.output(&launcher).await.expect("run");
        assert_eq!(out.stdout_lossy(), "command");
    }

    #[tokio::test]
    async fn working_dir_is_applied() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("marker.txt"), "x").expect("write marker");

        let launcher = Launcher::builder().working_dir(dir.path()).build();
        let mut cmd = CommandLine::with_exe_path("ls");
        let out = cmd.output(&launcher).await.expect("run");
        assert!(out.stdout_lossy().contains("marker.txt"));
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let mut cmd = CommandLine::with_exe_path("/definitely/not/a/real/binary");
        cmd.with_input("secret");

        let err = cmd
            .output(&Launcher::default())
            .await
            .expect_err("spawn must fail");
        assert!(matches!(err, CommandLineError::Spawn { .. }), "{err:?}");
        assert!(!cmd.has_input());
    }

    #[tokio::test]
    async fn large_input_streams_through_cat() {
        let launcher = Launcher::builder()
            .timeout(Some(Duration::from_secs(10)))
            .build();
        let mut cmd = CommandLine::with_exe_path("cat");
        cmd.with_input(vec![b'x'; 1 << 20]);

        let out = tokio::time::timeout(Duration::from_secs(30), cmd.output(&launcher))
            .await
            .expect("output returns")
            .expect("run");
        assert!(out.status.success(), "{:?}", out.status);
        assert!(out.stdin_error.is_none());
        assert_eq!(out.stdout.len(), 1 << 20);
        assert!(out.stdout.iter().all(|b| *b == b'x'));
    }

    #[tokio::test]
    async fn timeout_covers_a_blocked_stdin_write() {
        let launcher = Launcher::builder()
            .timeout(Some(Duration::from_millis(300)))
            .build();
        let mut cmd = CommandLine::with_parameters("sleep", ["30"]);
        cmd.with_input(vec![b'x'; 1 << 20]);

        let err = tokio::time::timeout(Duration::from_secs(10), cmd.output(&launcher))
            .await
            .expect("output returns")
            .expect_err("must time out");
        assert!(matches!(err, CommandLineError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn mirrored_streams_are_still_collected() {
        let launcher = Launcher::builder()
            .mirror_stdout(true)
            .mirror_stderr(true)
            .build();
        let mut cmd = CommandLine::with_parameters("sh", ["-c", "printf out; printf err >&2"]);

        let out = cmd.output(&launcher).await.expect("run");
        assert!(out.status.success());
        assert_eq!(out.stdout_lossy(), "out");
        assert_eq!(out.stderr_lossy(), "err");
    }

    #[tokio::test]
    async fn cleared_environment_keeps_only_explicit_variables() {
        assert!(std::env::var_os("CARGO_MANIFEST_DIR").is_some());
        let launcher = Launcher::builder()
            .clear_env(true)
            .env("BASE", "base")
            .build();
        let mut cmd = CommandLine::with_parameters(
            "/bin/sh",
            ["-c", "printf '%s-%s-%s' \"${CARGO_MANIFEST_DIR-unset}\" \"$BASE\" \"$OWN\""],
        );
        cmd.with_environment([("OWN", "own")]);

        let out = cmd.output(&launcher).await.expect("run");
        assert_eq!(out.stdout_lossy(), "unset-base-own");
    }

    #[tokio::test]
    async fn timeout_is_enforced() {
        let launcher = Launcher::builder()
            .timeout(Some(Duration::from_millis(100)))
            .build();
        let mut cmd = CommandLine::with_parameters("sleep", ["5"]);

        let err = cmd.output(&launcher).await.expect_err("must time out");
        assert!(matches!(err, CommandLineError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn composed_commands_follow_shell_semantics() {
        let t = CommandLine::with_exe_path("true");
        let f = CommandLine::with_exe_path("false");
        let launcher = Launcher::default();

        let mut and = compose(Platform::Posix, Operator::And, [&t, &f]);
        assert!(!and.output(&launcher).await.expect("and").status.success());

        let mut or = compose(Platform::Posix, Operator::Or, [&f, &t]);
        assert!(or.output(&launcher).await.expect("or").status.success());

        let mut seq = compose(Platform::Posix, Operator::Sequence, [&f, &t]);
        assert!(seq.output(&launcher).await.expect("seq").status.success());
    }
}
