use std::{collections::BTreeMap, fmt, path::PathBuf};

use tokio::process::Child;
use tracing::debug;

use crate::{
    defaults::UNSET_EXE_PLACEHOLDER,
    input::StdinBuffer,
    launcher::Launcher,
    process::{
        CommandOutput, LaunchRequest, LaunchedProcess, ProcessLauncher, Spawned, StdinDelivery,
    },
    quoting, CommandLineError, EnvValue, OptionValue, Options, Platform, QuoteError,
};

/// An executable path, its argument vector, an environment overlay and optional
/// single-use stdin.
///
/// Mutators return `&mut Self` so calls can be chained on a binding:
///
/// ```
/// use cmdline::{CommandLine, Platform};
///
/// let mut cmd = CommandLine::with_exe_path("git").on_platform(Platform::Posix);
/// cmd.add_option("C", "/srv/repo").add_parameters(["log", "--oneline"]);
/// assert_eq!(cmd.command_line_string(), "git -C /srv/repo log --oneline");
/// ```
#[derive(Debug, Default)]
pub struct CommandLine {
    exe_path: Option<String>,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    input: Option<StdinBuffer>,
    platform: Platform,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exe_path(exe_path: impl Into<String>) -> Self {
        Self {
            exe_path: Some(exe_path.into()),
            ..Self::default()
        }
    }

    /// Seeds the vector with raw parameters, each stringified.
    pub fn with_parameters<I, T>(exe_path: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let mut cmd = Self::with_exe_path(exe_path);
        cmd.add_parameters(parameters);
        cmd
    }

    /// Emits `options` with this platform's syntax, then appends `args`.
    pub fn with_options<I, T>(
        exe_path: impl Into<String>,
        args: I,
        options: impl Into<Options>,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::with_options_on(Platform::current(), exe_path, args, options)
    }

    pub fn with_options_on<I, T>(
        platform: Platform,
        exe_path: impl Into<String>,
        args: I,
        options: impl Into<Options>,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let mut cmd = Self::with_exe_path(exe_path).on_platform(platform);
        cmd.add_options(options).add_parameters(args);
        cmd
    }

    /// Splits `line` and uses the first token as the executable path.
    pub fn parse(line: &str) -> Result<Self, QuoteError> {
        let mut tokens = quoting::split(line)?.into_iter();
        let mut cmd = Self::new();
        cmd.exe_path = tokens.next();
        cmd.args.extend(tokens);
        Ok(cmd)
    }

    /// Selects the option syntax used by later `add_option` calls.
    pub fn on_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the executable path once. Setting the same path again is a no-op.
    pub fn set_exe_path(
        &mut self,
        exe_path: impl Into<String>,
    ) -> Result<&mut Self, CommandLineError> {
        let requested = exe_path.into();
        match self.exe_path.as_ref() {
            Some(current) if *current != requested => Err(CommandLineError::ExePathConflict {
                current: current.clone(),
                requested,
            }),
            _ => {
                self.exe_path = Some(requested);
                Ok(self)
            }
        }
    }

    pub fn exe_path(&self) -> Option<&str> {
        self.exe_path.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.args
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Appends one argument verbatim. Arguments containing a NUL byte are rejected
    /// when the command is spawned.
    pub fn add_parameter(&mut self, parameter: impl ToString) -> &mut Self {
        self.args.push(parameter.to_string());
        self
    }

    pub fn add_parameters<I, T>(&mut self, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.args.extend(parameters.into_iter().map(|p| p.to_string()));
        self
    }

    pub fn add_option(&mut self, name: &str, value: impl Into<OptionValue>) -> &mut Self {
        let tokens = self.platform.expand_option(name, &value.into());
        self.args.extend(tokens);
        self
    }

    pub fn add_options(&mut self, options: impl Into<Options>) -> &mut Self {
        let tokens = options.into().to_args(self.platform);
        self.args.extend(tokens);
        self
    }

    /// Merges variables into the overlay. `Unset` values are skipped and leave any
    /// earlier value in place.
    pub fn with_environment<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<EnvValue>,
    {
        for (key, value) in vars {
            if let Some(value) = value.into().coerce() {
                self.env.insert(key.into(), value);
            }
        }
        self
    }

    /// Copies `data` into the stdin buffer, replacing (and wiping) any previous one.
    ///
    /// The buffer is consumed by the next spawn; call again before every run that
    /// needs input.
    pub fn with_input(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.input = Some(StdinBuffer::copy_from(data.as_ref()));
        self
    }

    /// `[exe] + args`, with the placeholder standing in for an unset executable.
    pub fn argv(&self) -> Vec<String> {
        let exe = self.exe_path.as_deref().unwrap_or(UNSET_EXE_PLACEHOLDER);
        let mut argv = Vec::with_capacity(1 + self.args.len());
        argv.push(exe.to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Display form of the whole command. Never used to start a process.
    pub fn command_line_string(&self) -> String {
        let exe = self.exe_path.as_deref().unwrap_or(UNSET_EXE_PLACEHOLDER);
        quoting::join(std::iter::once(exe).chain(self.args.iter().map(String::as_str)))
    }

    /// Starts the process through `launcher`.
    ///
    /// Buffered stdin is taken before anything else and wiped on every path out of
    /// this call, including spawn failures. It is written by a background task, so
    /// the caller can read the child's output meanwhile; [`StdinDelivery::wait`]
    /// reports a failed write without discarding the process handle.
    ///
    /// [`StdinDelivery::wait`]: crate::StdinDelivery::wait
    pub async fn spawn_with<L: ProcessLauncher>(
        &mut self,
        launcher: &L,
    ) -> Result<Spawned<L::Process>, CommandLineError> {
        let input = self.input.take();
        let program = self
            .exe_path
            .as_deref()
            .ok_or(CommandLineError::MissingExePath)?;
        self.reject_nul_bytes()?;

        let request = LaunchRequest {
            program,
            args: &self.args,
            env: &self.env,
            pipe_stdin: input.is_some(),
        };

        debug!(
            command = %self.command_line_string(),
            stdin_bytes = input.as_ref().map(StdinBuffer::len),
            "spawning process"
        );

        let mut process = launcher
            .launch(&request)
            .map_err(|source| CommandLineError::Spawn {
                program: PathBuf::from(program),
                source,
            })?;

        let stdin = match input {
            Some(input) => StdinDelivery::start(program, input, process.take_stdin()),
            None => StdinDelivery::default(),
        };

        Ok(Spawned { process, stdin })
    }

    /// Operating systems cannot pass a NUL byte inside an argument or variable.
    fn reject_nul_bytes(&self) -> Result<(), CommandLineError> {
        let has_nul = |s: &str| s.contains('\0');
        if self.exe_path.as_deref().is_some_and(has_nul) {
            return Err(CommandLineError::NulByte {
                field: "executable path".to_string(),
            });
        }
        if let Some(index) = self.args.iter().position(|arg| has_nul(arg)) {
            return Err(CommandLineError::NulByte {
                field: format!("argument {index}"),
            });
        }
        if let Some((key, _)) = self.env.iter().find(|(k, v)| has_nul(k) || has_nul(v)) {
            return Err(CommandLineError::NulByte {
                field: format!("environment variable `{}`", key.replace('\0', "\\0")),
            });
        }
        Ok(())
    }

    pub async fn spawn(
        &mut self,
        launcher: &Launcher,
    ) -> Result<Spawned<Child>, CommandLineError> {
        self.spawn_with(launcher).await
    }

    /// Spawns, then collects stdout/stderr and the exit status.
    pub async fn output(
        &mut self,
        launcher: &Launcher,
    ) -> Result<CommandOutput, CommandLineError> {
        let spawned = self.spawn(launcher).await?;
        launcher.collect(spawned).await
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line_string())
    }
}
