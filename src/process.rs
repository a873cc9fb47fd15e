//! Sample program execution
//!
//! Every sample program runs as a separate interpreter process in the
//! scenario's working directory, with stdin closed and stdout captured.
//! A non-zero exit is reported as [`Error::Execution`] before any output
//! comparison happens.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::common::config::InterpreterConfig;
use crate::common::{Error, Result};

/// Lines of stderr kept in an execution error
const STDERR_SNIPPET_LINES: usize = 20;

/// Longest argument shown verbatim when describing a command
const MAX_SHOWN_ARG: usize = 48;

/// What to run for one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `<interpreter> <script> <args...>`
    Script { path: PathBuf, args: Vec<String> },
    /// `<interpreter> <inline flag> <code> <args...>`
    Inline {
        code: String,
        args: Vec<String>,
        /// Also write the captured text here, relative to the working directory
        output_file: Option<PathBuf>,
    },
}

/// Runs sample programs through one interpreter
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    base_args: Vec<String>,
    inline_flag: String,
    work_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner, resolving the interpreter on PATH
    pub fn new(interpreter: &InterpreterConfig, work_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            program: resolve_interpreter(&interpreter.command)?,
            base_args: interpreter.args.clone(),
            inline_flag: interpreter.inline_flag.clone(),
            work_dir: work_dir.into(),
            timeout: None,
        })
    }

    /// Kill the child and fail with [`Error::Timeout`] after `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a script file and return its captured stdout
    pub async fn run(&self, script: &Path, args: &[String]) -> Result<String> {
        let mut argv: Vec<OsString> = vec![script.as_os_str().to_owned()];
        argv.extend(args.iter().map(OsString::from));
        self.capture(argv).await
    }

    /// Run inline code passed as a single argument
    ///
    /// When `output_file` is given the captured text is also written there
    /// verbatim.
    pub async fn run_inline(
        &self,
        code: &str,
        args: &[String],
        output_file: Option<&Path>,
    ) -> Result<String> {
        let mut argv: Vec<OsString> = vec![OsString::from(&self.inline_flag), OsString::from(code)];
        argv.extend(args.iter().map(OsString::from));
        let text = self.capture(argv).await?;

        if let Some(file) = output_file {
            let path = if file.is_relative() {
                self.work_dir.join(file)
            } else {
                file.to_path_buf()
            };
            tokio::fs::write(&path, &text).await?;
            tracing::debug!(path = %path.display(), "persisted captured output");
        }
        Ok(text)
    }

    /// Run an [`Invocation`]
    pub async fn invoke(&self, invocation: &Invocation) -> Result<String> {
        match invocation {
            Invocation::Script { path, args } => self.run(path, args).await,
            Invocation::Inline {
                code,
                args,
                output_file,
            } => self.run_inline(code, args, output_file.as_deref()).await,
        }
    }

    async fn capture(&self, argv: Vec<OsString>) -> Result<String> {
        let command = self.describe(&argv);

        let child = Command::new(&self.program)
            .args(&self.base_args)
            .args(&argv)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(%command, work_dir = %self.work_dir.display(), "spawned sample program");
        let started = Instant::now();

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| Error::Timeout {
                    command: command.clone(),
                    timeout: limit,
                })??,
            None => child.wait_with_output().await?,
        };

        tracing::debug!(
            %command,
            exit_code = ?output.status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "sample program exited"
        );

        if !output.status.success() {
            return Err(Error::Execution {
                command,
                exit_code: output.status.code(),
                stderr: stderr_snippet(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        Ok(normalize_newlines(&String::from_utf8_lossy(&output.stdout)))
    }

    fn describe(&self, argv: &[OsString]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.base_args.iter().map(OsStr::new))
            .chain(argv.iter().map(|a| a.as_os_str()))
            .map(|arg| {
                let arg = arg.to_string_lossy();
                if arg.contains('\n') || arg.len() > MAX_SHOWN_ARG {
                    "<inline code>".to_string()
                } else {
                    arg.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolve a bare interpreter name on PATH; paths are used as given
fn resolve_interpreter(command: &str) -> Result<PathBuf> {
    let path = Path::new(command);
    if path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    which::which(command).map_err(|_| Error::InterpreterNotFound {
        name: command.to_string(),
    })
}

/// Convert `\r\n` and lone `\r` to `\n`
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn stderr_snippet(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_SNIPPET_LINES);
    lines[start..].join("\n")
}
