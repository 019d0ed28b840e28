//! Building and running svn command lines
//!
//! [`SvnCommand`] keeps sensitive arguments as [`Secret`]s so the rendered
//! command line used for logs and error messages is always masked.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use wait_timeout::ChildExt;

use crate::{Error, Result, Secret};

/// Locale forced on the client so its output is parseable.
const C_LOCALE: [(&str, &str); 4] = [
    ("LANG", "C"),
    ("LC_ALL", "C"),
    ("LC_MESSAGES", "C"),
    ("LC_CTYPE", "C"),
];

#[derive(Clone)]
enum Arg {
    Plain(String),
    Sensitive(Secret),
}

/// A single svn invocation.
#[derive(Clone)]
pub struct SvnCommand {
    program: PathBuf,
    args: Vec<Arg>,
}

impl SvnCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a plain argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// Append a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Append an argument that is masked when rendered.
    pub fn sensitive_arg(mut self, arg: Secret) -> Self {
        self.args.push(Arg::Sensitive(arg));
        self
    }

    /// Append a flag only when `enabled`.
    pub fn flag_if(self, enabled: bool, flag: &str) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments as they will be rendered in logs.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Plain(value) => value.clone(),
                Arg::Sensitive(secret) => secret.to_string(),
            })
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            match arg {
                Arg::Plain(value) => cmd.arg(value),
                Arg::Sensitive(secret) => cmd.arg(secret.expose()),
            };
        }
        cmd.envs(C_LOCALE)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run the command to completion.
    ///
    /// A non-zero exit is not an error here: it is reported through
    /// [`CommandOutput::exit_code`] with the captured streams. Errors are
    /// reserved for failing to start the process or exceeding `timeout`.
    pub fn run(&self, timeout: Option<Duration>) -> Result<CommandOutput> {
        let rendered = self.to_string();
        tracing::debug!(command = %rendered, "Running svn");

        let mut child = self
            .to_command()
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match timeout {
            None => child.wait().map_err(|source| self.spawn_error(source))?,
            Some(limit) => match child
                .wait_timeout(limit)
                .map_err(|source| self.spawn_error(source))?
            {
                Some(status) => status,
                None => {
                    tracing::warn!(command = %rendered, ?limit, "svn timed out, killing");
                    self.kill(&mut child)?;
                    return Err(Error::Timeout {
                        command: rendered,
                        after: limit,
                    });
                }
            },
        };

        let output = CommandOutput {
            command: rendered,
            exit_code: status.code(),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        };

        if !output.success() {
            tracing::warn!(
                command = %output.command,
                code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "svn exited unsuccessfully"
            );
        }

        Ok(output)
    }

    /// Kill a child that outlived its timeout and reap it.
    fn kill(&self, child: &mut Child) -> Result<ExitStatus> {
        if let Err(e) = child.kill() {
            // The child may have exited between the timeout and the kill.
            tracing::debug!(program = %self.program.display(), error = %e, "kill after timeout failed");
        }
        child.wait().map_err(|source| self.spawn_error(source))
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl fmt::Display for SvnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.display_args() {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SvnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SvnCommand").field(&self.to_string()).finish()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Captured result of one svn invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Masked command line
    pub command: String,
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into [`Error::CommandFailed`].
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: self.command,
                code: self.exit_code.unwrap_or(-1),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}
