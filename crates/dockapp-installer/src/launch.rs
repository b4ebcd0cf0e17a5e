use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use dockapp_core::AppError;
use tracing::debug;

use crate::layout::APP_BASE_ENV;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub executable: PathBuf,
    pub args: Vec<String>,
    /// Overlaid on the inherited environment.
    pub env: BTreeMap<String, String>,
    pub detach: bool,
}

impl LaunchRequest {
    pub fn new(executable: impl Into<PathBuf>, app_base: &Path) -> Self {
        let mut env = BTreeMap::new();
        env.insert(
            APP_BASE_ENV.to_string(),
            app_base.to_string_lossy().into_owned(),
        );
        Self {
            executable: executable.into(),
            args: Vec::new(),
            env,
            detach: false,
        }
    }

    pub fn with_args(mut self, args: &[String]) -> Self {
        self.args = args.to_vec();
        self
    }

    pub fn detached(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Detached { pid: u32 },
    Exited,
}

pub fn spawn_app(request: &LaunchRequest) -> Result<LaunchOutcome> {
    let mut command = build_command(request);
    debug!(
        executable = %request.executable.display(),
        args = ?request.args,
        detach = request.detach,
        "spawning app"
    );

    if request.detach {
        command.stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let child = command
            .spawn()
            .with_context(|| format!("failed to start {}", request.executable.display()))?;
        return Ok(LaunchOutcome::Detached { pid: child.id() });
    }

    let status = wait_forwarding_signals(command, &request.executable)?;
    check_exit_status(&request.executable, status)?;
    Ok(LaunchOutcome::Exited)
}

pub(crate) fn build_command(request: &LaunchRequest) -> Command {
    let mut command = Command::new(&request.executable);
    command.args(&request.args).envs(&request.env);
    if let Some(dir) = request
        .executable
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        command.current_dir(dir);
    }
    command
}

fn check_exit_status(executable: &Path, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    let program = executable.display().to_string();
    if let Some(code) = status.code() {
        return Err(AppError::ChildFailed { program, code }.into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return Err(AppError::SignalInterrupted {
                name: signal_forwarding::signal_name(signo),
                signo,
            }
            .into());
        }
    }

    Err(AppError::ChildFailed { program, code: 1 }.into())
}

#[cfg(unix)]
fn wait_forwarding_signals(command: Command, executable: &Path) -> Result<ExitStatus> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start signal runtime")?;
    runtime.block_on(wait_or_forward(command, executable))
}

/// Waits for the child unless SIGINT or SIGTERM arrives first, in which case
/// the signal is passed on to the child and the wait is abandoned.
#[cfg(unix)]
async fn wait_or_forward(command: Command, executable: &Path) -> Result<ExitStatus> {
    use tokio::signal::unix::{signal, SignalKind};

    // Listen before spawning so a signal never reaches the default disposition.
    let mut interrupt = signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;
    let mut terminate = signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;
    let mut child = tokio::process::Command::from(command)
        .spawn()
        .with_context(|| format!("failed to start {}", executable.display()))?;

    let signo = tokio::select! {
        status = child.wait() => return status.context("failed to wait for app"),
        _ = interrupt.recv() => libc::SIGINT,
        _ = terminate.recv() => libc::SIGTERM,
    };

    let name = signal_forwarding::signal_name(signo);
    if let Some(pid) = child.id() {
        match signal_forwarding::forward(pid, signo) {
            Ok(()) => debug!(signal = %name, pid, "forwarded signal to app"),
            Err(err) => debug!(signal = %name, pid, error = %err, "app gone before forwarding"),
        }
    }
    Err(AppError::SignalInterrupted { name, signo }.into())
}

#[cfg(not(unix))]
fn wait_forwarding_signals(mut command: Command, executable: &Path) -> Result<ExitStatus> {
    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start {}", executable.display()))?;
    child.wait().context("failed to wait for app")
}

#[cfg(unix)]
pub(crate) mod signal_forwarding {
    use std::io;

    pub(crate) fn forward(pid: u32, signo: i32) -> io::Result<()> {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        // SAFETY: kill has no memory-safety preconditions; pid is our own child.
        if unsafe { libc::kill(pid, signo) } == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub(crate) fn signal_name(signo: i32) -> String {
        match signo {
            libc::SIGINT => "interrupt".to_string(),
            libc::SIGTERM => "terminated".to_string(),
            libc::SIGKILL => "killed".to_string(),
            libc::SIGHUP => "hangup".to_string(),
            other => format!("signal {other}"),
        }
    }
}
