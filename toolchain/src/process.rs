//! Child process execution for toolchain commands.
//!
//! Every toolchain invocation funnels through [`execute`], which spawns the
//! command inside the project directory, waits for it, and turns whatever
//! happened into an [`ExitOutcome`]. A configured timeout kills the child
//! together with everything it forked and reports [`TIMEOUT_EXIT_CODE`].

use crate::provider::{ToolchainError, ToolchainResult};
use crate::types::{CommandLine, ExitOutcome, TIMEOUT_EXIT_CODE};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Options applied to every spawned child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Kill the child once it runs longer than this
    pub timeout: Option<Duration>,
    /// Forward child stdout/stderr to ours, otherwise discard it
    pub inherit_output: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            inherit_output: true,
        }
    }
}

/// Run `command` with `dir` as its working directory and wait for it to exit.
pub async fn execute(
    command: &CommandLine,
    dir: &Path,
    options: &ExecOptions,
) -> ToolchainResult<ExitOutcome> {
    let started = Instant::now();

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    // Own process group, so a timeout can take down everything the child forked
    #[cfg(unix)]
    cmd.process_group(0);

    if !options.inherit_output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    debug!("Spawning `{}` in {}", command, dir.display());
    let mut child = cmd.spawn().map_err(|e| ToolchainError::SpawnFailed {
        program: command.program.clone(),
        dir: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let status = match options.timeout {
        Some(limit) => match timeout(limit, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "`{}` in {} exceeded {:?}, killing it",
                    command,
                    dir.display(),
                    limit
                );
                kill_tree(&mut child, command).await;
                return Ok(ExitOutcome {
                    code: TIMEOUT_EXIT_CODE,
                    timed_out: true,
                    duration: started.elapsed(),
                });
            }
        },
        None => child.wait().await?,
    };

    Ok(ExitOutcome {
        code: exit_code(&status),
        timed_out: false,
        duration: started.elapsed(),
    })
}

/// Kill the child's whole process group, then reap the child.
async fn kill_tree(child: &mut Child, command: &CommandLine) {
    #[cfg(unix)]
    if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            Ok(()) => {
                if let Err(e) = child.wait().await {
                    warn!("Failed to reap `{}`: {}", command, e);
                }
                return;
            }
            Err(e) => debug!("killpg for `{}` failed: {}", command, e),
        }
    }

    if let Err(e) = child.kill().await {
        warn!("Failed to kill `{}`: {}", command, e);
    }
}

fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
