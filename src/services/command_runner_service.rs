//! One-shot shell execution with a bounded lifetime, used by the
//! console's "test command" feature.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug)]
pub struct CommandOutcome {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandRunError {
    #[error("Failed to run command: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs `command` under `/bin/sh -c` and captures its output. When the
/// limit elapses the child is killed (kill_on_drop) and the call still
/// resolves with `timed_out` set, so the caller is never blocked past
/// the limit.
pub async fn run_with_timeout(
    command: &str,
    limit: Duration,
) -> Result<CommandOutcome, CommandRunError> {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(limit, cmd.output()).await {
        Ok(output) => {
            let output = output?;
            Ok(CommandOutcome {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
            })
        }
        Err(_) => Ok(CommandOutcome {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let outcome = run_with_timeout("echo hello", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome.code, Some(0));
        assert!(outcome.stdout.contains("hello"));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn captures_stderr_and_nonzero_exit() {
        let outcome = run_with_timeout("echo oops 1>&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome.code, Some(3));
        assert!(outcome.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn long_running_command_times_out() {
        let outcome = run_with_timeout("sleep 5", Duration::from_millis(200))
            .await
            .unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.code, None);
    }
}
