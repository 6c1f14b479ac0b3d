//! Run `kuttl` against a written test case.

use std::{
    io,
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::process::Command;

use crate::{Interface, Result, util::run_command_with_deadline};

/// Upper bound on the number of phase files in one case.
pub(crate) const MAX_STEPS: u32 = 8;

const DEADLINE_GRACE: Duration = Duration::from_secs(60);

/// Result of a completed `kuttl` run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    /// Every step of the case passed.
    Passed,

    /// `kuttl` exited unsuccessfully; `code` is `None` when it was killed by
    /// a signal.
    Failed {
        /// Exit code of the executor.
        code: Option<i32>,
    },
}

impl Outcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Passed
        } else {
            Self::Failed {
                code: status.code(),
            }
        }
    }

    /// Whether the run passed.
    pub fn is_passed(self) -> bool {
        self == Self::Passed
    }
}

/// Run the cases under `test_dir`, allowing each step `timeout_seconds`.
///
/// The executor's stdout and stderr are both passed through to our stdout.
pub(crate) async fn invoke(
    interface: &Interface,
    test_dir: &Path,
    timeout_seconds: u64,
) -> Result<Outcome> {
    let mut command = Command::new(&interface.kuttl_command);

    command.arg("test");
    command.arg("--start-kind=false");
    command.arg("--skip-cluster-delete");
    command.arg(test_dir);
    command.arg("--timeout");
    command.arg(timeout_seconds.to_string());

    command.env("KUBECTL", &interface.kubectl_command);

    command.stdin(Stdio::null());
    command.stdout(Stdio::inherit());
    command.stderr(io::stdout());
    command.kill_on_drop(true);

    info!(
        message = "Running kuttl.",
        test_directory = %test_dir.display(),
        timeout_seconds,
    );
    let status = run_command_with_deadline(command, deadline(timeout_seconds)).await?;
    Ok(Outcome::from_status(status))
}

fn deadline(timeout_seconds: u64) -> Duration {
    Duration::from_secs(timeout_seconds.saturating_mul(u64::from(MAX_STEPS)))
        .saturating_add(DEADLINE_GRACE)
}
