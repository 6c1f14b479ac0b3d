use std::{process::ExitStatus, time::Duration};

use snafu::ResultExt;
use tokio::process::Command;

use crate::{Result, SpawnSnafu, TimedOutSnafu, WaitSnafu};

/// Run `command` to completion, killing it once `deadline` elapses.
pub async fn run_command_with_deadline(
    mut command: Command,
    deadline: Duration,
) -> Result<ExitStatus> {
    let rendered = format!("{:?}", command.as_std());
    let mut child = command.spawn().context(SpawnSnafu {
        command: rendered.as_str(),
    })?;

    match tokio::time::timeout(deadline, child.wait()).await {
        Ok(status) => status.context(WaitSnafu { command: rendered }),
        Err(_elapsed) => {
            if let Err(error) = child.kill().await {
                warn!(message = "Failed to kill timed out process.", command = %rendered, %error);
            }
            TimedOutSnafu {
                command: rendered,
                deadline,
            }
            .fail()
        }
    }
}
