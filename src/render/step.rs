use serde::Serialize;

use super::command::{Command, Entry};

const API_VERSION: &str = "kuttl.dev/v1beta1";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum StepKind {
    /// Commands run to drive the test forward.
    Step,
    /// Commands that must succeed within `timeout_seconds`.
    Assert { timeout_seconds: u64 },
}

/// A kuttl `TestStep` or `TestAssert` document.
#[derive(Debug)]
pub(crate) struct Step {
    kind: StepKind,
    entries: Vec<Entry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    api_version: &'static str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    commands: &'a [Entry],
}

impl Step {
    pub(crate) fn new(kind: StepKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub(crate) fn is_assert(&self) -> bool {
        matches!(self.kind, StepKind::Assert { .. })
    }

    pub(crate) fn push(&mut self, command: Command<'_>) {
        self.entries.push(command.entry());
    }

    pub(crate) fn extend<'a>(&mut self, commands: impl IntoIterator<Item = Command<'a>>) {
        self.entries.extend(commands.into_iter().map(|command| command.entry()));
    }

    /// Serialize the document, without a leading comment or separator.
    pub(crate) fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let (kind, timeout) = match self.kind {
            StepKind::Step => ("TestStep", None),
            StepKind::Assert { timeout_seconds } => ("TestAssert", Some(timeout_seconds)),
        };
        serde_yaml::to_string(&Document {
            api_version: API_VERSION,
            kind,
            timeout,
            commands: &self.entries,
        })
    }
}
