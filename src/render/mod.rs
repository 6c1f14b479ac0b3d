//! Renders a test plan into kuttl phase files.
//!
//! Every phase produces two files, a step and an assertion, prefixed with the
//! phase number so that kuttl runs them in order:
//!
//! | phase  | step             | assertion        |
//! |--------|------------------|------------------|
//! | apply  | `00-apply.yaml`  | `00-assert.yaml` |
//! | update | `01-update.yaml` | `01-assert.yaml` |
//! | import | `02-import.yaml` | `02-assert.yaml` |
//! | delete | `03-delete.yaml` | `03-assert.yaml` |
//!
//! Skipped phases leave out both files without renumbering the others.

use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};

use crate::{plan::TestPlan, resource::ResourceId};

mod command;
mod phases;
mod step;

#[derive(Debug, Snafu)]
pub enum RenderError {
    #[snafu(display("resource {}: {} is empty", resource, field))]
    EmptyField {
        resource: ResourceId,
        field: &'static str,
    },
    #[snafu(display("resource {}: {} {:?} must be a single word", resource, field, value))]
    InvalidField {
        resource: ResourceId,
        field: &'static str,
        value: String,
    },
    #[snafu(display("resource {}: no condition to wait for", resource))]
    NoConditions { resource: ResourceId },
    #[snafu(display(
        "resource {}: timeout {}s exceeds the test case timeout {}s",
        resource,
        timeout_seconds,
        effective_timeout_seconds
    ))]
    TimeoutNotCovered {
        resource: ResourceId,
        timeout_seconds: u64,
        effective_timeout_seconds: u64,
    },
    #[snafu(display("resource {}: update assertion path {:?} cannot be quoted", resource, key))]
    InvalidUpdateKey { resource: ResourceId, key: String },
    #[snafu(display("path {} is not valid UTF-8", path.display()))]
    NonUtf8Path { path: PathBuf },
    #[snafu(display("cannot serialize {}: {}", file, source))]
    EncodeFile {
        file: String,
        source: serde_yaml::Error,
    },
}

/// The phases of a test case, in execution order.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Apply,
    Update,
    Import,
    Delete,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Apply, Phase::Update, Phase::Import, Phase::Delete];

    pub const fn number(self) -> u8 {
        match self {
            Phase::Apply => 0,
            Phase::Update => 1,
            Phase::Import => 2,
            Phase::Delete => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Apply => "apply",
            Phase::Update => "update",
            Phase::Import => "import",
            Phase::Delete => "delete",
        }
    }

    pub fn step_file_name(self) -> String {
        format!("{:02}-{}.yaml", self.number(), self.name())
    }

    pub fn assert_file_name(self) -> String {
        format!("{:02}-assert.yaml", self.number())
    }

    fn is_skipped(self, plan: &TestPlan) -> bool {
        match self {
            Phase::Apply => false,
            Phase::Update => plan.skip_update(),
            Phase::Import => plan.skip_import(),
            Phase::Delete => plan.skip_delete(),
        }
    }
}

/// The rendered phase files, in execution order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RenderedCase {
    files: Vec<(String, String)>,
}

impl RenderedCase {
    pub fn files(&self) -> &[(String, String)] {
        &self.files
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file_name, _)| file_name == name)
            .map(|(_, contents)| contents.as_str())
    }

}

impl IntoIterator for RenderedCase {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Render every phase of `plan` that is not skipped.
///
/// The plan is validated first; on error nothing is rendered.
pub fn render(plan: &TestPlan) -> Result<RenderedCase, RenderError> {
    validate(plan)?;

    let mut files = Vec::with_capacity(Phase::ALL.len() * 2);
    for phase in Phase::ALL {
        if phase.is_skipped(plan) {
            debug!(message = "Skipping phase.", phase = phase.name());
            continue;
        }
        let step_file_name = phase.step_file_name();
        let step = phases::step_file(plan, phase).context(EncodeFileSnafu {
            file: step_file_name.as_str(),
        })?;
        files.push((step_file_name, step));

        let assert_file_name = phase.assert_file_name();
        let assertion = phases::assert_file(plan, phase).context(EncodeFileSnafu {
            file: assert_file_name.as_str(),
        })?;
        files.push((assert_file_name, assertion));
    }
    Ok(RenderedCase { files })
}

fn validate(plan: &TestPlan) -> Result<(), RenderError> {
    for script in [plan.setup_script(), plan.teardown_script()].into_iter().flatten() {
        utf8_path(script)?;
    }

    for resource in plan.resources() {
        let id = resource.id();
        ensure!(
            !resource.name.is_empty(),
            EmptyFieldSnafu {
                resource: id,
                field: "name",
            }
        );
        ensure!(
            !resource.manifest_text.trim().is_empty(),
            EmptyFieldSnafu {
                resource: id,
                field: "manifest",
            }
        );
        single_word(&id, "name", &resource.name)?;
        single_word(&id, "kind", &resource.kind_group)?;
        if let Some(namespace) = &resource.namespace {
            single_word(&id, "namespace", namespace)?;
        }

        if !resource.is_subject() {
            continue;
        }

        ensure!(
            !resource.conditions.is_empty(),
            NoConditionsSnafu { resource: id }
        );
        for condition in &resource.conditions {
            single_word(&id, "condition", condition)?;
        }
        ensure!(
            resource.timeout_seconds <= plan.effective_timeout_seconds(),
            TimeoutNotCoveredSnafu {
                resource: id,
                timeout_seconds: resource.timeout_seconds,
                effective_timeout_seconds: plan.effective_timeout_seconds(),
            }
        );
        if let Some(assertion) = &resource.update_assertion {
            ensure!(
                !assertion.key.contains(['\'', '}']) && !assertion.key.chars().any(char::is_control),
                InvalidUpdateKeySnafu {
                    resource: id,
                    key: assertion.key.as_str(),
                }
            );
        }
        let hooks = &resource.hooks;
        for hook in [&hooks.pre_assert, &hooks.post_assert, &hooks.pre_delete, &hooks.post_delete]
            .into_iter()
            .flatten()
        {
            utf8_path(hook)?;
        }
    }
    Ok(())
}

fn single_word(resource: &ResourceId, field: &'static str, value: &str) -> Result<(), RenderError> {
    ensure!(
        !value.is_empty(),
        EmptyFieldSnafu {
            resource: resource.clone(),
            field,
        }
    );
    ensure!(
        !value.chars().any(|c| c.is_whitespace() || c.is_control()),
        InvalidFieldSnafu {
            resource: resource.clone(),
            field,
            value,
        }
    );
    Ok(())
}

fn utf8_path(path: &Path) -> Result<&str, RenderError> {
    path.to_str().ok_or_else(|| RenderError::NonUtf8Path {
        path: path.to_path_buf(),
    })
}
