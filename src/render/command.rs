//! Typed kuttl commands and their serialization.

use std::{fmt::Write as _, path::Path};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    config::{OLD_ID_ANNOTATION, TEST_MARKER_ANNOTATION},
    resource::{ResourceDescriptor, UpdateAssertion},
};

const KUBECTL: &str = "${KUBECTL}";
const CROSSPLANE_NAMESPACE: &str = "${CROSSPLANE_NAMESPACE}";
const EXTERNAL_ID_PATH: &str = ".status.atProvider.id";

/// One entry of a kuttl `commands` list.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Entry {
    /// Executed directly, without a shell.
    Command(String),
    /// Executed through a shell.
    Script(String),
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (key, value) = match self {
            Entry::Command(value) => ("command", value),
            Entry::Script(value) => ("script", value),
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, value)?;
        map.end()
    }
}

/// What a wait blocks on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum WaitFor<'a> {
    Condition(&'a str),
    Delete,
}

/// Which part of the cluster a diagnostic dump lists.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Dump {
    Managed,
    Claims,
}

/// The commands the phases are built from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Command<'a> {
    /// Run a script given on the command line (setup, teardown).
    Run(&'a Path),
    /// Run a resource hook if it exists.
    Hook { label: &'static str, path: &'a Path },
    /// Mark every managed resource as created by this test.
    AnnotateTestMarker,
    /// Best-effort listing for the executor's log.
    Dump { dump: Dump, phase: &'static str },
    Wait {
        resource: &'a ResourceDescriptor,
        wait_for: WaitFor<'a>,
    },
    /// Wait for every (or every marked) managed resource to be gone.
    WaitAllDeleted { timeout_seconds: u64, marked_only: bool },
    Delete(&'a ResourceDescriptor),
    DeleteAll { marked_only: bool },
    ScaleCrossplane { replicas: u8 },
    ScaleProviders { replicas: u8 },
    StoreExternalId(&'a ResourceDescriptor),
    ClearConditions(&'a ResourceDescriptor),
    AssertExternalId(&'a ResourceDescriptor),
    AssertUpdated {
        resource: &'a ResourceDescriptor,
        assertion: &'a UpdateAssertion,
    },
}

impl Command<'_> {
    pub(crate) fn entry(&self) -> Entry {
        match *self {
            Command::Run(path) => Entry::Command(shell_word(&path_text(path))),
            Command::Hook { label, path } => {
                let text = path_text(path);
                let word = shell_word(&text);
                let echoed = double_quoted_body(&text);
                Entry::Script(format!(
                    "if [ -f {word} ]; then {word}; else echo \"Skipping {label} hook, {echoed} does not exist\"; fi"
                ))
            }
            Command::AnnotateTestMarker => Entry::Command(format!(
                "{KUBECTL} annotate managed --all {TEST_MARKER_ANNOTATION}=true --overwrite"
            )),
            Command::Dump { dump, phase } => Entry::Script(match dump {
                Dump::Managed => format!(
                    "echo \"Dump MR manifests for the {phase} assertion step:\"; {KUBECTL} get managed -o yaml || true"
                ),
                Dump::Claims => format!(
                    "echo \"Dump Claim manifests for the {phase} assertion step:\"; {KUBECTL} get claim --all-namespaces -o yaml || true"
                ),
            }),
            Command::Wait { resource, wait_for } => {
                let mut line = format!("{KUBECTL} wait {} ", resource.address());
                match wait_for {
                    WaitFor::Condition(condition) => {
                        let _ = write!(line, "--for=condition={condition}");
                    }
                    WaitFor::Delete => line.push_str("--for=delete"),
                }
                let _ = write!(line, " --timeout {}s", resource.timeout_seconds);
                push_namespace(&mut line, resource);
                Entry::Command(line)
            }
            Command::WaitAllDeleted {
                timeout_seconds,
                marked_only: false,
            } => Entry::Command(format!(
                "{KUBECTL} wait managed --all --for=delete --timeout {timeout_seconds}s"
            )),
            Command::WaitAllDeleted {
                timeout_seconds,
                marked_only: true,
            } => Entry::Script(for_each_marked(&format!(
                "{KUBECTL} wait \"$r\" --for=delete --timeout {timeout_seconds}s"
            ))),
            Command::Delete(resource) => {
                let mut line = format!("{KUBECTL} delete {} --wait=false", resource.address());
                push_namespace(&mut line, resource);
                line.push_str(" --ignore-not-found");
                Entry::Command(line)
            }
            Command::DeleteAll { marked_only: false } => Entry::Command(format!(
                "{KUBECTL} delete managed --all --wait=false --ignore-not-found"
            )),
            Command::DeleteAll { marked_only: true } => Entry::Script(for_each_marked(&format!(
                "{KUBECTL} delete \"$r\" --wait=false --ignore-not-found"
            ))),
            Command::ScaleCrossplane { replicas } => Entry::Command(format!(
                "{KUBECTL} scale deployment crossplane -n {CROSSPLANE_NAMESPACE} --replicas={replicas}"
            )),
            Command::ScaleProviders { replicas } => Entry::Script(format!(
                "{KUBECTL} -n {CROSSPLANE_NAMESPACE} get deploy --no-headers -o custom-columns=\":metadata.name\" | grep \"provider-\" | xargs {KUBECTL} -n {CROSSPLANE_NAMESPACE} scale deploy --replicas={replicas}"
            )),
            Command::StoreExternalId(resource) => {
                let address = resource.address();
                let current = get_jsonpath(resource, EXTERNAL_ID_PATH);
                let mut line = format!(
                    "{KUBECTL} annotate {address} {OLD_ID_ANNOTATION}=$({current}) --overwrite"
                );
                push_namespace(&mut line, resource);
                Entry::Script(line)
            }
            Command::ClearConditions(resource) => {
                let mut line = format!(
                    "{KUBECTL} --subresource=status patch {} --type=merge -p '{{\"status\":{{\"conditions\":[]}}}}'",
                    resource.address()
                );
                push_namespace(&mut line, resource);
                Entry::Command(line)
            }
            Command::AssertExternalId(resource) => {
                let fresh = get_jsonpath(resource, EXTERNAL_ID_PATH);
                let stored = get_jsonpath(resource, &format!(".metadata.annotations.{OLD_ID_ANNOTATION}"));
                Entry::Script(format!(
                    "new_id=\"$({fresh})\" && old_id=\"$({stored})\" && [ \"$new_id\" = \"$old_id\" ]"
                ))
            }
            Command::AssertUpdated {
                resource,
                assertion,
            } => Entry::Script(format!(
                "[ \"$({})\" = \"{}\" ]",
                get_jsonpath(resource, &assertion.key),
                double_quoted_body(&assertion.value)
            )),
        }
    }
}

/// `${KUBECTL} get <address> -o=jsonpath='{<path>}'`, namespaced when needed.
fn get_jsonpath(resource: &ResourceDescriptor, path: &str) -> String {
    let mut line = format!("{KUBECTL} get {} -o=jsonpath='{{{path}}}'", resource.address());
    push_namespace(&mut line, resource);
    line
}

fn push_namespace(line: &mut String, resource: &ResourceDescriptor) {
    if let Some(namespace) = &resource.namespace {
        let _ = write!(line, " --namespace {namespace}");
    }
}

/// Run `action` for every managed resource carrying the test marker, with
/// the resource bound to `$r`.
fn for_each_marked(action: &str) -> String {
    let marker = TEST_MARKER_ANNOTATION.replace('.', "\\.");
    format!(
        "for r in $({KUBECTL} get managed -o name); do if [ -n \"$({KUBECTL} get \"$r\" -o jsonpath='{{.metadata.annotations.{marker}}}' --ignore-not-found)\" ]; then {action}; fi; done"
    )
}

fn path_text(path: &Path) -> std::borrow::Cow<'_, str> {
    path.to_string_lossy()
}

/// Escape `value` for use between double quotes in a POSIX shell.
pub(crate) fn double_quoted_body(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quote `word` for a POSIX shell unless it is made of safe characters only.
pub(crate) fn shell_word(word: &str) -> String {
    let safe = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+' | '=' | ':' | ',' | '@' | '%')
        });
    if safe {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
