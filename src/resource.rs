//! The resource descriptor: one manifest with its test parameters.

use std::{fmt, path::PathBuf};

use serde_json::{Map, Value};

/// Kind-group of core `v1` secrets.
pub const SECRET_KIND_GROUP: &str = "secret.";

/// How a resource takes part in a test case.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Role {
    /// Applied, awaited, asserted, imported and deleted.
    Subject,
    /// Only applied, so that subjects can consume it.
    Input,
}

/// Lower-cased `<kind>.<group>`, the form `kubectl` accepts as a resource
/// type. Core group resources end in a bare dot (`secret.`).
pub fn kind_group(kind: &str, group: &str) -> String {
    format!("{kind}.{group}").to_lowercase()
}

/// Identity of a resource within a plan.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceId {
    pub kind_group: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl ResourceId {
    /// The `kind.group/name` address used on `kubectl` command lines.
    pub fn address(&self) -> String {
        format!("{}/{}", self.kind_group, self.name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind_group, self.name)?;
        if let Some(namespace) = &self.namespace {
            write!(f, " in namespace {namespace}")?;
        }
        Ok(())
    }
}

/// Absolute paths of the scripts run around a resource's assertions and
/// deletion.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Hooks {
    pub pre_assert: Option<PathBuf>,
    pub post_assert: Option<PathBuf>,
    pub pre_delete: Option<PathBuf>,
    pub post_delete: Option<PathBuf>,
}

/// The field checked after the update step and the value it must hold.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UpdateAssertion {
    /// Jsonpath of the field, e.g. `.spec.forProvider.tags.uptest`.
    pub key: String,
    pub value: String,
}

impl UpdateAssertion {
    /// Derive the assertion from an update parameter.
    ///
    /// Only the first key of each object is followed, so a parameter touching
    /// several fields is asserted on the first one alone. Returns `None` for
    /// an empty parameter.
    pub fn from_parameter(parameter: &Map<String, Value>) -> Option<Self> {
        let (key, value) = parameter.iter().next()?;
        let mut path = format!(".{key}");
        let mut current = value;

        loop {
            let object = match current {
                Value::Object(object) => object,
                leaf => {
                    return Some(Self {
                        key: path,
                        value: leaf_text(leaf),
                    });
                }
            };
            match object.iter().next() {
                Some((key, value)) => {
                    path.push('.');
                    path.push_str(key);
                    current = value;
                }
                None => {
                    return Some(Self {
                        key: path,
                        value: String::new(),
                    });
                }
            }
        }
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One resource of a test case with its test parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub role: Role,
    pub name: String,
    pub namespace: Option<String>,
    pub kind_group: String,
    /// The body applied in the apply step.
    pub manifest_text: String,
    pub timeout_seconds: u64,
    /// Conditions awaited in order after apply.
    pub conditions: Vec<String>,
    pub hooks: Hooks,
    pub update_assertion: Option<UpdateAssertion>,
    pub skip_import: bool,
    pub is_root: bool,
}

impl ResourceDescriptor {
    /// A subject with the given identity and parameters, no hooks and no
    /// update.
    pub fn new(
        kind_group: impl Into<String>,
        name: impl Into<String>,
        manifest_text: impl Into<String>,
        timeout_seconds: u64,
        conditions: Vec<String>,
    ) -> Self {
        let kind_group = kind_group.into();
        let role = if kind_group == SECRET_KIND_GROUP {
            Role::Input
        } else {
            Role::Subject
        };
        Self {
            role,
            name: name.into(),
            namespace: None,
            kind_group,
            manifest_text: manifest_text.into(),
            timeout_seconds,
            conditions,
            hooks: Hooks::default(),
            update_assertion: None,
            skip_import: false,
            is_root: false,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Derive the update assertion from `parameter`.
    pub fn with_update_parameter(mut self, parameter: Map<String, Value>) -> Self {
        self.update_assertion = UpdateAssertion::from_parameter(&parameter);
        self
    }

    pub fn id(&self) -> ResourceId {
        ResourceId {
            kind_group: self.kind_group.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}/{}", self.kind_group, self.name)
    }

    pub fn is_subject(&self) -> bool {
        self.role == Role::Subject
    }
}
