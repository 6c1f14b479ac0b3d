//! Derives resource descriptors from manifests and their annotations.

use std::{
    io,
    num::ParseIntError,
    path::{Component, Path, PathBuf},
};

use serde_json::{Map, Value};
use snafu::{ResultExt, Snafu};

use crate::{
    config::{AnnotationKeys, DEFAULT_CONDITION, DEFAULT_TIMEOUT_SECONDS},
    manifest::Manifest,
    resource::{Hooks, ResourceDescriptor, ResourceId, kind_group},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractError {
    #[snafu(display("resource {}: timeout value {:?} is not valid: {}", resource, value, source))]
    InvalidTimeout {
        resource: ResourceId,
        value: String,
        source: ParseIntError,
    },
    #[snafu(display("resource {}: annotation {} value {:?} {}", resource, key, value, reason))]
    InvalidAnnotation {
        resource: ResourceId,
        key: String,
        value: String,
        reason: &'static str,
    },
    #[snafu(display("resource {}: cannot find absolute path for {} {:?}: {}", resource, key, path, source))]
    PathResolution {
        resource: ResourceId,
        key: String,
        path: String,
        source: io::Error,
    },
    #[snafu(display("resource {}: cannot parse update parameter: {}", resource, source))]
    ParseUpdateParameter {
        resource: ResourceId,
        source: serde_json::Error,
    },
    #[snafu(display("resource {}: update parameter must be a JSON object", resource))]
    UpdateParameterNotObject { resource: ResourceId },
}

/// Defaults applied to every extracted resource.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub default_timeout_seconds: u64,
    pub default_conditions: Vec<String>,
    /// Update parameter applied to resources without their own annotation.
    pub update_parameter: Option<String>,
    pub annotation_keys: AnnotationKeys,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            default_conditions: vec![DEFAULT_CONDITION.to_owned()],
            update_parameter: None,
            annotation_keys: AnnotationKeys::default(),
        }
    }
}

/// A resource left out of the test case.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Skip {
    pub resource: ResourceId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Resource(Box<ResourceDescriptor>),
    Skipped(Skip),
}

/// Build the descriptor for `manifest`.
pub fn extract(manifest: &Manifest, options: &ExtractOptions) -> Result<Extraction, ExtractError> {
    let keys = &options.annotation_keys;
    let mut descriptor = ResourceDescriptor::new(
        kind_group(manifest.kind(), manifest.group()),
        manifest.name(),
        manifest.text.as_str(),
        options.default_timeout_seconds,
        options.default_conditions.clone(),
    );
    if let Some(namespace) = manifest.namespace() {
        descriptor = descriptor.with_namespace(namespace);
    }
    let resource = descriptor.id();

    if let Some(reason) = manifest.annotation(&keys.manual_intervention) {
        return Ok(Extraction::Skipped(Skip {
            resource,
            reason: reason.to_owned(),
        }));
    }

    let update_parameter = manifest
        .annotation(&keys.update_parameter)
        .or(options.update_parameter.as_deref());
    if let Some(raw) = update_parameter {
        descriptor = descriptor.with_update_parameter(parse_update_parameter(&resource, raw)?);
    }

    if let Some(value) = manifest.annotation(&keys.timeout) {
        descriptor.timeout_seconds = value.trim().parse::<u64>().context(InvalidTimeoutSnafu {
            resource: resource.clone(),
            value,
        })?;
    }

    if let Some(value) = manifest.annotation(&keys.conditions) {
        let conditions: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|condition| !condition.is_empty())
            .map(str::to_owned)
            .collect();
        if conditions.is_empty() {
            return InvalidAnnotationSnafu {
                resource,
                key: keys.conditions.as_str(),
                value,
                reason: "names no condition",
            }
            .fail();
        }
        descriptor.conditions = conditions;
    }

    let hook = |key: &str| hook_path(manifest, &resource, key);
    descriptor.hooks = Hooks {
        pre_assert: hook(&keys.pre_assert_hook)?,
        post_assert: hook(&keys.post_assert_hook)?,
        pre_delete: hook(&keys.pre_delete_hook)?,
        post_delete: hook(&keys.post_delete_hook)?,
    };

    if let Some(value) = manifest.annotation(&keys.disable_import) {
        descriptor.skip_import = match value.trim() {
            flag if flag.eq_ignore_ascii_case("true") => true,
            flag if flag.eq_ignore_ascii_case("false") => false,
            _ => {
                return InvalidAnnotationSnafu {
                    resource,
                    key: keys.disable_import.as_str(),
                    value,
                    reason: "is not a boolean",
                }
                .fail();
            }
        };
    }

    if let Some(value) = manifest.annotation(&keys.example_id) {
        descriptor.is_root = value.trim() == root_example_id(manifest);
    }

    Ok(Extraction::Resource(Box::new(descriptor)))
}

/// The example id a root resource carries: `<first group segment>/<version>/<kind>`.
fn root_example_id(manifest: &Manifest) -> String {
    let group = manifest.group().split('.').next().unwrap_or_default();
    format!("{}/{}/{}", group, manifest.version(), manifest.kind()).to_lowercase()
}

fn parse_update_parameter(
    resource: &ResourceId,
    raw: &str,
) -> Result<Map<String, Value>, ExtractError> {
    match serde_json::from_str(raw).context(ParseUpdateParameterSnafu {
        resource: resource.clone(),
    })? {
        Value::Object(object) => Ok(object),
        _ => UpdateParameterNotObjectSnafu {
            resource: resource.clone(),
        }
        .fail(),
    }
}

fn hook_path(
    manifest: &Manifest,
    resource: &ResourceId,
    key: &str,
) -> Result<Option<PathBuf>, ExtractError> {
    let Some(value) = manifest.annotation(key) else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return InvalidAnnotationSnafu {
            resource: resource.clone(),
            key,
            value,
            reason: "is empty",
        }
        .fail();
    }

    let base = manifest.file_path().parent().unwrap_or_else(|| Path::new(""));
    let absolute = std::path::absolute(base.join(value)).context(PathResolutionSnafu {
        resource: resource.clone(),
        key,
        path: value,
    })?;
    Ok(Some(clean(&absolute)))
}

/// Lexically resolve `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
