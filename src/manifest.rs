//! Decoded resource manifests.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

/// The identifying header every Kubernetes object carries.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectHeader {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
}

#[derive(Debug, Clone, Default, Deserialize, Eq, PartialEq)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub annotations: Option<IndexMap<String, String>>,
}

/// One object read from a manifest file.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// File the object was read from. Relative hook paths resolve against
    /// its directory.
    pub file_path: PathBuf,
    pub header: ObjectHeader,
    /// The object serialized back to YAML, as it is applied.
    pub text: String,
}

impl Manifest {
    /// Decode a single YAML document.
    pub fn from_value(
        file_path: impl Into<PathBuf>,
        value: serde_yaml::Value,
    ) -> Result<Self, serde_yaml::Error> {
        let text = serde_yaml::to_string(&value)?;
        let header = serde_yaml::from_value(value)?;
        Ok(Self {
            file_path: file_path.into(),
            header,
            text,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn name(&self) -> &str {
        &self.header.metadata.name
    }

    /// The namespace, when one is set and non-empty.
    pub fn namespace(&self) -> Option<&str> {
        self.header
            .metadata
            .namespace
            .as_deref()
            .filter(|namespace| !namespace.is_empty())
    }

    pub fn kind(&self) -> &str {
        &self.header.kind
    }

    /// API group; empty for the core group (`apiVersion: v1`).
    pub fn group(&self) -> &str {
        self.header
            .api_version
            .rsplit_once('/')
            .map_or("", |(group, _)| group)
    }

    pub fn version(&self) -> &str {
        self.header
            .api_version
            .rsplit_once('/')
            .map_or(self.header.api_version.as_str(), |(_, version)| version)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.header
            .metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(key))
            .map(String::as_str)
    }
}
