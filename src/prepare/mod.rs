//! Reads manifest files into decoded manifests.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use rand::Rng;
use serde::Deserialize;
use snafu::{ResultExt, Snafu, ensure};

use crate::manifest::Manifest;

mod vars;

pub use vars::inject_values;

#[derive(Debug, Snafu)]
pub enum PrepareError {
    #[snafu(display("cannot read data source file {}: {}", path.display(), source))]
    ReadDataSource { path: PathBuf, source: io::Error },
    #[snafu(display("cannot parse data source file {}: {}", path.display(), source))]
    ParseDataSource {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[snafu(display("cannot read {}: {}", path.display(), source))]
    ReadManifest { path: PathBuf, source: io::Error },
    #[snafu(display("cannot decode manifest {}: {}", path.display(), source))]
    DecodeManifest {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[snafu(display("manifest {} document {} is not an object", path.display(), index))]
    NotAnObject { path: PathBuf, index: usize },
}

/// Loads manifests, filling in data-source values and random names.
#[derive(Debug, Default)]
pub struct Preparer {
    data_source_path: Option<PathBuf>,
}

impl Preparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `${data.<key>}` values from the YAML mapping at `path`.
    pub fn with_data_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_source_path = Some(path.into());
        self
    }

    /// Read and decode every file in `paths`, keeping file order and then
    /// document order.
    pub fn prepare<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Manifest>, PrepareError> {
        self.prepare_with_rng(paths, &mut rand::rng())
    }

    pub fn prepare_with_rng<P: AsRef<Path>, R: Rng>(
        &self,
        paths: &[P],
        rng: &mut R,
    ) -> Result<Vec<Manifest>, PrepareError> {
        let data = self.data_source()?;

        let mut manifests = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let text = fs::read_to_string(path).context(ReadManifestSnafu { path })?;
            let text = inject_values(&text, &data, rng);
            let decoded = decode(path, &text)?;
            debug!(
                message = "Read manifest file.",
                path = %path.display(),
                objects = decoded.len(),
            );
            manifests.extend(decoded);
        }
        Ok(manifests)
    }

    fn data_source(&self) -> Result<HashMap<String, String>, PrepareError> {
        let Some(path) = &self.data_source_path else {
            return Ok(HashMap::new());
        };
        let text = fs::read_to_string(path).context(ReadDataSourceSnafu { path })?;
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_yaml::from_str(&text).context(ParseDataSourceSnafu { path })
    }
}

/// Decode every YAML (or JSON) document in `text`, skipping empty ones.
pub fn decode(path: &Path, text: &str) -> Result<Vec<Manifest>, PrepareError> {
    let mut manifests = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = serde_yaml::Value::deserialize(document).context(DecodeManifestSnafu { path })?;
        if value.is_null() {
            continue;
        }
        ensure!(value.is_mapping(), NotAnObjectSnafu { path, index });
        manifests.push(Manifest::from_value(path, value).context(DecodeManifestSnafu { path })?);
    }
    Ok(manifests)
}
