use std::{
    fs,
    path::{Path, PathBuf},
};

use uptest::{e2e::E2eOptions, extract::ExtractOptions, plan::PlanOptions};

mod run;
mod synthesize;

/// A scratch area holding example manifests and a test directory.
struct Workspace {
    root: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn test_directory(&self) -> PathBuf {
        self.root.path().join("uptest-e2e")
    }

    fn options(&self, manifest_paths: Vec<PathBuf>) -> E2eOptions {
        E2eOptions {
            manifest_paths,
            data_source_path: None,
            test_directory: self.test_directory(),
            extract: ExtractOptions {
                default_timeout_seconds: 10,
                ..ExtractOptions::default()
            },
            plan: PlanOptions {
                default_timeout_seconds: 10,
                ..PlanOptions::default()
            },
        }
    }
}
