//! The test framework main entry point.

use std::path::Path;

use crate::{CASE_DIRECTORY, Interface, Outcome, Result, case_dir, test_run};

/// Framework wraps the interface to the system with an easy-to-use rust API
/// optimized for running a single kuttl test case.
#[derive(Debug)]
pub struct Framework {
    interface: Interface,
}

impl Framework {
    /// Create a new [`Framework`] powered by the passed interface.
    pub fn new(interface: Interface) -> Self {
        Self { interface }
    }

    /// Write the phase files into the case directory under `test_dir`,
    /// replacing whatever a previous run left there.
    pub fn write_case<I, N, C>(&self, test_dir: &Path, files: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<[u8]>,
    {
        case_dir::write(files, &test_dir.join(CASE_DIRECTORY))
    }

    /// Run the case under `test_dir`, allowing each step `timeout_seconds`.
    pub async fn test(&self, test_dir: &Path, timeout_seconds: u64) -> Result<Outcome> {
        test_run::invoke(&self.interface, test_dir, timeout_seconds).await
    }
}
