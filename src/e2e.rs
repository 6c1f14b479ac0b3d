//! One end-to-end run: synthesize the test case, write it out and run kuttl
//! against it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use kuttl_test_framework::{CASE_DIRECTORY, Framework, Outcome};
use snafu::{ResultExt, Snafu};

use crate::{
    extract::{ExtractError, ExtractOptions, Extraction, Skip, extract},
    plan::{PlanError, PlanOptions, TestPlanBuilder},
    prepare::{PrepareError, Preparer},
    render::{RenderError, RenderedCase, render},
    resource::ResourceId,
};

#[derive(Debug, Snafu)]
pub enum E2eError {
    #[snafu(display("cannot prepare manifests: {}", source))]
    Prepare { source: PrepareError },
    #[snafu(display("cannot build test plan: {}", source))]
    Extract { source: ExtractError },
    #[snafu(display("cannot build test plan: {}", source))]
    Plan { source: PlanError },
    #[snafu(display("cannot render kuttl files: {}", source))]
    Render { source: RenderError },
    #[snafu(display("cannot write kuttl test files: {}", source))]
    Write {
        source: kuttl_test_framework::Error,
    },
    #[snafu(display("cannot run kuttl: {}", source))]
    Execute {
        source: kuttl_test_framework::Error,
    },
    #[snafu(display("kuttl failed{}", code.map(|code| format!(" with exit code {code}")).unwrap_or_default()))]
    Failed { code: Option<i32> },
}

impl E2eError {
    /// Process exit status reported for this error.
    pub const fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            E2eError::Prepare { .. }
            | E2eError::Extract { .. }
            | E2eError::Plan { .. }
            | E2eError::Render { .. } => exitcode::CONFIG,
            E2eError::Write { .. } => exitcode::IOERR,
            E2eError::Execute { .. } => exitcode::SOFTWARE,
            E2eError::Failed { .. } => 1,
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct E2eOptions {
    pub manifest_paths: Vec<PathBuf>,
    pub data_source_path: Option<PathBuf>,
    /// Directory that receives the `case` directory.
    pub test_directory: PathBuf,
    pub extract: ExtractOptions,
    pub plan: PlanOptions,
}

/// A rendered test case and the resources left out of it.
#[derive(Debug)]
pub struct Synthesis {
    pub case: RenderedCase,
    pub skipped: Vec<Skip>,
    /// Resources that are only applied, never asserted on.
    pub inputs: Vec<ResourceId>,
    /// Timeout each kuttl step is given.
    pub timeout_seconds: u64,
}

/// Read the manifests and render the test case, without touching the test
/// directory.
pub fn synthesize(options: &E2eOptions) -> Result<Synthesis, E2eError> {
    let mut preparer = Preparer::new();
    if let Some(path) = &options.data_source_path {
        preparer = preparer.with_data_source(path);
    }
    let manifests = preparer
        .prepare(options.manifest_paths.as_slice())
        .context(PrepareSnafu)?;

    let mut builder = TestPlanBuilder::new(options.plan.clone());
    let mut skipped = Vec::new();
    let mut inputs = Vec::new();
    for manifest in &manifests {
        match extract(manifest, &options.extract).context(ExtractSnafu)? {
            Extraction::Resource(descriptor) => {
                if !descriptor.is_subject() {
                    info!(
                        message = "Applying resource without assertions.",
                        resource = %descriptor.id(),
                    );
                    inputs.push(descriptor.id());
                }
                builder = builder.resource(*descriptor);
            }
            Extraction::Skipped(skip) => {
                info!(
                    message = "Skipping resource since it requires manual intervention.",
                    resource = %skip.resource,
                    reason = %skip.reason,
                );
                skipped.push(skip);
            }
        }
    }

    let plan = builder.build().context(PlanSnafu)?;
    let case = render(&plan).context(RenderSnafu)?;
    Ok(Synthesis {
        case,
        skipped,
        inputs,
        timeout_seconds: plan.effective_timeout_seconds(),
    })
}

/// Synthesize, write and run the test case.
pub async fn run(options: &E2eOptions, framework: &Framework) -> Result<(), E2eError> {
    let synthesis = synthesize(options)?;

    let _cleanup = CaseCleanup::new(&options.test_directory);
    framework
        .write_case(&options.test_directory, synthesis.case)
        .context(WriteSnafu)?;

    info!(
        message = "Running kuttl tests.",
        test_directory = %options.test_directory.display(),
    );
    match framework
        .test(&options.test_directory, synthesis.timeout_seconds)
        .await
        .context(ExecuteSnafu)?
    {
        Outcome::Passed => {
            info!(message = "Tests passed.");
            Ok(())
        }
        Outcome::Failed { code } => FailedSnafu { code }.fail(),
    }
}

/// Removes the case directory when the run ends, and the test directory too
/// when nothing else is left in it.
#[derive(Debug)]
struct CaseCleanup {
    test_directory: PathBuf,
}

impl CaseCleanup {
    fn new(test_directory: &Path) -> Self {
        Self {
            test_directory: test_directory.to_path_buf(),
        }
    }
}

impl Drop for CaseCleanup {
    fn drop(&mut self) {
        let case = self.test_directory.join(CASE_DIRECTORY);
        match fs::remove_dir_all(&case) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(message = "Failed to remove test case directory.", path = %case.display(), %error);
                return;
            }
        }
        // Only succeeds when the directory is empty.
        let _ = fs::remove_dir(&self.test_directory);
    }
}
