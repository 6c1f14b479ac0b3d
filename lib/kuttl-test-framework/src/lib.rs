//! Kuttl test framework.
//!
//! Lays a rendered test case out on disk in the directory structure `kuttl`
//! expects (`<test directory>/case/NN-*.yaml`) and drives the `kuttl` binary
//! against it.

#![deny(missing_debug_implementations, missing_docs)]

#[macro_use]
extern crate tracing;

use std::{io, path::PathBuf, time::Duration};

use snafu::Snafu;

mod case_dir;
mod framework;
mod interface;
mod test_run;
mod util;

pub use case_dir::CASE_DIRECTORY;
pub use framework::Framework;
pub use interface::Interface;
pub use test_run::Outcome;

/// Errors raised while writing or executing a test case.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The stale contents of the destination could not be removed.
    #[snafu(display("cannot clean directory {}: {}", path.display(), source))]
    CleanDirectory {
        /// Directory being cleaned.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A directory could not be created.
    #[snafu(display("cannot create directory {}: {}", path.display(), source))]
    CreateDirectory {
        /// Directory being created.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A phase file could not be written.
    #[snafu(display("cannot write file {}: {}", path.display(), source))]
    WriteFile {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The staged case could not be moved into its final location.
    #[snafu(display("cannot move staged test case into {}: {}", path.display(), source))]
    Commit {
        /// Final location of the case.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A phase file name would escape the case directory.
    #[snafu(display("phase file name {:?} is not a plain file name", name))]
    InvalidFileName {
        /// Offending name.
        name: String,
    },

    /// The executor could not be started.
    #[snafu(display("cannot start {}: {}", command, source))]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying error.
        source: io::Error,
    },

    /// Waiting on the executor failed.
    #[snafu(display("cannot wait for {}: {}", command, source))]
    Wait {
        /// Rendered command line.
        command: String,
        /// Underlying error.
        source: io::Error,
    },

    /// The executor exceeded its deadline and was killed.
    #[snafu(display("{} did not finish within {:?}", command, deadline))]
    TimedOut {
        /// Rendered command line.
        command: String,
        /// Deadline that was exceeded.
        deadline: Duration,
    },
}

/// Result alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
