//! Writes the phase files of one test case.

use std::{
    fs, io,
    path::{Component, Path},
};

use snafu::{ResultExt, ensure};

use crate::{
    CleanDirectorySnafu, CommitSnafu, CreateDirectorySnafu, InvalidFileNameSnafu, Result,
    WriteFileSnafu,
};

/// Name of the directory, under the test directory, that holds the case.
pub const CASE_DIRECTORY: &str = "case";

const STAGING_PREFIX: &str = ".uptest-case-";

/// Replace the contents of `destination` with `files`.
///
/// The files are staged in a sibling temporary directory which is swapped
/// into place once every file is written, so a failure part way through
/// leaves the previous contents of `destination` untouched.
pub(crate) fn write<I, N, C>(files: I, destination: &Path) -> Result<()>
where
    I: IntoIterator<Item = (N, C)>,
    N: AsRef<str>,
    C: AsRef<[u8]>,
{
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).context(CreateDirectorySnafu { path: parent })?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .context(CreateDirectorySnafu { path: parent })?;

    for (name, contents) in files {
        let name = name.as_ref();
        ensure!(is_plain_file_name(name), InvalidFileNameSnafu { name });

        let path = staging.path().join(name);
        fs::write(&path, contents.as_ref()).context(WriteFileSnafu { path })?;
    }

    remove_stale(destination)?;

    let staged = staging.keep();
    if let Err(source) = fs::rename(&staged, destination) {
        if let Err(error) = fs::remove_dir_all(&staged) {
            warn!(message = "Failed to remove staged test case.", path = %staged.display(), %error);
        }
        return Err(source).context(CommitSnafu { path: destination });
    }

    debug!(message = "Wrote test case.", path = %destination.display());
    Ok(())
}

fn remove_stale(destination: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(destination) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(destination),
        Ok(_) => fs::remove_file(destination),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    };
    result.context(CleanDirectorySnafu { path: destination })
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
