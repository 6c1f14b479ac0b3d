use std::{env, io, path::PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use snafu::{ResultExt, Snafu};

use crate::{
    config::{AnnotationKeys, DEFAULT_CONDITION, DEFAULT_TIMEOUT_SECONDS},
    e2e::E2eOptions,
    extract::ExtractOptions,
    plan::PlanOptions,
};

/// Default directory, under the system temporary directory, for test cases.
pub const DEFAULT_TEST_DIRECTORY: &str = "uptest-e2e";

#[derive(Debug, Snafu)]
pub enum OptsError {
    #[snafu(display("no manifests to test; pass them as an argument or in MANIFEST_LIST"))]
    NoManifests,
    #[snafu(display("cannot resolve path {}: {}", path.display(), source))]
    ResolvePath { path: PathBuf, source: io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "uptest", version, about = "Automated testing for Crossplane providers")]
pub struct Opts {
    #[command(flatten)]
    pub root: RootOpts,

    #[command(subcommand)]
    pub sub_command: SubCommand,
}

impl Opts {
    pub const fn log_level(&self) -> &'static str {
        match self.root.quiet {
            0 => match self.root.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            },
            1 => "warn",
            2 => "error",
            _ => "off",
        }
    }
}

#[derive(Args, Debug)]
pub struct RootOpts {
    /// Enable more detailed internal logging. Repeat to increase level. Overridden by `--quiet`.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce detail of internal logging. Repeat to reduce further. Overrides `--verbose`.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Set the logging format
    #[arg(long, default_value = "text", env = "UPTEST_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Control when ANSI terminal formatting is used.
    ///
    /// By default `uptest` will try and detect if `stderr` is a terminal, if it is
    /// ANSI will be enabled. Otherwise it will be disabled.
    #[arg(long, default_value = "auto", env = "UPTEST_COLOR", global = true)]
    pub color: Color,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Run end-to-end tests for the given example manifests.
    E2e(E2eOpts),
}

#[derive(Args, Debug)]
pub struct E2eOpts {
    /// Comma-separated list of manifest files to test.
    #[arg(env = "MANIFEST_LIST", value_delimiter = ',')]
    pub manifest_list: Vec<PathBuf>,

    /// File holding `${data.<key>}` values to inject into the manifests.
    #[arg(long, env = "UPTEST_DATASOURCE_PATH")]
    pub data_source: Option<PathBuf>,

    /// Script run before the resources are applied.
    #[arg(long)]
    pub setup_script: Option<PathBuf>,

    /// Script run after the resources are deleted.
    #[arg(long)]
    pub teardown_script: Option<PathBuf>,

    /// Default timeout in seconds for each resource.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub default_timeout: u64,

    /// Comma-separated conditions to wait for on each resource.
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_CONDITION)]
    pub default_conditions: Vec<String>,

    /// Update parameter applied to every resource without its own.
    #[arg(long, env = "UPTEST_UPDATE_PARAMETER")]
    pub update_parameter: Option<String>,

    /// Directory the kuttl test case is written to.
    #[arg(long, env = "UPTEST_TEST_DIR")]
    pub test_directory: Option<PathBuf>,

    /// Leave the resources in place after the test.
    #[arg(long)]
    pub skip_delete: bool,

    /// Skip the update step.
    #[arg(long)]
    pub skip_update: bool,

    /// Skip the import step.
    #[arg(long)]
    pub skip_import: bool,

    /// Only delete and await resources created by this test.
    #[arg(long)]
    pub only_clean_uptest_resources: bool,
}

impl E2eOpts {
    /// Resolve the parsed options into run options with absolute paths.
    pub fn into_options(self) -> Result<E2eOptions, OptsError> {
        let manifest_paths: Vec<PathBuf> = self
            .manifest_list
            .into_iter()
            .filter(|path| !path.as_os_str().is_empty())
            .map(absolute)
            .collect::<Result<_, _>>()?;
        if manifest_paths.is_empty() {
            return Err(OptsError::NoManifests);
        }

        let default_conditions = self
            .default_conditions
            .into_iter()
            .map(|condition| condition.trim().to_owned())
            .filter(|condition| !condition.is_empty())
            .collect();
        let test_directory = match self.test_directory {
            Some(path) => absolute(path)?,
            None => env::temp_dir().join(DEFAULT_TEST_DIRECTORY),
        };

        Ok(E2eOptions {
            manifest_paths,
            data_source_path: self.data_source.map(absolute).transpose()?,
            test_directory,
            extract: ExtractOptions {
                default_timeout_seconds: self.default_timeout,
                default_conditions,
                update_parameter: self.update_parameter.filter(|parameter| !parameter.is_empty()),
                annotation_keys: AnnotationKeys::default(),
            },
            plan: PlanOptions {
                default_timeout_seconds: self.default_timeout,
                setup_script: self.setup_script.map(absolute).transpose()?,
                teardown_script: self.teardown_script.map(absolute).transpose()?,
                skip_update: self.skip_update,
                skip_import: self.skip_import,
                skip_delete: self.skip_delete,
                only_clean_uptest_resources: self.only_clean_uptest_resources,
            },
        })
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf, OptsError> {
    std::path::absolute(&path).context(ResolvePathSnafu { path })
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Auto,
    Always,
    Never,
}

impl Color {
    pub fn use_color(self) -> bool {
        match self {
            Color::Auto => io::IsTerminal::is_terminal(&io::stderr()),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Opts {
        Opts::try_parse_from(std::iter::once("uptest").chain(args.iter().copied())).unwrap()
    }

    fn e2e(args: &[&str]) -> E2eOpts {
        let SubCommand::E2e(opts) = parse(args).sub_command;
        opts
    }

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let opts = e2e(&[
            "e2e",
            "/examples/bucket.yaml,/examples/claim.yaml",
            "--setup-script=/hooks/setup.sh",
            "--default-timeout=2400",
            "--default-conditions=Ready,Synced",
            "--skip-import",
            "--only-clean-uptest-resources",
            "--test-directory=/tmp/case-dir",
        ])
        .into_options()
        .unwrap();

        assert_eq!(
            opts.manifest_paths,
            [Path::new("/examples/bucket.yaml"), Path::new("/examples/claim.yaml")]
        );
        assert_eq!(opts.plan.setup_script.as_deref(), Some(Path::new("/hooks/setup.sh")));
        assert_eq!(opts.plan.teardown_script, None);
        assert_eq!(opts.plan.default_timeout_seconds, 2400);
        assert_eq!(opts.extract.default_timeout_seconds, 2400);
        assert_eq!(opts.extract.default_conditions, ["Ready", "Synced"]);
        assert!(opts.plan.skip_import);
        assert!(!opts.plan.skip_update);
        assert!(!opts.plan.skip_delete);
        assert!(opts.plan.only_clean_uptest_resources);
        assert_eq!(opts.test_directory, Path::new("/tmp/case-dir"));
    }

    #[test]
    fn defaults() {
        let opts = e2e(&["e2e", "/examples/bucket.yaml"]).into_options().unwrap();
        assert_eq!(opts.plan, PlanOptions::default());
        assert_eq!(opts.extract.default_conditions, ["Ready"]);
        assert_eq!(opts.extract.update_parameter, None);
        assert!(opts.test_directory.ends_with(DEFAULT_TEST_DIRECTORY));
    }

    #[test]
    fn relative_paths_are_made_absolute() {
        let opts = e2e(&["e2e", "examples/bucket.yaml"]).into_options().unwrap();
        assert!(opts.manifest_paths[0].is_absolute());
        assert!(opts.manifest_paths[0].ends_with("examples/bucket.yaml"));
    }

    #[test]
    fn missing_manifests_are_rejected() {
        assert!(matches!(
            e2e(&["e2e", ""]).into_options(),
            Err(OptsError::NoManifests)
        ));
    }

    #[test]
    fn log_level_from_counts() {
        assert_eq!(parse(&["e2e", "a.yaml"]).log_level(), "info");
        assert_eq!(parse(&["-vv", "e2e", "a.yaml"]).log_level(), "trace");
        assert_eq!(parse(&["e2e", "a.yaml", "-v"]).log_level(), "debug");
        assert_eq!(parse(&["-v", "-q", "e2e", "a.yaml"]).log_level(), "warn");
        assert_eq!(parse(&["-qqq", "e2e", "a.yaml"]).log_level(), "off");
    }
}
