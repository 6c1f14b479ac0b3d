#[macro_use]
extern crate tracing;

use std::process::ExitCode;

use clap::Parser;
use kuttl_test_framework::{Framework, Interface};
use uptest::{
    cli::{LogFormat, Opts, SubCommand},
    e2e, trace,
};

fn main() -> ExitCode {
    let opts = Opts::parse();

    let levels = std::env::var("UPTEST_LOG").unwrap_or_else(|_| opts.log_level().to_owned());
    trace::init(
        opts.root.color.use_color(),
        opts.root.log_format == LogFormat::Json,
        &levels,
    );

    let code = match opts.sub_command {
        SubCommand::E2e(e2e_opts) => run_e2e(e2e_opts),
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run_e2e(opts: uptest::cli::E2eOpts) -> exitcode::ExitCode {
    let options = match opts.into_options() {
        Ok(options) => options,
        Err(error) => {
            error!(message = "Invalid options.", %error);
            return exitcode::USAGE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(message = "Failed to start runtime.", %error);
            return exitcode::OSERR;
        }
    };

    let framework = Framework::new(Interface::from_env());
    match runtime.block_on(e2e::run(&options, &framework)) {
        Ok(()) => exitcode::OK,
        Err(error) => {
            error!(message = "End-to-end test failed.", %error);
            error.exit_code()
        }
    }
}
