use tracing::dispatcher::{Dispatch, set_global_default};
use tracing_subscriber::FmtSubscriber;

/// Install the global subscriber. Logs go to stderr so that they do not
/// interleave with the kuttl output passed through on stdout.
pub fn init(color: bool, json: bool, levels: &str) {
    let dispatch = if json {
        let formatter = FmtSubscriber::builder()
            .with_env_filter(levels)
            .with_writer(std::io::stderr)
            .json()
            .flatten_event(true)
            .finish();
        Dispatch::new(formatter)
    } else {
        let formatter = FmtSubscriber::builder()
            .with_ansi(color)
            .with_env_filter(levels)
            .with_writer(std::io::stderr)
            .finish();
        Dispatch::new(formatter)
    };

    // Ignore errors when setting, since tests can initialize this
    // multiple times.
    let _ = set_global_default(dispatch);
}
