//! The interface to the executor and the cluster tooling.

use std::env;

/// Default `kuttl` invocation when `KUTTL` is not set.
pub const DEFAULT_KUTTL_COMMAND: &str = "kubectl-kuttl";

/// Default `kubectl` invocation when `KUBECTL` is not set.
pub const DEFAULT_KUBECTL_COMMAND: &str = "kubectl";

/// Commands used to drive a test run.
///
/// The rendered phase files refer to `${KUBECTL}` and
/// `${CROSSPLANE_NAMESPACE}`; `kuttl` expands them from its environment, so
/// `kubectl_command` is exported to the executor as `KUBECTL`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Interface {
    /// Program invoked as the `kuttl` executor.
    pub kuttl_command: String,

    /// Program the rendered steps use as `kubectl`.
    pub kubectl_command: String,
}

impl Interface {
    /// Build an [`Interface`] from the `KUTTL` and `KUBECTL` environment
    /// variables, falling back to the defaults when they are unset or empty.
    pub fn from_env() -> Self {
        Self {
            kuttl_command: non_empty_var("KUTTL").unwrap_or_else(|| DEFAULT_KUTTL_COMMAND.to_owned()),
            kubectl_command: non_empty_var("KUBECTL")
                .unwrap_or_else(|| DEFAULT_KUBECTL_COMMAND.to_owned()),
        }
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self {
            kuttl_command: DEFAULT_KUTTL_COMMAND.to_owned(),
            kubectl_command: DEFAULT_KUBECTL_COMMAND.to_owned(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
