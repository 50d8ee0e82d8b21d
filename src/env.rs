//! Small environment helpers, in the teacher's `pub use std::env::*` style.

pub use std::env::*;
use std::sync::LazyLock;

/// Name of the directory (relative to the workspace root) holding the file
/// hash cache, per `<repo>/.cache/<tool-name>.json`.
pub const CACHE_DIR_NAME: &str = ".cache";

/// Wall-clock timeout applied to every tool probe.
pub const TOOL_PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Hard ceiling on worker pool size, independent of requested/cpu count.
pub const MAX_WORKERS_CEILING: usize = 8;

/// Whether the `CI` environment variable is set to a truthy value.
pub static CI_ENV: LazyLock<bool> = LazyLock::new(|| {
    var("CI")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
});
