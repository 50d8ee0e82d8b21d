//! Ambient logging stack: a `tracing`/`tracing-subscriber` subscriber with a
//! `log`-macro bridge, matching the teacher's pretty-vs-JSON split.

use std::io::IsTerminal;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber. Safe to call once per process;
/// a second call (e.g. in tests that spawn the driver repeatedly) is
/// tolerated and simply leaves the first subscriber in place.
pub fn init_tracing(level: tracing::Level, json_output: bool) {
    // Bridges `log::{debug,info,warn,error}!` call sites into the same
    // subscriber so both styles land in one stream.
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let result = if json_output {
        let json_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stdout)
            .json();
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_timer(fmt::time::uptime())
            .with_ansi(std::io::stderr().is_terminal())
            .with_thread_ids(false)
            .with_thread_names(false)
            .compact();
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };

    if let Err(err) = result {
        eprintln!("note: tracing subscriber already initialized ({err}), continuing with it");
    }
}

/// Maps repeated `-v`/`-q`/`--silent` flags to a tracing level, mirroring
/// the driver's verbosity precedence.
pub fn level_for_verbosity(verbose_count: u8, quiet: bool, silent: bool) -> tracing::Level {
    if silent {
        return tracing::Level::ERROR;
    }
    if quiet {
        return tracing::Level::WARN;
    }
    match verbose_count {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
