use crate::config::LogLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Pretty;
use tracing_subscriber::prelude::*;
use tracing_web::{performance_layer, MakeWebConsoleWriter};

/// Installs the browser console subscriber. Safe to call more than once; later calls are ignored.
pub(crate) fn init(level: LogLevel) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());
    let perf_layer = performance_layer().with_details_from_fields(Pretty::default());

    let res = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level.into()))
        .with(fmt_layer)
        .with(perf_layer)
        .try_init();

    if res.is_ok() {
        tracing::debug!(%level, "logging initialised");
    }
}
