use std::io::Stderr;
use tracing_subscriber::fmt::{self, format};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// stdout carries the receipt, logs go to stderr
type StderrLayer<S> = fmt::Layer<S, format::DefaultFields, format::Format, fn() -> Stderr>;

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "cart_tax=debug,info"
    } else {
        "cart_tax=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn stderr_layer<S>() -> StderrLayer<S> {
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr as fn() -> Stderr)
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer().compact())
        .init();
}

/// One JSON object per line, for log collectors.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer().json())
        .init();
}
