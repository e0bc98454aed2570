// ABOUTME: Shared logging setup for ollama binaries
// ABOUTME: init() for stderr at a fixed level, init_for() to scope verbose output to one crate

use tracing_subscriber::EnvFilter;

/// Level used by [`init`] when RUST_LOG does not say otherwise.
pub const DEFAULT_LEVEL: tracing::Level = tracing::Level::INFO;

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LEVEL.into()))
        .init();
}

/// Crate-filtered logging to stderr at `level` for the named crates, WARN for
/// everything else. Used by the signing CLI so `-v` shows signer decisions
/// without reqwest/hyper noise.
pub fn init_for(crate_names: &[&str], level: tracing::Level) {
    let mut filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    for name in crate_names {
        let directive = format!("{}={}", name.replace('-', "_"), level);
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
