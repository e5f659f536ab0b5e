/// Install the global tracing subscriber. Logs go to stderr; quiet mode
/// switches to JSON lines so stdout carries only the result document.
pub fn init_tracing(quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if quiet {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
