//! Tracing setup for the binary.
//!
//! `LUSODRILL_LOG` overrides the configured filter (e.g. "debug" or
//! "warn,lusodrill::session=debug"). `LUSODRILL_LOG_FORMAT=json` switches to
//! JSON lines. Output goes to stderr so it never mixes with the lesson view.

use tracing_subscriber::EnvFilter;

pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env("LUSODRILL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("LUSODRILL_LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
