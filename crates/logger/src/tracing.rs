use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with `level` as the default verbosity.
///
/// `RUST_LOG` directives still override the default, and
/// `RUST_LOG_FORMAT=json` switches the output to the JSON layer.
pub fn init_tracing(level: &str) {
    let requested = level.parse::<LevelFilter>().ok();
    let default_level = requested.unwrap_or(LevelFilter::INFO);

    let env_filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let log_layer = match var("RUST_LOG_FORMAT").unwrap_or_default().as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();

    if requested.is_none() {
        warn!("unknown log level '{level}', falling back to info");
    }
}
