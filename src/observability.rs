//! Logging setup for the `statarb` binary

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr fmt subscriber filtered by `verbosity`.
///
/// `verbosity` is any `EnvFilter` directive (`info`, `statarb=debug`, ...).
/// `RUST_LOG` wins when it is set.
pub fn init_logging(verbosity: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(verbosity))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    Ok(())
}
