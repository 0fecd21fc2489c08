use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, ToolError};

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// `verbose` flag.
pub fn init_cli_logger(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "autodiag_tools=debug"
    } else {
        "autodiag_tools=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
