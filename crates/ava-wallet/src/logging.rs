//! Tracing subscriber setup for applications embedding the wallet.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

use crate::error::WalletError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `level` when set. Pass `format = "json"` for
/// structured JSON lines; anything else gives human-readable text.
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: &str, format: &str) -> Result<(), WalletError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
    };
    result.map_err(|e: TryInitError| WalletError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_without_panicking() {
        let _ = init_logging("debug", "text");
        assert!(matches!(
            init_logging("info", "json"),
            Err(WalletError::Logging(_))
        ));
    }
}
