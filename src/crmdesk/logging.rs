//! Log setup for the binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! client's call. The filter comes from `CRMDESK_LOG` (same syntax as
//! `RUST_LOG`), falling back to `warn`, or `debug` with `--verbose`. Output
//! goes to stderr so table output on stdout stays clean.

use crate::error::{CrmError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "CRMDESK_LOG";

pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn filter(verbose: bool) -> Result<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level(verbose)))
        .map_err(|e| CrmError::Api(format!("Invalid log filter: {}", e)))
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) -> Result<()> {
    let filter = filter(verbose)?;
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn init_twice_is_fine() {
        init(false).unwrap();
        init(true).unwrap();
    }
}
