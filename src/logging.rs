//! Diagnostic logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "info,contextcore_demo=debug";

/// Installs a stderr `tracing` subscriber.
///
/// A non-empty `RUST_LOG` wins; otherwise `verbose` selects between the
/// quiet and chatty defaults. A second call is a no-op.
///
/// # Errors
///
/// Returns an error string if `RUST_LOG` holds an invalid filter.
pub fn init(verbose: bool) -> Result<(), String> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => {
            EnvFilter::try_from_default_env().map_err(|e| format!("invalid RUST_LOG: {e}"))?
        }
        _ => EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
