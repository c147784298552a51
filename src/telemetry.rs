//! Logging setup for the command-line front end.
//!
//! Logs go to stderr so command output on stdout stays pipeable. The filter
//! comes from `RUST_LOG` when set; `--verbose` overrides it with debug
//! output for this crate.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,splitclient=debug";

pub fn init_telemetry(verbose: bool) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
