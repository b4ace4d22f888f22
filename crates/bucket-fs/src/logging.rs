//! Tracing subscriber setup for host binaries

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Use
/// `RUST_LOG=bucket_fs=debug` to see cache hits, misses and invalidations.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_cleanly() {
        // Only one global subscriber per process; whichever call loses must
        // report an error instead of panicking.
        let first = init();
        let second = init();
        assert!(first.is_err() || second.is_err());
        tracing::debug!("subscriber installed");
    }
}
