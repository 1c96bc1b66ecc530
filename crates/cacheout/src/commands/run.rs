//! Serve or record the output of a command line

use crate::cli::CliError;
use cacheout_cache::{CacheKey, CacheStore, Resolution, Validity};
use std::io::Write;
use tracing::instrument;

/// Replay the cached output of `command` or run it and cache the output.
///
/// The command's stdout is written to `out` either way; its stderr goes
/// straight to the terminal and is never cached.
#[instrument(name = "run_cached", skip(store, validity, out))]
pub fn run_cached(
    store: &CacheStore,
    command: &str,
    validity: Validity,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    store.ensure_exists()?;
    let key = CacheKey::derive(command);

    match store.resolve(command, &key, validity, out)? {
        Resolution::Served { bytes } => {
            tracing::debug!(%key, bytes, "Replayed cached output");
        }
        Resolution::Recorded { bytes } => {
            tracing::debug!(
                %key,
                bytes,
                days = validity.as_duration().as_secs() / 86_400,
                "Cached output"
            );
        }
    }
    Ok(())
}
