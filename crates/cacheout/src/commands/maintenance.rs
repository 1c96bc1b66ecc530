//! Cache directory bookkeeping: path, delete-all and list

use crate::cli::CliError;
use cacheout_cache::{CacheStore, Error, Validity};
use chrono::{DateTime, Local};
use std::io::Write;
use std::time::SystemTime;

fn output_error(e: std::io::Error) -> CliError {
    Error::io_no_path(e, "write output").into()
}

/// Print the cache directory as a single absolute path. Nothing on disk is
/// created or read.
pub fn show_cache_path(store: &CacheStore, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "{}", store.root().display()).map_err(output_error)
}

/// Remove every cached result, keeping the directory itself
pub fn delete_all(store: &CacheStore, out: &mut dyn Write) -> Result<(), CliError> {
    let removed = store.clear()?;
    tracing::info!(removed, root = %store.root().display(), "Deleted cached results");
    writeln!(
        out,
        "Deleted {removed} cached result{} from {}",
        if removed == 1 { "" } else { "s" },
        store.root().display()
    )
    .map_err(output_error)
}

/// One line per cached result: key, size, capture time and freshness
pub fn list_all(
    store: &CacheStore,
    validity: Validity,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let entries = store.entries()?;
    if entries.is_empty() {
        tracing::info!(root = %store.root().display(), "No cached results");
        return Ok(());
    }

    let now = SystemTime::now();
    for entry in entries {
        let captured: DateTime<Local> = entry.modified.into();
        let state = if validity.is_fresh_at(entry.modified, now) {
            "fresh"
        } else {
            "stale"
        };
        writeln!(
            out,
            "{}  {:>10}  {}  {}",
            entry.key,
            entry.size,
            captured.format("%Y-%m-%d %H:%M:%S"),
            state
        )
        .map_err(output_error)?;
    }
    Ok(())
}
