//! Serve-or-execute protocol for one invocation
//!
//! [`CacheStore::resolve`] either replays a fresh capture or runs the command,
//! copying its stdout to the caller and to a temporary file in the cache
//! directory at the same time. The temporary file only becomes the entry
//! through an atomic rename after the command exited successfully.

use crate::{CacheKey, CacheStore, Error, FanOut, Result, Validity};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::SystemTime;
use tracing::instrument;

/// How an invocation was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A fresh capture was replayed
    Served {
        /// Bytes written to the output
        bytes: u64,
    },
    /// The command ran and its output is now cached
    Recorded {
        /// Bytes captured from the command
        bytes: u64,
    },
}

/// Split a command line into program and arguments on single spaces.
///
/// There is no quoting: consecutive spaces yield empty arguments and an
/// argument can never contain a space.
#[must_use]
pub fn split_command(command: &str) -> (&str, Vec<&str>) {
    let mut parts = command.split(' ');
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

impl CacheStore {
    /// Replay the capture for `key` if it is fresh, otherwise run `command`
    /// and record its stdout.
    ///
    /// Output goes to `out` in both cases. A replay always succeeds regardless
    /// of how the recorded run exited. When the command exits unsuccessfully
    /// its output has already been written to `out`, nothing is cached and
    /// [`Error::CommandFailed`] is returned.
    #[instrument(name = "resolve", skip(self, key, out), fields(key = %key))]
    pub fn resolve(
        &self,
        command: &str,
        key: &CacheKey,
        validity: Validity,
        out: &mut dyn Write,
    ) -> Result<Resolution> {
        let path = self.entry_path(key);

        match File::open(&path) {
            Ok(file) => {
                tracing::debug!(path = %path.display(), "Cache file exists");
                let modified = file
                    .metadata()
                    .and_then(|meta| meta.modified())
                    .map_err(|e| Error::io(e, &path, "stat"))?;
                if validity.is_fresh_at(modified, SystemTime::now()) {
                    tracing::debug!("Cache file is valid");
                    return serve(command, file, out);
                }
                tracing::debug!("Cache file is stale");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No cache file");
            }
            Err(e) => return Err(Error::io(e, &path, "open")),
        }

        self.record(command, key, &path, out)
    }

    fn record(
        &self,
        command: &str,
        key: &CacheKey,
        path: &Path,
        out: &mut dyn Write,
    ) -> Result<Resolution> {
        let (program, args) = split_command(command);
        if program.is_empty() {
            return Err(Error::launch(
                command,
                io::Error::new(io::ErrorKind::InvalidInput, "empty program name"),
            ));
        }

        match fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed the old cache file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(e, path, "remove")),
        }

        self.sweep_captures(key)?;

        let capture = tempfile::Builder::new()
            .prefix(&Self::capture_prefix(key))
            .tempfile_in(self.root())
            .map_err(|e| Error::io(e, self.root(), "create"))?;
        let mut writer = BufWriter::new(capture);

        tracing::debug!(program, ?args, "Running the program");
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::launch(command, e))?;

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::launch(
                command,
                io::Error::other("stdout pipe not available"),
            ));
        };

        let copied = {
            let mut fan = FanOut::new().live(&mut *out).buffered(&mut writer);
            io::copy(&mut stdout, &mut fan)
        };
        drop(stdout);
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::stream(command, e));
            }
        };

        let status = child
            .wait()
            .map_err(|e| Error::io_no_path(e, "wait for command"))?;
        if !status.success() {
            // Dropping the writer deletes the temporary capture
            tracing::warn!(code = ?status.code(), "Command failed; output not cached");
            return Err(Error::command_failed(command, status.code()));
        }

        let capture = writer
            .into_inner()
            .map_err(|e| Error::io(e.into_error(), path, "flush"))?;
        match capture.persist(path) {
            Ok(_) => tracing::debug!(bytes, path = %path.display(), "Cached the results"),
            // A concurrent run of the same command swept our capture
            Err(e) if e.error.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Capture removed by a concurrent run; output not cached");
            }
            Err(e) => return Err(Error::io(e.error, path, "persist")),
        }
        Ok(Resolution::Recorded { bytes })
    }
}

fn serve(command: &str, file: File, out: &mut dyn Write) -> Result<Resolution> {
    let mut reader = BufReader::new(file);
    let bytes = io::copy(&mut reader, out).map_err(|e| Error::stream(command, e))?;
    out.flush().map_err(|e| Error::stream(command, e))?;
    Ok(Resolution::Served { bytes })
}
