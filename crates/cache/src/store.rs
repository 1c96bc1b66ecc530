//! Cache directory location and bookkeeping

use crate::{CacheKey, Error, Result};
use dirs::cache_dir;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "CACHEOUT_CACHE_DIR";

/// Subfolder of the platform cache directory holding the entries
pub const CACHE_SUBDIR: &str = "cacheout";

/// A recorded capture found in the cache directory
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cache key (file name)
    pub key: CacheKey,
    /// Path to the entry file
    pub path: PathBuf,
    /// Size of the capture in bytes
    pub size: u64,
    /// Capture time
    pub modified: SystemTime,
}

/// Inputs for determining the cache directory
#[derive(Debug, Clone)]
struct CacheInputs {
    explicit: Option<PathBuf>,
    os_cache_dir: Option<PathBuf>,
    current_dir: Option<PathBuf>,
}

fn cache_root_from_inputs(inputs: CacheInputs) -> Result<PathBuf> {
    // Resolution order:
    // 1) explicit override (--cache-dir / CACHEOUT_CACHE_DIR)
    // 2) OS cache dir/cacheout
    let root = if let Some(dir) = inputs.explicit.filter(|p| !p.as_os_str().is_empty()) {
        dir
    } else if let Some(os_cache) = inputs.os_cache_dir {
        os_cache.join(CACHE_SUBDIR)
    } else {
        return Err(Error::configuration(
            "Can't find the user cache directory",
        ));
    };

    if root.is_absolute() {
        return Ok(root);
    }
    let cwd = inputs.current_dir.ok_or_else(|| {
        Error::configuration(format!(
            "Cache directory {} is relative and the current directory is unknown",
            root.display()
        ))
    })?;
    Ok(cwd.join(root))
}

/// The directory holding all cache entries
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Resolve the cache directory without touching the filesystem.
    ///
    /// `explicit` takes precedence over the platform's per-user cache
    /// directory. Relative paths are anchored at the current directory.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        let inputs = CacheInputs {
            explicit,
            os_cache_dir: cache_dir(),
            current_dir: std::env::current_dir().ok(),
        };
        cache_root_from_inputs(inputs).map(Self::at)
    }

    /// Use `root` as the cache directory as is
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache directory if it does not exist yet
    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::io(e, &self.root, "create_dir_all"))
    }

    /// Path of the entry for `key`
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// File name prefix of in-progress captures for `key`.
    ///
    /// Starts with a dot so that it never parses as a key.
    #[must_use]
    pub fn capture_prefix(key: &CacheKey) -> String {
        format!(".{key}.")
    }

    /// Remove captures for `key` left behind by interrupted runs.
    ///
    /// Returns how many files were removed.
    pub fn sweep_captures(&self, key: &CacheKey) -> Result<usize> {
        let prefix = Self::capture_prefix(key);
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::io(e, &self.root, "read_dir")),
        };

        let mut removed = 0;
        for item in dir {
            let item = item.map_err(|e| Error::io(e, &self.root, "read_dir"))?;
            if !item.file_name().to_str().is_some_and(|n| n.starts_with(&prefix)) {
                continue;
            }
            let path = item.path();
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(e, &path, "remove")),
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "Removed leftover captures");
        }
        Ok(removed)
    }

    /// All entries in the cache directory, sorted by key.
    ///
    /// Files that are not named like a key (temporary captures, foreign files)
    /// are skipped. A missing directory has no entries.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(e, &self.root, "read_dir")),
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item.map_err(|e| Error::io(e, &self.root, "read_dir"))?;
            let Some(key) = item.file_name().to_str().and_then(CacheKey::from_file_name) else {
                continue;
            };
            let path = item.path();
            let meta = item.metadata().map_err(|e| Error::io(e, &path, "stat"))?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().map_err(|e| Error::io(e, &path, "stat"))?;
            entries.push(CacheEntry {
                key,
                path,
                size: meta.len(),
                modified,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Remove everything inside the cache directory, keeping the directory.
    ///
    /// Returns how many items were removed.
    pub fn clear(&self) -> Result<usize> {
        tracing::debug!(root = %self.root.display(), "Deleting all cached results");
        self.ensure_exists()?;

        let mut removed = 0;
        let dir = fs::read_dir(&self.root).map_err(|e| Error::io(e, &self.root, "read_dir"))?;
        for item in dir {
            let item = item.map_err(|e| Error::io(e, &self.root, "read_dir"))?;
            let path = item.path();
            let file_type = item
                .file_type()
                .map_err(|e| Error::io(e, &path, "stat"))?;
            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(e, &path, "remove")),
            }
        }
        Ok(removed)
    }
}
