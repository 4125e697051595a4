//! Process-wide table cache.
//!
//! Each source file is parsed once per process. Entries are never
//! invalidated; a failed load leaves no entry behind.

use super::loader::{LoaderError, TableKind};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<TableCache> = OnceLock::new();

/// Loaded tables keyed by table kind and canonical source path.
#[derive(Default)]
pub struct TableCache {
    tables: Mutex<HashMap<(TableKind, PathBuf), DataFrame>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by [`DataLoader`](super::DataLoader).
    pub fn global() -> &'static TableCache {
        GLOBAL.get_or_init(TableCache::new)
    }

    /// Return the cached table for `path`, loading it with `load` on first use.
    pub fn get_or_load<F>(&self, kind: TableKind, path: &Path, load: F) -> Result<DataFrame, LoaderError>
    where
        F: FnOnce(&Path) -> Result<DataFrame, LoaderError>,
    {
        let key_path = path
            .canonicalize()
            .map_err(|_| LoaderError::NotFound(path.to_path_buf()))?;
        let key = (kind, key_path);

        // Held across the load so two callers never parse the same file twice.
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(df) = tables.get(&key) {
            debug!(path = %key.1.display(), %kind, "table cache hit");
            return Ok(df.clone());
        }

        let df = load(&key.1)?;
        tables.insert(key, df.clone());
        Ok(df)
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::cell::Cell;
    use tempfile::NamedTempFile;

    fn tiny_frame() -> DataFrame {
        DataFrame::new(vec![Column::new("State".into(), vec!["CA"])]).unwrap()
    }

    #[test]
    fn test_second_load_is_served_from_cache() {
        let file = NamedTempFile::new().unwrap();
        let cache = TableCache::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let df = cache
                .get_or_load(TableKind::State, file.path(), |_| {
                    calls.set(calls.get() + 1);
                    Ok(tiny_frame())
                })
                .unwrap();
            assert_eq!(df.height(), 1);
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_kinds_are_cached_separately() {
        let file = NamedTempFile::new().unwrap();
        let cache = TableCache::new();
        cache
            .get_or_load(TableKind::State, file.path(), |_| Ok(tiny_frame()))
            .unwrap();
        cache
            .get_or_load(TableKind::Hospital, file.path(), |_| Ok(tiny_frame()))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let file = NamedTempFile::new().unwrap();
        let cache = TableCache::new();
        let result = cache.get_or_load(TableKind::Hospital, file.path(), |p| {
            Err(LoaderError::NotFound(p.to_path_buf()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let cache = TableCache::new();
        let result = cache.get_or_load(TableKind::Hospital, Path::new("/nope/missing.csv"), |_| {
            Ok(tiny_frame())
        });
        assert!(matches!(result, Err(LoaderError::NotFound(_))));
    }
}
