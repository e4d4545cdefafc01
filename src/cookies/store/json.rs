//! JSON-backed cookie store.
//!
//! `JsonCookieStore` keeps its records in memory and rewrites one JSON file
//! after every [`set`](CookieStore::set). Write failures are logged and do not
//! roll back the in-memory view, so the store keeps working for the life of
//! the process even when the disk does not.
//!
//! The whole file is rewritten on each write; use the SQLite store for large
//! jars.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::cookies::store::{apply_payload, CookieEntry, CookiePayload, CookieStore};
use crate::errors::CookieError;

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieStoreFile {
    cookies: Vec<CookieEntry>,
}

#[derive(Debug)]
pub struct JsonCookieStore {
    path: PathBuf,
    entries: RwLock<Vec<CookieEntry>>,
}

impl JsonCookieStore {
    /// Opens the store at `path`, creating an empty file when none exists.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, CookieError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => {
                let file: CookieStoreFile = serde_json::from_str(&raw)
                    .map_err(|e| CookieError::Store(format!("{}: {e}", path.display())))?;
                file.cookies
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                write_file(&path, &[]).map_err(|e| CookieError::Store(format!("{}: {e}", path.display())))?;
                Vec::new()
            }
            Err(e) => return Err(CookieError::Store(format!("{}: {e}", path.display()))),
        };

        log::debug!("opened json cookie store {} with {} cookie(s)", path.display(), entries.len());
        Ok(Arc::new(Self {
            path,
            entries: RwLock::new(entries),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_file(path: &Path, cookies: &[CookieEntry]) -> io::Result<()> {
    let file = CookieStoreFile {
        cookies: cookies.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(io::Error::other)?;
    fs::write(path, json)
}

impl CookieStore for JsonCookieStore {
    fn get_all(&self) -> Vec<CookieEntry> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, payload: CookiePayload) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        apply_payload(&mut entries, &payload);
        if let Err(e) = write_file(&self.path, &entries) {
            log::warn!("failed to persist cookie store {}: {e}", self.path.display());
        }
    }
}
