use anyhow::{Context, Result};
use log::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::model::UserStore;

/// The one slot the user store lives under.
pub const USER_DATA_KEY: &str = "userData";

/// Durable key-value slots holding opaque blobs.
pub trait BlobStore {
    /// `Ok(None)` when nothing has been written under `key` yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Replaces the whole value. Readers see the old or the new blob, never a mix.
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileBlobStore { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

fn read_if_found(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into())
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        read_if_found(&path)
            .with_context(|| format!("Error reading {:?}", path))
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Error ensuring path {:?} exists", self.dir))?;
        let tmp = self.temp_path_for(key);
        let mut file = File::create(&tmp)
            .with_context(|| format!("Error creating {:?}", tmp))?;
        file.write_all(value)?;
        file.sync_all()?;
        drop(file);
        let path = self.path_for(key);
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Error moving {:?} into place", path))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.slots.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

/// Moves the user store in and out of its blob slot.
#[derive(Debug)]
pub struct Persistence<B> {
    blobs: B,
}

impl<B: BlobStore> Persistence<B> {
    pub fn new(blobs: B) -> Self {
        Persistence { blobs }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Never fails: missing or unreadable data means no accounts yet.
    pub fn load(&self) -> UserStore {
        match self.try_load() {
            Ok(Some(store)) => {
                info!("Loaded {} account(s)", store.accounts.len());
                store.sanitize()
            },
            Ok(None) => {
                debug!("No saved user data, starting empty");
                UserStore::default()
            },
            Err(e) => {
                warn!("Discarding unreadable user data: {:#}", e);
                UserStore::default()
            },
        }
    }

    fn try_load(&self) -> Result<Option<UserStore>> {
        self.blobs.read(USER_DATA_KEY)?.map(|bytes|
            serde_json::from_slice::<UserStore>(&bytes)
                .with_context(|| "Error de-serialising user data")
        ).transpose()
    }

    pub fn save(&mut self, store: &UserStore) -> Result<()> {
        let bytes = serde_json::to_vec(store)
            .with_context(|| "Error serialising user data")?;
        self.blobs.write(USER_DATA_KEY, &bytes)?;
        debug!("Saved {} account(s)", store.accounts.len());
        Ok(())
    }
}
