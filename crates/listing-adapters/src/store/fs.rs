//! Object store sobre un directorio local.
//!
//! Las keys se mapean a rutas relativas a `root`. `put` escribe a un archivo
//! temporal oculto y luego hace `rename`, así un lector nunca ve un objeto a
//! medio escribir. Los temporales (nombres que empiezan con `.`) no aparecen
//! en `list` ni en `exists`.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use listing_core::adapter::{ObjectStore, StoreError};
use log::debug;

use super::validate_key;

static PUT_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Crea el directorio raíz si no existe.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        if key.split('/').any(|seg| seg.starts_with('.')) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
    }

    fn collect(&self, dir: &Path, rel: &str, out: &mut BTreeSet<String>, prefix: &str) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let key = if rel.is_empty() { name } else { format!("{rel}/{name}") };
            if entry.file_type()?.is_dir() {
                self.collect(&entry.path(), &key, out, prefix)?;
            } else if key.starts_with(prefix) {
                out.insert(key);
            }
        }
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn not_found(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(key.to_string())
        } else {
            StoreError::Io(e)
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        ensure_parent(&path)?;
        let file_name = path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        let tmp = path.with_file_name(format!(".{file_name}.{}.{}.partial",
                                             std::process::id(),
                                             PUT_SEQ.fetch_add(1, Ordering::Relaxed)));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!("fs store: put {key} ({} bytes)", bytes.len());
        Ok(())
    }

    fn move_object(&self, source: &str, dest: &str) -> Result<(), StoreError> {
        let from = self.path_for(source)?;
        let to = self.path_for(dest)?;
        if !from.is_file() {
            return Err(StoreError::NotFound(source.to_string()));
        }
        ensure_parent(&to)?;
        fs::rename(&from, &to).map_err(not_found(source))?;
        debug!("fs store: moved {source} -> {dest}");
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn list(&self, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        let mut out = BTreeSet::new();
        self.collect(&self.root, "", &mut out, prefix)?;
        Ok(out)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(not_found(key))
    }
}
