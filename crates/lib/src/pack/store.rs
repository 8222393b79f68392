//! Pack storage on disk.
//!
//! # Storage Layout
//!
//! ```text
//! {pack_dir}/
//! ├── pack.json           # PackManifest
//! └── packs/
//!     └── <slug>.json     # One VariantManifest per variant
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{PACK_MANIFEST_FILE, VARIANT_DIR};

use super::{Pack, PackError, PackManifest, VariantManifest};

/// Errors from reading or writing pack manifests.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("pack manifest file could not be found at {}", path.display())]
  ManifestNotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error(transparent)]
  Pack(#[from] PackError),
}

/// Reads and writes the manifests of one pack directory.
#[derive(Debug, Clone)]
pub struct PackStore {
  root: PathBuf,
}

impl PackStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(PACK_MANIFEST_FILE)
  }

  pub fn variant_dir(&self) -> PathBuf {
    self.root.join(VARIANT_DIR)
  }

  pub fn variant_path(&self, slug: &str) -> PathBuf {
    self.variant_dir().join(format!("{}.json", slug))
  }

  /// Whether a pack manifest exists in this directory.
  pub fn exists(&self) -> bool {
    self.manifest_path().is_file()
  }

  /// Load the pack manifest and every variant it lists.
  pub fn load(&self) -> Result<Pack, StoreError> {
    let manifest_path = self.manifest_path();
    let manifest: PackManifest = match read_json(&manifest_path) {
      Err(StoreError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
        return Err(StoreError::ManifestNotFound { path: manifest_path });
      }
      other => other?,
    };
    manifest.validate()?;

    let variants = manifest
      .variants
      .iter()
      .map(|slug| read_json::<VariantManifest>(&self.variant_path(slug)))
      .collect::<Result<Vec<_>, _>>()?;

    debug!(
      pack = %manifest.slug,
      variants = variants.len(),
      "loaded pack manifests"
    );

    Ok(Pack::from_parts(manifest, variants)?)
  }

  /// Write the pack manifest and every variant manifest.
  pub fn save(&self, pack: &Pack) -> Result<(), StoreError> {
    let variant_dir = self.variant_dir();
    fs::create_dir_all(&variant_dir).map_err(|source| StoreError::CreateDir {
      path: variant_dir.clone(),
      source,
    })?;

    write_json(&self.manifest_path(), pack.manifest())?;
    for variant in pack.variants() {
      write_json(&self.variant_path(&variant.slug), variant)?;
    }

    debug!(pack = %pack.manifest().slug, "saved pack manifests");
    Ok(())
  }

  /// Delete a variant's manifest file. A missing file is not an error.
  pub fn remove_variant_file(&self, slug: &str) -> Result<(), StoreError> {
    let path = self.variant_path(slug);
    match fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(StoreError::Write { path, source }),
    }
  }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
  let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| StoreError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Write pretty JSON atomically (temp file, then rename).
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
  let content = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;
  let temp_path = path.with_extension("json.tmp");

  fs::write(&temp_path, content).map_err(|source| StoreError::Write {
    path: temp_path.clone(),
    source,
  })?;
  fs::rename(&temp_path, path).map_err(|source| StoreError::Write {
    path: path.to_path_buf(),
    source,
  })
}
