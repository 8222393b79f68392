//! Scaffold a new pack directory.
//!
//! Creates `<path>/pack.json`, the `packs/` directory and a `main` variant
//! that is also the pack's main variant.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::consts::{DEFAULT_VARIANT_NAME, DEFAULT_VARIANT_SLUG};
use crate::pack::{Pack, PackConfig, PackError, PackStore, StoreError, VariantConfig};

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to canonicalize path {}: {source}", path.display())]
  Canonicalize { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("invalid pack: {0}")]
  Pack(#[from] PackError),
}

/// Options for initializing a pack directory.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
  /// Directory to create the pack in
  pub path: PathBuf,
  pub name: String,
  pub description: String,
  pub author: String,
  /// Defaults to `1.0.0`
  pub version: Option<String>,
  /// Defaults to the slugified name
  pub slug: Option<String>,
  /// Minecraft versions to build for
  pub targets: Vec<String>,
}

/// Result of a successful initialization.
#[derive(Debug)]
pub struct InitResult {
  /// The pack directory (canonicalized)
  pub pack_dir: PathBuf,
  /// Path to the created pack manifest
  pub manifest: PathBuf,
  /// Path to the created main variant manifest
  pub main_variant: PathBuf,
  pub pack: Pack,
}

/// Initialize a new pack directory.
///
/// # Errors
///
/// Returns an error if:
/// - `pack.json` already exists
/// - Directory creation fails
/// - Writing the manifests fails
pub fn init(options: &InitOptions) -> Result<InitResult, InitError> {
  fs::create_dir_all(&options.path).map_err(|e| InitError::CreateDir {
    path: options.path.clone(),
    source: e,
  })?;

  let pack_dir = dunce::canonicalize(&options.path).map_err(|e| InitError::Canonicalize {
    path: options.path.clone(),
    source: e,
  })?;

  let store = PackStore::new(&pack_dir);
  let manifest = store.manifest_path();
  if manifest.exists() {
    return Err(InitError::PathExists { path: manifest });
  }

  let mut pack = Pack::new(PackConfig {
    name: options.name.clone(),
    slug: options.slug.clone(),
    description: options.description.clone(),
    author: options.author.clone(),
    version: options.version.clone(),
    targets: options.targets.clone(),
    packwiz: None,
  })?;
  pack.add_variant(
    VariantConfig {
      name: DEFAULT_VARIANT_NAME.to_string(),
      slug: Some(DEFAULT_VARIANT_SLUG.to_string()),
      ..Default::default()
    },
    true,
  )?;

  store.save(&pack)?;

  info!(pack = %pack.manifest().slug, path = ?pack_dir, "initialized pack");

  Ok(InitResult {
    main_variant: store.variant_path(DEFAULT_VARIANT_SLUG),
    pack_dir,
    manifest,
    pack,
  })
}
