//! Pack and variant model.
//!
//! A [`Pack`] owns the pack manifest and every variant manifest. All mutations
//! (adding variants, editing resources, picking the main variant) go through
//! here so the invariants hold before anything is written back to disk:
//! - variant slugs are unique within the pack
//! - slugs and targets are single, non-empty path components, since each
//!   `(target, variant)` pair gets its own `bin/<target>/<variant>` directory
//! - resource names are unique within a variant's own list
//! - `main`, when set, names an existing variant

pub mod store;
mod types;

use thiserror::Error;
use tracing::debug;

pub use store::{PackStore, StoreError};
pub use types::*;

/// Errors raised by pack and variant mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
  #[error("can't add duplicate variant '{0}'")]
  DuplicateVariant(String),

  #[error("no variant called '{0}' in pack")]
  UnknownVariant(String),

  #[error("can't add duplicate resource '{name}' to variant '{variant}'")]
  DuplicateResource { variant: String, name: String },

  #[error("no resource called '{name}' in variant '{variant}'")]
  UnknownResource { variant: String, name: String },

  #[error("can't remove variant '{variant}', it is inherited by {}", dependents.join(", "))]
  InheritedVariant { variant: String, dependents: Vec<String> },

  #[error("invalid slug '{0}': must be a non-empty file name other than '.' or '..'")]
  InvalidSlug(String),

  #[error("invalid target '{0}': must be a non-empty file name other than '.' or '..'")]
  InvalidTarget(String),

  #[error("invalid manifest: {0}")]
  InvalidManifest(String),
}

fn is_path_component(value: &str) -> bool {
  !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\', '\0'])
}

/// Check that a pack or variant slug can name its own directory.
pub fn validate_slug(slug: &str) -> Result<(), PackError> {
  if is_path_component(slug) {
    Ok(())
  } else {
    Err(PackError::InvalidSlug(slug.to_string()))
  }
}

/// Check that a target can name its own directory under `bin/`.
pub fn validate_target(target: &str) -> Result<(), PackError> {
  if is_path_component(target) {
    Ok(())
  } else {
    Err(PackError::InvalidTarget(target.to_string()))
  }
}

impl PackManifest {
  /// Check the invariants a loaded manifest must hold before any variant file
  /// is read from `packs/`.
  pub fn validate(&self) -> Result<(), PackError> {
    validate_slug(&self.slug)?;

    for (i, target) in self.targets.iter().enumerate() {
      validate_target(target)?;
      if self.targets[..i].contains(target) {
        return Err(PackError::InvalidManifest(format!("target '{}' is listed twice", target)));
      }
    }

    for (i, slug) in self.variants.iter().enumerate() {
      validate_slug(slug)?;
      if self.variants[..i].contains(slug) {
        return Err(PackError::InvalidManifest(format!("variant '{}' is listed twice", slug)));
      }
    }

    if let Some(main) = self.main.as_ref().filter(|m| !self.variants.contains(m)) {
      return Err(PackError::InvalidManifest(format!(
        "main variant '{}' is not in the pack",
        main
      )));
    }

    Ok(())
  }
}

/// Options for creating a new pack.
#[derive(Debug, Clone, Default)]
pub struct PackConfig {
  pub name: String,
  /// Derived from `name` when absent.
  pub slug: Option<String>,
  pub description: String,
  pub author: String,
  /// Defaults to [`DEFAULT_PACK_VERSION`].
  pub version: Option<String>,
  pub targets: Vec<String>,
  pub packwiz: Option<String>,
}

/// Options for creating a new variant.
#[derive(Debug, Clone, Default)]
pub struct VariantConfig {
  pub name: String,
  /// Derived from `name` when absent.
  pub slug: Option<String>,
  pub inherits: Option<String>,
  pub resources: Vec<Resource>,
}

impl VariantManifest {
  /// Build a variant manifest, slugifying the slug (or name).
  ///
  /// Fails if nothing usable is left after slugifying.
  pub fn new(config: VariantConfig) -> Result<Self, PackError> {
    let slug = slugify(config.slug.as_deref().unwrap_or(&config.name));
    validate_slug(&slug)?;
    Ok(Self {
      name: config.name,
      slug,
      inherits: config.inherits,
      resources: config.resources,
    })
  }

  /// Append a resource to this variant's own list.
  pub fn add_resource(&mut self, resource: Resource) -> Result<&Resource, PackError> {
    if self.get_resource(resource.name()).is_some() {
      return Err(PackError::DuplicateResource {
        variant: self.slug.clone(),
        name: resource.name().to_string(),
      });
    }

    debug!(variant = %self.slug, resource = %resource.name(), "adding resource");
    self.resources.push(resource);
    Ok(&self.resources[self.resources.len() - 1])
  }

  /// Remove a resource by name, keeping the order of the rest.
  pub fn remove_resource(&mut self, name: &str) -> Result<Resource, PackError> {
    let index = self
      .resources
      .iter()
      .position(|r| r.name() == name)
      .ok_or_else(|| PackError::UnknownResource {
        variant: self.slug.clone(),
        name: name.to_string(),
      })?;

    debug!(variant = %self.slug, resource = %name, "removing resource");
    Ok(self.resources.remove(index))
  }

  pub fn get_resource(&self, name: &str) -> Option<&Resource> {
    self.resources.iter().find(|r| r.name() == name)
  }
}

/// A pack with all of its variants loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
  manifest: PackManifest,
  /// Kept in the same order as `manifest.variants`.
  variants: Vec<VariantManifest>,
}

impl Pack {
  /// Create an empty pack. Duplicate targets are dropped.
  pub fn new(config: PackConfig) -> Result<Self, PackError> {
    let slug = slugify(config.slug.as_deref().unwrap_or(&config.name));
    validate_slug(&slug)?;
    let mut targets: Vec<String> = Vec::with_capacity(config.targets.len());
    for target in config.targets {
      validate_target(&target)?;
      if !targets.contains(&target) {
        targets.push(target);
      }
    }

    Ok(Self {
      manifest: PackManifest {
        name: config.name,
        slug,
        description: config.description,
        author: config.author,
        version: config.version.unwrap_or_else(|| DEFAULT_PACK_VERSION.to_string()),
        targets,
        main: None,
        variants: Vec::new(),
        packwiz: config.packwiz,
      },
      variants: Vec::new(),
    })
  }

  /// Rebuild a pack from persisted manifests.
  ///
  /// Every slug listed in the pack manifest must have exactly one variant
  /// manifest, and no variant may be missing from the list.
  pub fn from_parts(manifest: PackManifest, variants: Vec<VariantManifest>) -> Result<Self, PackError> {
    manifest.validate()?;
    if variants.len() != manifest.variants.len() {
      return Err(PackError::InvalidManifest(format!(
        "pack lists {} variant(s) but {} were loaded",
        manifest.variants.len(),
        variants.len()
      )));
    }

    let mut ordered = Vec::with_capacity(variants.len());
    let mut remaining = variants;
    for slug in &manifest.variants {
      let index = remaining
        .iter()
        .position(|v| &v.slug == slug)
        .ok_or_else(|| PackError::InvalidManifest(format!("variant '{}' has no manifest", slug)))?;
      ordered.push(remaining.swap_remove(index));
    }

    Ok(Self {
      manifest,
      variants: ordered,
    })
  }

  pub fn manifest(&self) -> &PackManifest {
    &self.manifest
  }

  pub fn variants(&self) -> &[VariantManifest] {
    &self.variants
  }

  /// Add a new variant, optionally making it the main variant.
  pub fn add_variant(&mut self, config: VariantConfig, set_as_main: bool) -> Result<&VariantManifest, PackError> {
    let variant = VariantManifest::new(config)?;

    if self.has_variant(&variant.slug) {
      return Err(PackError::DuplicateVariant(variant.slug));
    }
    if let Some(parent) = variant.inherits.as_deref().filter(|p| !self.has_variant(p)) {
      return Err(PackError::UnknownVariant(parent.to_string()));
    }

    debug!(pack = %self.manifest.slug, variant = %variant.slug, "adding variant");
    let slug = variant.slug.clone();
    self.manifest.variants.push(slug.clone());
    self.variants.push(variant);

    if set_as_main {
      self.set_main_variant(Some(&slug))?;
    }

    Ok(&self.variants[self.variants.len() - 1])
  }

  pub fn has_variant(&self, slug: &str) -> bool {
    self.manifest.variants.iter().any(|s| s == slug)
  }

  pub fn get_variant(&self, slug: &str) -> Option<&VariantManifest> {
    self.variants.iter().find(|v| v.slug == slug)
  }

  pub fn get_variant_mut(&mut self, slug: &str) -> Option<&mut VariantManifest> {
    self.variants.iter_mut().find(|v| v.slug == slug)
  }

  /// Look up a variant, failing with [`PackError::UnknownVariant`].
  pub fn variant_mut(&mut self, slug: &str) -> Result<&mut VariantManifest, PackError> {
    self
      .get_variant_mut(slug)
      .ok_or_else(|| PackError::UnknownVariant(slug.to_string()))
  }

  /// Remove a variant. Clears `main` if it pointed at the removed variant.
  ///
  /// Fails if another variant inherits from it.
  pub fn remove_variant(&mut self, slug: &str) -> Result<VariantManifest, PackError> {
    let index = self
      .variants
      .iter()
      .position(|v| v.slug == slug)
      .ok_or_else(|| PackError::UnknownVariant(slug.to_string()))?;

    let dependents: Vec<String> = self
      .variants
      .iter()
      .filter(|v| v.inherits.as_deref() == Some(slug))
      .map(|v| v.slug.clone())
      .collect();
    if !dependents.is_empty() {
      return Err(PackError::InheritedVariant {
        variant: slug.to_string(),
        dependents,
      });
    }

    debug!(pack = %self.manifest.slug, variant = %slug, "removing variant");
    self.manifest.variants.retain(|s| s != slug);
    if self.manifest.main.as_deref() == Some(slug) {
      self.manifest.main = None;
    }

    Ok(self.variants.remove(index))
  }

  /// Change a variant's display name. The slug stays the same.
  pub fn rename_variant(&mut self, slug: &str, name: impl Into<String>) -> Result<(), PackError> {
    self.variant_mut(slug)?.name = name.into();
    Ok(())
  }

  /// Set (or clear) the main variant.
  pub fn set_main_variant(&mut self, slug: Option<&str>) -> Result<(), PackError> {
    match slug {
      Some(slug) if !self.has_variant(slug) => Err(PackError::UnknownVariant(slug.to_string())),
      _ => {
        self.manifest.main = slug.map(str::to_string);
        Ok(())
      }
    }
  }

  /// Add a build target. Returns `false` if it was already present.
  pub fn add_target(&mut self, target: impl Into<String>) -> Result<bool, PackError> {
    let target = target.into();
    validate_target(&target)?;
    if self.manifest.targets.contains(&target) {
      return Ok(false);
    }
    self.manifest.targets.push(target);
    Ok(true)
  }

  /// Remove a build target. Returns `false` if it was not present.
  pub fn remove_target(&mut self, target: &str) -> bool {
    let before = self.manifest.targets.len();
    self.manifest.targets.retain(|t| t != target);
    before != self.manifest.targets.len()
  }

  pub fn has_target(&self, target: &str) -> bool {
    self.manifest.targets.iter().any(|t| t == target)
  }

  pub fn set_packwiz(&mut self, packwiz: Option<String>) {
    self.manifest.packwiz = packwiz;
  }
}
