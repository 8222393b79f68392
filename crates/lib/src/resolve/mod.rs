//! Variant inheritance resolution.
//!
//! A variant may name another variant in `inherits`. Its effective resource
//! list is computed depth-first, base case first:
//!
//! 1. A variant without a parent resolves to its own resources.
//! 2. Otherwise the parent is resolved, and every parent entry whose
//!    [`ResourceKey`] also appears in the child's own list is dropped.
//! 3. The result is `filtered_parent ++ own_resources`.
//!
//! The order matters downstream: packwiz processes `add` commands in sequence,
//! so resources appended later win.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, trace};

use crate::pack::{Resource, ResourceKey, VariantManifest};

/// Errors that can occur while flattening a variant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
  /// The requested variant, or one named in an `inherits` field, does not exist.
  #[error("can't get non-existent variant '{slug}'")]
  UnknownVariant { slug: String },

  /// The inheritance chain loops back on itself.
  #[error("circular inheritance detected: {chain}")]
  CircularInheritance { chain: String },
}

/// Resolves variants against one pack's variant set.
///
/// Results are memoized for the lifetime of the resolver, so a parent shared
/// by several children is flattened once.
#[derive(Debug)]
pub struct InheritanceResolver<'a> {
  variants: HashMap<&'a str, &'a VariantManifest>,
  memo: HashMap<String, Vec<Resource>>,
}

impl<'a> InheritanceResolver<'a> {
  pub fn new(variants: &'a [VariantManifest]) -> Self {
    Self {
      variants: variants.iter().map(|v| (v.slug.as_str(), v)).collect(),
      memo: HashMap::new(),
    }
  }

  /// Compute the effective resource list of a variant.
  pub fn resolve(&mut self, slug: &str) -> Result<Vec<Resource>, ResolveError> {
    let mut visiting = Vec::new();
    self.resolve_inner(slug, &mut visiting)
  }

  /// Resolve a variant into a new manifest carrying the flattened resources.
  ///
  /// The input manifests are left untouched.
  pub fn resolve_variant(&mut self, slug: &str) -> Result<VariantManifest, ResolveError> {
    let resources = self.resolve(slug)?;
    let variant = self.lookup(slug)?;
    Ok(VariantManifest {
      name: variant.name.clone(),
      slug: variant.slug.clone(),
      inherits: variant.inherits.clone(),
      resources,
    })
  }

  fn lookup(&self, slug: &str) -> Result<&'a VariantManifest, ResolveError> {
    self
      .variants
      .get(slug)
      .copied()
      .ok_or_else(|| ResolveError::UnknownVariant { slug: slug.to_string() })
  }

  fn resolve_inner(&mut self, slug: &str, visiting: &mut Vec<String>) -> Result<Vec<Resource>, ResolveError> {
    if let Some(resolved) = self.memo.get(slug) {
      trace!(variant = %slug, "using memoized resolution");
      return Ok(resolved.clone());
    }

    if let Some(start) = visiting.iter().position(|s| s == slug) {
      let mut chain: Vec<&str> = visiting[start..].iter().map(String::as_str).collect();
      chain.push(slug);
      return Err(ResolveError::CircularInheritance {
        chain: chain.join(" -> "),
      });
    }

    let variant = self.lookup(slug)?;

    let resolved = match &variant.inherits {
      None => variant.resources.clone(),
      Some(parent) => {
        visiting.push(slug.to_string());
        let inherited = self.resolve_inner(parent, visiting)?;
        visiting.pop();

        let own: HashSet<ResourceKey<'_>> = variant.resources.iter().map(Resource::key).collect();
        let before = inherited.len();
        let mut merged: Vec<Resource> = inherited.into_iter().filter(|r| !own.contains(&r.key())).collect();
        let overridden = before - merged.len();
        merged.extend(variant.resources.iter().cloned());

        debug!(
          variant = %slug,
          parent = %parent,
          overridden,
          total = merged.len(),
          "resolved inherited resources"
        );
        merged
      }
    };

    self.memo.insert(slug.to_string(), resolved.clone());
    Ok(resolved)
  }
}

/// Compute the effective resource list of `slug` within `variants`.
pub fn resolve(slug: &str, variants: &[VariantManifest]) -> Result<Vec<Resource>, ResolveError> {
  InheritanceResolver::new(variants).resolve(slug)
}

/// Resolve `slug` within `variants` into a flattened manifest.
pub fn resolve_variant(slug: &str, variants: &[VariantManifest]) -> Result<VariantManifest, ResolveError> {
  InheritanceResolver::new(variants).resolve_variant(slug)
}
