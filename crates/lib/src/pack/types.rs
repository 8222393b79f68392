//! Manifest types for packs, variants and resources.
//!
//! These types are the on-disk JSON format; field names must round-trip
//! exactly.
//!
//! - [`PackManifest`] - `pack.json`, the pack-level metadata
//! - [`VariantManifest`] - `packs/<slug>.json`, one per variant
//! - [`Resource`] - a single mod, resource pack, shader or config reference

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default version for newly created packs.
pub const DEFAULT_PACK_VERSION: &str = "1.0.0";

/// The pack manifest (`pack.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
  /// Display name of the pack.
  pub name: String,
  /// Filesystem-safe identifier, derived from the name unless given.
  pub slug: String,
  pub description: String,
  pub author: String,
  /// Semver-compatible version string.
  pub version: String,
  /// Game versions to build for, in order.
  pub targets: Vec<String>,
  /// The primary variant, used for display naming.
  pub main: Option<String>,
  /// Slugs of every variant in this pack.
  pub variants: Vec<String>,
  /// Path to the packwiz executable used for this pack.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub packwiz: Option<String>,
}

/// A variant manifest (`packs/<slug>.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantManifest {
  pub name: String,
  /// Unique within the pack.
  pub slug: String,
  /// Slug of the variant this one inherits resources from.
  pub inherits: Option<String>,
  /// Own resources, in insertion order.
  pub resources: Vec<Resource>,
}

/// The category of a resource.
///
/// Unknown values are kept as [`ResourceType::Other`] so a hand-edited
/// manifest still loads; command generation rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
  Mod,
  ResourcePack,
  Shader,
  Config,
  Other(String),
}

impl ResourceType {
  pub fn as_str(&self) -> &str {
    match self {
      ResourceType::Mod => "mod",
      ResourceType::ResourcePack => "resourcepack",
      ResourceType::Shader => "shader",
      ResourceType::Config => "config",
      ResourceType::Other(other) => other,
    }
  }
}

impl From<String> for ResourceType {
  fn from(value: String) -> Self {
    match value.as_str() {
      "mod" => ResourceType::Mod,
      "resourcepack" => ResourceType::ResourcePack,
      "shader" => ResourceType::Shader,
      "config" => ResourceType::Config,
      _ => ResourceType::Other(value),
    }
  }
}

impl From<ResourceType> for String {
  fn from(value: ResourceType) -> Self {
    value.as_str().to_string()
  }
}

impl FromStr for ResourceType {
  type Err = String;

  /// Strict parse used for user input: only the four known types are accepted.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match ResourceType::from(s.trim().to_lowercase()) {
      ResourceType::Other(other) => Err(format!(
        "unknown resource type '{}' (expected mod, resourcepack, shader or config)",
        other
      )),
      known => Ok(known),
    }
  }
}

impl fmt::Display for ResourceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A resource hosted on a distribution platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionResource {
  #[serde(rename = "type")]
  pub kind: ResourceType,
  pub name: String,
  /// Project identifier on the platform.
  pub id: String,
}

/// A resource downloaded from a plain URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlResource {
  #[serde(rename = "type")]
  pub kind: ResourceType,
  pub name: String,
  pub url: String,
}

/// A pack resource, tagged by its `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Resource {
  Modrinth(DistributionResource),
  Curseforge(DistributionResource),
  Url(UrlResource),
}

/// Identity of a resource across inheritance levels.
///
/// Two distribution resources are the same if their ids match, regardless of
/// platform; URL resources compare by URL. A URL never equals a distribution
/// resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey<'a> {
  Distribution(&'a str),
  Url(&'a str),
}

impl Resource {
  /// Create a Modrinth resource.
  pub fn modrinth(name: impl Into<String>, id: impl Into<String>, kind: ResourceType) -> Self {
    Resource::Modrinth(DistributionResource {
      kind,
      name: name.into(),
      id: id.into(),
    })
  }

  /// Create a CurseForge resource.
  pub fn curseforge(name: impl Into<String>, id: impl Into<String>, kind: ResourceType) -> Self {
    Resource::Curseforge(DistributionResource {
      kind,
      name: name.into(),
      id: id.into(),
    })
  }

  /// Create a URL resource.
  pub fn url(name: impl Into<String>, url: impl Into<String>, kind: ResourceType) -> Self {
    Resource::Url(UrlResource {
      kind,
      name: name.into(),
      url: url.into(),
    })
  }

  pub fn name(&self) -> &str {
    match self {
      Resource::Modrinth(r) | Resource::Curseforge(r) => &r.name,
      Resource::Url(r) => &r.name,
    }
  }

  pub fn kind(&self) -> &ResourceType {
    match self {
      Resource::Modrinth(r) | Resource::Curseforge(r) => &r.kind,
      Resource::Url(r) => &r.kind,
    }
  }

  /// The `source` tag as written in the manifest.
  pub fn source(&self) -> &'static str {
    match self {
      Resource::Modrinth(_) => "modrinth",
      Resource::Curseforge(_) => "curseforge",
      Resource::Url(_) => "url",
    }
  }

  pub fn key(&self) -> ResourceKey<'_> {
    match self {
      Resource::Modrinth(r) | Resource::Curseforge(r) => ResourceKey::Distribution(&r.id),
      Resource::Url(r) => ResourceKey::Url(&r.url),
    }
  }
}

/// Convert a string into a slug usable as a file name.
///
/// Trims, lowercases and strips characters that are unsafe in paths.
pub fn slugify(value: &str) -> String {
  value
    .trim()
    .to_lowercase()
    .chars()
    .filter(|c| !matches!(c, ' ' | '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | '\0'))
    .collect()
}
