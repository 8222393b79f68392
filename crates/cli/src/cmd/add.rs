//! `crystal add` and `crystal remove`: edit a variant's own resources.

use anyhow::{Context, Result};

use crystal_lib::pack::{Pack, Resource, ResourceType};
use crystal_lib::resolve::{InheritanceResolver, ResolveError};

use super::{Globals, variant_or_main};
use crate::output::{print_info, print_success, print_warning};

/// A resource as given on the command line.
pub enum NewResource {
  Url { name: String, url: String },
  Modrinth { name: Option<String>, id: String },
  Curseforge { name: Option<String>, id: String },
}

impl NewResource {
  fn into_resource(self, kind: ResourceType) -> Resource {
    match self {
      NewResource::Url { name, url } => Resource::url(name, url, kind),
      NewResource::Modrinth { name, id } => Resource::modrinth(name.unwrap_or_else(|| id.clone()), id, kind),
      NewResource::Curseforge { name, id } => Resource::curseforge(name.unwrap_or_else(|| id.clone()), id, kind),
    }
  }
}

pub fn cmd_add(globals: &Globals, new: NewResource, kind: ResourceType, variant: Option<&str>) -> Result<()> {
  let (store, mut pack) = globals.load()?;
  let slug = variant_or_main(&pack, variant)?;
  let resource = new.into_resource(kind);

  let overridden = match inherited_match(&pack, &slug, &resource) {
    Ok(name) => name,
    Err(e) => {
      print_warning(&format!("Could not check inherited resources: {}", e));
      None
    }
  };

  pack
    .variant_mut(&slug)?
    .add_resource(resource.clone())
    .context("Failed to add resource")?;
  store.save(&pack)?;

  print_success(&format!(
    "Added {} '{}' ({}) to variant '{}'",
    resource.kind(),
    resource.name(),
    resource.source(),
    slug
  ));
  if let Some(name) = overridden {
    print_info(&format!("Overrides inherited resource '{}'", name));
  }

  Ok(())
}

pub fn cmd_remove(globals: &Globals, name: &str, variant: Option<&str>) -> Result<()> {
  let (store, mut pack) = globals.load()?;
  let slug = variant_or_main(&pack, variant)?;

  let removed = pack
    .variant_mut(&slug)?
    .remove_resource(name)
    .context("Failed to remove resource")?;
  store.save(&pack)?;

  print_success(&format!("Removed '{}' from variant '{}'", removed.name(), slug));
  Ok(())
}

/// Name of the inherited resource that `resource` would override in `slug`.
fn inherited_match(pack: &Pack, slug: &str, resource: &Resource) -> Result<Option<String>, ResolveError> {
  let Some(parent) = pack.get_variant(slug).and_then(|v| v.inherits.as_deref()) else {
    return Ok(None);
  };

  let inherited = InheritanceResolver::new(pack.variants()).resolve(parent)?;

  Ok(
    inherited
      .iter()
      .find(|r| r.key() == resource.key())
      .map(|r| r.name().to_string()),
  )
}
