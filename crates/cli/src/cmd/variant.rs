//! `crystal variant` subcommands.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use crystal_lib::pack::VariantConfig;
use crystal_lib::resolve::InheritanceResolver;

use super::Globals;
use crate::output::{OutputFormat, print_info, print_json, print_success, symbols};

pub fn cmd_variant_add(
  globals: &Globals,
  name: String,
  slug: Option<String>,
  inherits: Option<String>,
  main: bool,
) -> Result<()> {
  let (store, mut pack) = globals.load()?;

  let variant = pack
    .add_variant(
      VariantConfig {
        name,
        slug,
        inherits,
        resources: Vec::new(),
      },
      main,
    )
    .context("Failed to add variant")?;
  let message = match &variant.inherits {
    Some(parent) => format!("Added variant '{}' inheriting from '{}'", variant.slug, parent),
    None => format!("Added variant '{}'", variant.slug),
  };

  store.save(&pack)?;
  print_success(&message);
  Ok(())
}

pub fn cmd_variant_remove(globals: &Globals, slug: &str) -> Result<()> {
  let (store, mut pack) = globals.load()?;

  let was_main = pack.manifest().main.as_deref() == Some(slug);
  pack.remove_variant(slug).context("Failed to remove variant")?;
  store.save(&pack)?;
  store.remove_variant_file(slug)?;

  print_success(&format!("Removed variant '{}'", slug));
  if was_main {
    print_info("The pack no longer has a main variant");
  }
  Ok(())
}

pub fn cmd_variant_main(globals: &Globals, slug: Option<&str>, clear: bool) -> Result<()> {
  let (store, mut pack) = globals.load()?;

  if slug.is_none() && !clear {
    match &pack.manifest().main {
      Some(main) => println!("{}", main),
      None => print_info("No main variant set"),
    }
    return Ok(());
  }

  pack.set_main_variant(slug).context("Failed to set main variant")?;
  store.save(&pack)?;

  match slug {
    Some(slug) => print_success(&format!("Main variant is now '{}'", slug)),
    None => print_success("Cleared main variant"),
  }
  Ok(())
}

pub fn cmd_variant_list(globals: &Globals, output: OutputFormat) -> Result<()> {
  let (_, pack) = globals.load()?;
  let main = pack.manifest().main.as_deref();
  let mut resolver = InheritanceResolver::new(pack.variants());

  let mut rows = Vec::with_capacity(pack.variants().len());
  for variant in pack.variants() {
    let resolved = resolver.resolve(&variant.slug).map(|r| r.len());
    rows.push((variant, resolved));
  }

  if output.is_json() {
    let items: Vec<_> = rows
      .iter()
      .map(|(variant, resolved)| {
        serde_json::json!({
          "slug": variant.slug,
          "name": variant.name,
          "inherits": variant.inherits,
          "main": main == Some(variant.slug.as_str()),
          "resources": variant.resources.len(),
          "resolved_resources": resolved.as_ref().ok(),
          "error": resolved.as_ref().err().map(ToString::to_string),
        })
      })
      .collect();
    return print_json(&items);
  }

  if rows.is_empty() {
    print_info("No variants");
    return Ok(());
  }

  for (variant, resolved) in rows {
    let marker = if main == Some(variant.slug.as_str()) { "*" } else { " " };
    let parent = variant
      .inherits
      .as_deref()
      .map(|p| format!(" {} {}", symbols::ARROW, p))
      .unwrap_or_default();
    let count = match resolved {
      Ok(count) => format!("{} resources", count),
      Err(e) => format!("{} {}", symbols::ERROR, e),
    };

    println!(
      "{} {} ({}){}  {}",
      marker,
      variant.slug.if_supports_color(Stream::Stdout, |s| s.bold()),
      variant.name,
      parent,
      count.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  Ok(())
}
