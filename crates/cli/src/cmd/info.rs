//! Implementation of `crystal info`.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use crystal_lib::resolve::InheritanceResolver;

use super::Globals;
use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(globals: &Globals, output: OutputFormat) -> Result<()> {
  let (_, pack) = globals.load()?;
  let config = globals.packwiz_config(&pack)?;
  let manifest = pack.manifest();

  let mut resolver = InheritanceResolver::new(pack.variants());
  let counts: Vec<_> = pack
    .variants()
    .iter()
    .map(|v| (v, resolver.resolve(&v.slug).map(|r| r.len())))
    .collect();

  if output.is_json() {
    let variants: Vec<_> = counts
      .iter()
      .map(|(v, resolved)| {
        serde_json::json!({
          "slug": v.slug,
          "name": v.name,
          "inherits": v.inherits,
          "resources": v.resources.len(),
          "resolved_resources": resolved.as_ref().ok(),
        })
      })
      .collect();
    let json_output = serde_json::json!({
      "name": manifest.name,
      "slug": manifest.slug,
      "version": manifest.version,
      "author": manifest.author,
      "description": manifest.description,
      "targets": manifest.targets,
      "main": manifest.main,
      "packwiz": config.program,
      "directory": config.cwd,
      "variants": variants,
    });
    return print_json(&json_output);
  }

  println!(
    "{} {}",
    manifest.name.if_supports_color(Stream::Stdout, |s| s.bold()),
    format!("v{}", manifest.version).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
  if !manifest.description.is_empty() {
    println!("{}", manifest.description);
  }
  println!();
  print_stat("Slug", &manifest.slug);
  print_stat("Author", &manifest.author);
  print_stat("Targets", &display_list(&manifest.targets));
  print_stat("Main", manifest.main.as_deref().unwrap_or("(none)"));
  print_stat("packwiz", &config.program);
  print_stat("Directory", &config.cwd.display().to_string());
  println!();
  println!("Variants:");
  for (variant, resolved) in counts {
    let resolved = match resolved {
      Ok(n) => n.to_string(),
      Err(e) => e.to_string(),
    };
    println!(
      "  {} {} own, {} resolved",
      variant.slug,
      variant.resources.len(),
      resolved
    );
  }

  Ok(())
}

fn display_list(values: &[String]) -> String {
  if values.is_empty() {
    "(none)".to_string()
  } else {
    values.join(", ")
  }
}
