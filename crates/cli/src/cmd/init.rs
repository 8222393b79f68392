//! Implementation of the `crystal init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crystal_lib::init::{InitOptions, init};

use crate::output::symbols;

pub struct InitArgs {
  pub path: PathBuf,
  pub name: String,
  pub description: String,
  pub author: String,
  pub version: Option<String>,
  pub slug: Option<String>,
  pub targets: Vec<String>,
}

/// Execute the init command.
///
/// Creates `pack.json` and a `main` variant in the given directory.
///
/// # Errors
///
/// Returns an error if a pack already exists there or if there are permission issues.
pub fn cmd_init(args: InitArgs) -> Result<()> {
  let options = InitOptions {
    path: args.path,
    name: args.name,
    description: args.description,
    author: args.author,
    version: args.version,
    slug: args.slug,
    targets: args.targets,
  };

  let result = init(&options).context("Failed to initialize pack")?;
  let manifest = result.pack.manifest();

  println!(
    "{} {}",
    symbols::SUCCESS.green(),
    format!("Initialized pack '{}'!", manifest.name).green().bold()
  );
  println!();
  println!("  {} Pack directory: {}", symbols::INFO.cyan(), result.pack_dir.display());
  println!("  {} Manifest:       {}", symbols::INFO.cyan(), result.manifest.display());
  println!("  {} Main variant:   {}", symbols::INFO.cyan(), result.main_variant.display());
  println!();
  println!("{}", "Next steps:".bold());
  if manifest.targets.is_empty() {
    println!("  1. Add a Minecraft version: {}", "crystal target add <VERSION>".cyan());
  } else {
    println!("  1. Targets: {}", manifest.targets.join(", ").cyan());
  }
  println!("  2. Add mods: {}", "crystal add modrinth <ID>".cyan());
  println!("  3. Build: {}", "crystal compile".cyan());

  Ok(())
}
