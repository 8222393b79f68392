//! `crystal target` subcommands.

use anyhow::{Result, bail};

use super::Globals;
use crate::output::{print_success, print_warning};

pub fn cmd_target_add(globals: &Globals, target: String) -> Result<()> {
  let (store, mut pack) = globals.load()?;

  if !pack.add_target(target.clone())? {
    print_warning(&format!("Target '{}' is already in the pack", target));
    return Ok(());
  }
  store.save(&pack)?;

  print_success(&format!("Added target '{}'", target));
  Ok(())
}

pub fn cmd_target_remove(globals: &Globals, target: &str) -> Result<()> {
  let (store, mut pack) = globals.load()?;

  if !pack.remove_target(target) {
    bail!("No target '{}' in pack", target);
  }
  store.save(&pack)?;

  print_success(&format!("Removed target '{}'", target));
  Ok(())
}
