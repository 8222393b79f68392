mod add;
mod build;
mod info;
mod init;
mod target;
mod variant;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crystal_lib::consts::DEFAULT_PACKWIZ;
use crystal_lib::pack::{Pack, PackStore};
use crystal_lib::packwiz::PackwizConfig;

pub use add::{NewResource, cmd_add, cmd_remove};
pub use build::{cmd_compile, cmd_export};
pub use info::cmd_info;
pub use init::{InitArgs, cmd_init};
pub use target::{cmd_target_add, cmd_target_remove};
pub use variant::{cmd_variant_add, cmd_variant_list, cmd_variant_main, cmd_variant_remove};

/// Flags shared by every command.
pub struct Globals {
  pub pack_dir: PathBuf,
  pub packwiz: Option<String>,
  pub shell: Option<String>,
}

impl Globals {
  /// The pack directory as an absolute path.
  pub fn pack_root(&self) -> Result<PathBuf> {
    dunce::canonicalize(&self.pack_dir)
      .with_context(|| format!("Pack directory not found: {}", self.pack_dir.display()))
  }

  /// Load the pack and the store it came from.
  pub fn load(&self) -> Result<(PackStore, Pack)> {
    let store = PackStore::new(self.pack_root()?);
    let pack = store.load().context("Failed to load pack")?;
    Ok((store, pack))
  }

  /// packwiz settings for `pack`.
  ///
  /// The executable comes from `--packwiz`, then the pack manifest, then
  /// `packwiz` on the PATH. Relative paths are made absolute because packwiz
  /// runs inside `bin/<target>/<variant>`.
  pub fn packwiz_config(&self, pack: &Pack) -> Result<PackwizConfig> {
    let root = self.pack_root()?;

    let program = match (&self.packwiz, &pack.manifest().packwiz) {
      (Some(flag), _) => {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        absolute_program(flag, &cwd)
      }
      (None, Some(manifest)) => absolute_program(manifest, &root),
      (None, None) => DEFAULT_PACKWIZ.to_string(),
    };

    Ok(PackwizConfig {
      program,
      cwd: root,
      shell: self.shell.clone(),
    })
  }
}

/// The variant a resource command applies to: the explicit one, else `main`.
pub fn variant_or_main(pack: &Pack, variant: Option<&str>) -> Result<String> {
  match variant {
    Some(slug) => Ok(slug.to_string()),
    None => pack
      .manifest()
      .main
      .clone()
      .ok_or_else(|| anyhow!("No main variant set; pass a variant or run 'crystal variant main <SLUG>'")),
  }
}

/// Anchor a program given as a relative path at `base`. Bare names are left
/// for PATH lookup.
fn absolute_program(program: &str, base: &Path) -> String {
  let path = Path::new(program);
  if path.is_relative() && path.components().count() > 1 {
    base.join(path).to_string_lossy().into_owned()
  } else {
    program.to_string()
  }
}
