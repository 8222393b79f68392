//! packwiz command generation.
//!
//! Turns a resolved variant into the ordered list of packwiz invocations that
//! build it, and produces the export invocations for a compiled pack.
//! Invocations are argument vectors (see [`Invocation`]).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{BIN_DIR, DEFAULT_PACKWIZ, EXPORTS_DIR};
use crate::exec::Invocation;
use crate::pack::{PackManifest, Resource, ResourceType, VariantManifest};

/// Errors that can occur while generating commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
  /// The resource type has no packwiz meta folder.
  #[error("resource '{resource}' has type '{resource_type}' which has no packwiz folder")]
  Configuration { resource: String, resource_type: String },
}

/// Explicit configuration for running packwiz.
#[derive(Debug, Clone)]
pub struct PackwizConfig {
  /// Path or name of the packwiz executable.
  pub program: String,
  /// Root directory of the pack (holds `bin/` and `exports/`).
  pub cwd: PathBuf,
  /// Run invocations through this shell instead of spawning packwiz directly.
  pub shell: Option<String>,
}

impl Default for PackwizConfig {
  fn default() -> Self {
    Self {
      program: DEFAULT_PACKWIZ.to_string(),
      cwd: PathBuf::from("."),
      shell: None,
    }
  }
}

impl PackwizConfig {
  /// Anchor `cwd` and a relative `program` path at the current directory.
  ///
  /// packwiz runs inside `bin/<target>/<variant>`, so relative paths in its
  /// invocations (the program itself and every `-o` output) would otherwise
  /// resolve against the wrong directory. Bare program names are left for
  /// PATH lookup.
  pub fn absolute(&self) -> io::Result<Self> {
    let program_path = Path::new(&self.program);
    let program = if program_path.is_relative() && program_path.components().count() > 1 {
      std::path::absolute(program_path)?.to_string_lossy().into_owned()
    } else {
      self.program.clone()
    };

    Ok(Self {
      program,
      cwd: std::path::absolute(&self.cwd)?,
      shell: self.shell.clone(),
    })
  }

  /// Working directory of one compile pipeline: `bin/<target>/<variant>`.
  pub fn bin_dir(&self, target: &str, variant: &str) -> PathBuf {
    self.cwd.join(BIN_DIR).join(target).join(variant)
  }

  /// Destination directory of one export pipeline: `exports/<target>/<variant>`.
  pub fn exports_dir(&self, target: &str, variant: &str) -> PathBuf {
    self.cwd.join(EXPORTS_DIR).join(target).join(variant)
  }
}

/// The packwiz `--meta-folder` for a resource type.
pub fn meta_folder(resource: &Resource) -> Result<&'static str, CommandError> {
  match resource.kind() {
    ResourceType::Mod => Ok("mods"),
    ResourceType::ResourcePack => Ok("resourcepacks"),
    ResourceType::Shader => Ok("shaderpacks"),
    ResourceType::Config => Ok("config"),
    ResourceType::Other(other) => Err(CommandError::Configuration {
      resource: resource.name().to_string(),
      resource_type: other.clone(),
    }),
  }
}

/// The pack name packwiz should use for a variant.
///
/// The main variant carries the plain pack name; others are suffixed with the
/// variant name in brackets.
pub fn display_name(pack: &PackManifest, variant: &VariantManifest) -> String {
  if pack.main.as_deref() == Some(variant.slug.as_str()) {
    pack.name.clone()
  } else {
    format!("{} [{}]", pack.name, variant.name)
  }
}

/// Generate the ordered packwiz invocations that build `variant` for `target`.
///
/// `variant` must already be resolved (see [`crate::resolve`]). The list is
/// `init`, one `add` per resource in order, then `refresh`. Fails before
/// producing anything if a resource type cannot be mapped.
pub fn generate_commands(
  variant: &VariantManifest,
  pack: &PackManifest,
  target: &str,
  config: &PackwizConfig,
) -> Result<Vec<Invocation>, CommandError> {
  let mut commands = Vec::with_capacity(variant.resources.len() + 2);

  commands.push(Invocation::new(&config.program).args([
    "init",
    "--author",
    pack.author.as_str(),
    "--mc-version",
    target,
    "--fabric-latest",
    "--name",
    display_name(pack, variant).as_str(),
    "--version",
    pack.version.as_str(),
    "-r",
    "--modloader",
    "fabric",
    "-y",
  ]));

  for resource in &variant.resources {
    let folder = meta_folder(resource)?;
    let add = match resource {
      Resource::Url(r) => Invocation::new(&config.program).args(["url", "add", r.name.as_str(), r.url.as_str()]),
      Resource::Modrinth(r) | Resource::Curseforge(r) => {
        Invocation::new(&config.program).args([resource.source(), "add", r.id.as_str()])
      }
    };
    commands.push(add.args(["--meta-folder", folder]));
  }

  commands.push(Invocation::new(&config.program).arg("refresh"));

  debug!(
    variant = %variant.slug,
    target = %target,
    commands = commands.len(),
    "generated packwiz commands"
  );

  Ok(commands)
}

/// Output formats produced by `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  Modrinth,
  Curseforge,
}

impl ExportFormat {
  pub const ALL: [ExportFormat; 2] = [ExportFormat::Modrinth, ExportFormat::Curseforge];

  /// The packwiz subcommand namespace.
  pub fn subcommand(self) -> &'static str {
    match self {
      ExportFormat::Modrinth => "modrinth",
      ExportFormat::Curseforge => "curseforge",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      ExportFormat::Modrinth => "mrpack",
      ExportFormat::Curseforge => "zip",
    }
  }
}

/// Artifact path: `<exports_dir>/<pack-slug>-<variant-slug>.<ext>`.
pub fn export_path(exports_dir: &Path, pack: &PackManifest, variant: &str, format: ExportFormat) -> PathBuf {
  exports_dir.join(format!("{}-{}.{}", pack.slug, variant, format.extension()))
}

/// Generate the export invocations for one compiled `(target, variant)` pair.
pub fn export_commands(pack: &PackManifest, variant: &str, target: &str, config: &PackwizConfig) -> Vec<Invocation> {
  let exports_dir = config.exports_dir(target, variant);
  ExportFormat::ALL
    .iter()
    .map(|&format| {
      let output = export_path(&exports_dir, pack, variant, format);
      Invocation::new(&config.program).args([
        format.subcommand().to_string(),
        "export".to_string(),
        "-o".to_string(),
        output.to_string_lossy().to_string(),
      ])
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pack::ResourceType;

  fn pack(main: Option<&str>) -> PackManifest {
    PackManifest {
      name: "Crystal".to_string(),
      slug: "crystal".to_string(),
      description: String::new(),
      author: "Jane Doe".to_string(),
      version: "1.2.0".to_string(),
      targets: vec!["1.20".to_string()],
      main: main.map(str::to_string),
      variants: vec!["main".to_string(), "extra".to_string()],
      packwiz: None,
    }
  }

  fn variant(slug: &str, name: &str, resources: Vec<Resource>) -> VariantManifest {
    VariantManifest {
      name: name.to_string(),
      slug: slug.to_string(),
      inherits: None,
      resources,
    }
  }

  fn config() -> PackwizConfig {
    PackwizConfig {
      program: "/opt/packwiz".to_string(),
      cwd: PathBuf::from("/packs/crystal"),
      shell: None,
    }
  }

  #[test]
  fn display_name_depends_on_main() {
    let v = variant("extra", "Extra", vec![]);
    assert_eq!(display_name(&pack(Some("main")), &v), "Crystal [Extra]");
    assert_eq!(display_name(&pack(Some("extra")), &v), "Crystal");
    assert_eq!(display_name(&pack(None), &v), "Crystal [Extra]");
  }

  #[test]
  fn command_count_is_init_plus_resources_plus_refresh() {
    let resources = vec![
      Resource::modrinth("a", "a", ResourceType::Mod),
      Resource::url("b", "https://b", ResourceType::Config),
      Resource::curseforge("c", "123", ResourceType::ResourcePack),
    ];
    let v = variant("main", "Main", resources);

    let commands = generate_commands(&v, &pack(Some("main")), "1.20", &config()).unwrap();

    assert_eq!(commands.len(), 1 + 3 + 1);
    assert_eq!(commands[0].args[0], "init");
    assert_eq!(commands[4].args, vec!["refresh"]);
    assert!(commands.iter().all(|c| c.program == "/opt/packwiz"));
  }

  #[test]
  fn init_carries_author_target_and_name() {
    let v = variant("main", "Main", vec![]);
    let commands = generate_commands(&v, &pack(Some("main")), "1.20.1", &config()).unwrap();

    assert_eq!(
      commands[0].args,
      vec![
        "init",
        "--author",
        "Jane Doe",
        "--mc-version",
        "1.20.1",
        "--fabric-latest",
        "--name",
        "Crystal",
        "--version",
        "1.2.0",
        "-r",
        "--modloader",
        "fabric",
        "-y",
      ]
    );
  }

  #[test]
  fn add_commands_map_sources_and_folders() {
    let v = variant(
      "main",
      "Main",
      vec![
        Resource::url("Fancy Shader", "https://e.com/s.zip", ResourceType::Shader),
        Resource::modrinth("Sodium", "AANobbMI", ResourceType::Mod),
        Resource::curseforge("Faithful", "236821", ResourceType::ResourcePack),
      ],
    );

    let commands = generate_commands(&v, &pack(None), "1.20", &config()).unwrap();

    assert_eq!(
      commands[1].args,
      vec!["url", "add", "Fancy Shader", "https://e.com/s.zip", "--meta-folder", "shaderpacks"]
    );
    assert_eq!(
      commands[2].args,
      vec!["modrinth", "add", "AANobbMI", "--meta-folder", "mods"]
    );
    assert_eq!(
      commands[3].args,
      vec!["curseforge", "add", "236821", "--meta-folder", "resourcepacks"]
    );
  }

  #[test]
  fn unmapped_type_fails_generation() {
    let v = variant(
      "main",
      "Main",
      vec![
        Resource::modrinth("ok", "ok", ResourceType::Mod),
        Resource::modrinth("dp", "dp", ResourceType::Other("datapack".to_string())),
      ],
    );

    assert_eq!(
      generate_commands(&v, &pack(None), "1.20", &config()),
      Err(CommandError::Configuration {
        resource: "dp".to_string(),
        resource_type: "datapack".to_string(),
      })
    );
  }

  #[test]
  fn export_commands_write_into_exports_tree() {
    let commands = export_commands(&pack(None), "extra", "1.20", &config());

    assert_eq!(commands.len(), 2);
    assert_eq!(
      commands[0].args,
      vec!["modrinth", "export", "-o", "/packs/crystal/exports/1.20/extra/crystal-extra.mrpack"]
    );
    assert_eq!(
      commands[1].args,
      vec!["curseforge", "export", "-o", "/packs/crystal/exports/1.20/extra/crystal-extra.zip"]
    );
  }

  #[test]
  fn pipeline_directories_are_isolated_per_pair() {
    let config = config();
    assert_eq!(config.bin_dir("1.20", "main"), PathBuf::from("/packs/crystal/bin/1.20/main"));
    assert_ne!(config.bin_dir("1.20", "main"), config.bin_dir("1.21", "main"));
    assert_eq!(
      config.exports_dir("1.21", "extra"),
      PathBuf::from("/packs/crystal/exports/1.21/extra")
    );
  }

  #[test]
  fn absolute_anchors_relative_paths_at_current_dir() {
    let current = std::env::current_dir().unwrap();
    let config = PackwizConfig {
      program: "tools/packwiz".to_string(),
      ..PackwizConfig::default()
    }
    .absolute()
    .unwrap();

    assert!(config.cwd.is_absolute());
    assert_eq!(config.cwd, std::path::absolute(&current).unwrap());
    assert_eq!(PathBuf::from(&config.program), current.join("tools/packwiz"));

    let commands = export_commands(&pack(None), "main", "1.20", &config);
    assert!(Path::new(commands[0].args.last().unwrap()).is_absolute());

    let bare = PackwizConfig::default().absolute().unwrap();
    assert_eq!(bare.program, DEFAULT_PACKWIZ);
  }
}
