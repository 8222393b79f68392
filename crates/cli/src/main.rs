mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crystal_lib::pack::ResourceType;

use crate::cmd::Globals;
use crate::output::{OutputFormat, print_error};

/// crystal - Build Minecraft modpack variants with packwiz
#[derive(Parser)]
#[command(name = "crystal")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Pack directory (holds pack.json)
  #[arg(long, global = true, env = "CRYSTAL_PACK_DIR", default_value = ".")]
  pack_dir: PathBuf,

  /// packwiz executable (defaults to the pack's setting, then `packwiz`)
  #[arg(long, global = true, env = "CRYSTAL_PACKWIZ")]
  packwiz: Option<String>,

  /// Run packwiz through this shell instead of spawning it directly
  #[arg(long, global = true)]
  shell: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a new pack
  Init {
    /// Directory to create the pack in (defaults to --pack-dir)
    path: Option<PathBuf>,

    /// Display name of the pack
    #[arg(long)]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long)]
    author: String,

    /// Pack version (default: 1.0.0)
    #[arg(long)]
    version: Option<String>,

    /// Pack slug (default: derived from the name)
    #[arg(long)]
    slug: Option<String>,

    /// Minecraft version to build for (repeatable)
    #[arg(long = "target")]
    targets: Vec<String>,
  },

  /// Add a resource to a variant
  #[command(subcommand)]
  Add(AddCommand),

  /// Remove a resource from a variant
  Remove {
    /// Name of the resource
    name: String,

    /// Variant to remove from (default: the main variant)
    variant: Option<String>,
  },

  /// Manage variants
  #[command(subcommand)]
  Variant(VariantCommand),

  /// Manage build targets (Minecraft versions)
  #[command(subcommand)]
  Target(TargetCommand),

  /// Compile variants into packwiz packs under bin/
  Compile {
    /// Only this target
    target: Option<String>,

    /// Only this variant
    variant: Option<String>,
  },

  /// Export compiled packs to Modrinth and CurseForge formats
  Export {
    /// Only this target
    target: Option<String>,

    /// Only this variant
    variant: Option<String>,
  },

  /// Show pack information
  Info {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

#[derive(Subcommand)]
enum AddCommand {
  /// Add a resource downloaded from a URL
  Url {
    name: String,
    url: String,

    #[command(flatten)]
    resource: ResourceArgs,
  },

  /// Add a Modrinth project
  Modrinth {
    /// Project id or slug
    id: String,

    /// Display name (default: the id)
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    resource: ResourceArgs,
  },

  /// Add a CurseForge project
  Curseforge {
    /// Project id
    id: String,

    /// Display name (default: the id)
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    resource: ResourceArgs,
  },
}

#[derive(clap::Args)]
struct ResourceArgs {
  /// Resource type: mod, resourcepack, shader or config
  #[arg(long = "type", default_value = "mod", value_parser = parse_resource_type)]
  kind: ResourceType,

  /// Variant to add to (default: the main variant)
  #[arg(long)]
  variant: Option<String>,
}

fn parse_resource_type(value: &str) -> Result<ResourceType, String> {
  value.parse()
}

#[derive(Subcommand)]
enum VariantCommand {
  /// Add a variant
  Add {
    /// Display name
    name: String,

    /// Slug (default: derived from the name)
    #[arg(long)]
    slug: Option<String>,

    /// Variant to inherit resources from
    #[arg(long)]
    inherits: Option<String>,

    /// Make this the main variant
    #[arg(long)]
    main: bool,
  },

  /// Remove a variant
  Remove { slug: String },

  /// Show or set the main variant
  Main {
    slug: Option<String>,

    /// Unset the main variant
    #[arg(long, conflicts_with = "slug")]
    clear: bool,
  },

  /// List variants
  List {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

#[derive(Subcommand)]
enum TargetCommand {
  /// Add a target
  Add { target: String },

  /// Remove a target
  Remove { target: String },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let globals = Globals {
    pack_dir: cli.pack_dir,
    packwiz: cli.packwiz,
    shell: cli.shell,
  };

  match cli.command {
    Commands::Init {
      path,
      name,
      description,
      author,
      version,
      slug,
      targets,
    } => cmd::cmd_init(cmd::InitArgs {
      path: path.unwrap_or_else(|| globals.pack_dir.clone()),
      name,
      description,
      author,
      version,
      slug,
      targets,
    }),
    Commands::Add(add) => match add {
      AddCommand::Url { name, url, resource } => cmd::cmd_add(
        &globals,
        cmd::NewResource::Url { name, url },
        resource.kind,
        resource.variant.as_deref(),
      ),
      AddCommand::Modrinth { id, name, resource } => cmd::cmd_add(
        &globals,
        cmd::NewResource::Modrinth { name, id },
        resource.kind,
        resource.variant.as_deref(),
      ),
      AddCommand::Curseforge { id, name, resource } => cmd::cmd_add(
        &globals,
        cmd::NewResource::Curseforge { name, id },
        resource.kind,
        resource.variant.as_deref(),
      ),
    },
    Commands::Remove { name, variant } => cmd::cmd_remove(&globals, &name, variant.as_deref()),
    Commands::Variant(variant) => match variant {
      VariantCommand::Add {
        name,
        slug,
        inherits,
        main,
      } => cmd::cmd_variant_add(&globals, name, slug, inherits, main),
      VariantCommand::Remove { slug } => cmd::cmd_variant_remove(&globals, &slug),
      VariantCommand::Main { slug, clear } => cmd::cmd_variant_main(&globals, slug.as_deref(), clear),
      VariantCommand::List { output } => cmd::cmd_variant_list(&globals, output),
    },
    Commands::Target(target) => match target {
      TargetCommand::Add { target } => cmd::cmd_target_add(&globals, target),
      TargetCommand::Remove { target } => cmd::cmd_target_remove(&globals, &target),
    },
    Commands::Compile { target, variant } => cmd::cmd_compile(&globals, target.as_deref(), variant.as_deref()),
    Commands::Export { target, variant } => cmd::cmd_export(&globals, target.as_deref(), variant.as_deref()),
    Commands::Info { output } => cmd::cmd_info(&globals, output),
  }
}
