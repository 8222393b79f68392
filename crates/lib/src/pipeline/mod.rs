//! Compile and export pipelines.
//!
//! A pack is built once per `(target, variant)` pair of the requested matrix.
//! Each pair gets its own pipeline running in its own directory
//! (`bin/<target>/<variant>`), so pipelines never share state and can run
//! concurrently. Within a pipeline, packwiz invocations run strictly in order.
//!
//! Resolution and command generation for the whole matrix happen before any
//! process is spawned, so a broken variant aborts the build before `bin/` is
//! touched. Repeated targets or variants in the matrix collapse
//! to their first occurrence, so no two pipelines share a directory.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::BIN_DIR;
use crate::exec::{ExecConfig, ExecError, Invocation, exec, run_concurrently, run_in_order};
use crate::pack::Pack;
use crate::packwiz::{CommandError, PackwizConfig, export_commands, generate_commands};
use crate::resolve::{InheritanceResolver, ResolveError};

/// Errors that can occur while compiling or exporting.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Command(#[from] CommandError),

  #[error(transparent)]
  Exec(#[from] ExecError),

  /// A process in the pipeline for one pair failed.
  #[error("pipeline for variant '{variant}' on target '{target}' failed: {source}")]
  Pipeline {
    target: String,
    variant: String,
    #[source]
    source: ExecError,
  },

  #[error("no variant '{0}' in pack")]
  UnknownVariant(String),

  #[error("no target '{0}' in pack")]
  UnknownTarget(String),

  /// Export was requested for a pair that has no compiled output.
  #[error("variant '{variant}' has not been compiled for target '{target}' ({} is missing)", path.display())]
  NotCompiled {
    target: String,
    variant: String,
    path: PathBuf,
  },

  #[error("failed to resolve pack directory {}: {source}", path.display())]
  PackDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Outcome of one successful pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
  pub target: String,
  pub variant: String,
  /// Directory the pipeline ran in.
  pub dir: PathBuf,
  /// Number of processes run.
  pub steps: usize,
  /// Files produced, for exports.
  pub artifacts: Vec<PathBuf>,
}

/// Outcome of a successful compile or export, one entry per pair in matrix
/// order (targets outer, variants inner).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  pub pipelines: Vec<PipelineReport>,
}

impl BuildReport {
  pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
    self.pipelines.iter().flat_map(|p| p.artifacts.iter())
  }
}

/// Pick the build matrix from optional user filters.
///
/// `None` selects every target (or every variant) of the pack. A named target
/// or variant must exist. Returns `(targets, variants)`.
pub fn select_matrix(
  pack: &Pack,
  target: Option<&str>,
  variant: Option<&str>,
) -> Result<(Vec<String>, Vec<String>), BuildError> {
  let manifest = pack.manifest();

  let targets = match target {
    Some(t) if pack.has_target(t) => vec![t.to_string()],
    Some(t) => return Err(BuildError::UnknownTarget(t.to_string())),
    None => manifest.targets.clone(),
  };

  let variants = match variant {
    Some(v) if pack.has_variant(v) => vec![v.to_string()],
    Some(v) => return Err(BuildError::UnknownVariant(v.to_string())),
    None => manifest.variants.clone(),
  };

  Ok((targets, variants))
}

/// The `(target, variant)` pairs to build, targets outer, each value once.
///
/// Fails on anything the pack does not know about.
fn matrix<'a>(
  pack: &Pack,
  targets: &'a [String],
  variants: &'a [String],
) -> Result<Vec<(&'a String, &'a String)>, BuildError> {
  let mut unique_targets: Vec<&String> = Vec::with_capacity(targets.len());
  for target in targets {
    if !pack.has_target(target) {
      return Err(BuildError::UnknownTarget(target.clone()));
    }
    if !unique_targets.contains(&target) {
      unique_targets.push(target);
    }
  }

  let mut unique_variants: Vec<&String> = Vec::with_capacity(variants.len());
  for slug in variants {
    if !pack.has_variant(slug) {
      return Err(BuildError::UnknownVariant(slug.clone()));
    }
    if !unique_variants.contains(&slug) {
      unique_variants.push(slug);
    }
  }

  if unique_targets.len() != targets.len() || unique_variants.len() != variants.len() {
    debug!("dropped repeated entries from build matrix");
  }

  Ok(
    unique_targets
      .iter()
      .flat_map(|&t| unique_variants.iter().map(move |&v| (t, v)))
      .collect(),
  )
}

fn absolute_config(config: &PackwizConfig) -> Result<PackwizConfig, BuildError> {
  config.absolute().map_err(|source| BuildError::PackDir {
    path: config.cwd.clone(),
    source,
  })
}

struct Plan {
  target: String,
  variant: String,
  dir: PathBuf,
  commands: Vec<Invocation>,
  artifacts: Vec<PathBuf>,
}

/// Compile every `(target, variant)` pair of the matrix.
///
/// Plans every pair, clears `bin/`, then runs one pipeline per pair
/// concurrently. Targets and variants must belong to the pack. Fails
/// with the first pipeline failure observed; other pipelines keep running in
/// the background and their results are discarded.
pub async fn compile(
  variants: &[String],
  targets: &[String],
  pack: &Pack,
  config: &PackwizConfig,
) -> Result<BuildReport, BuildError> {
  let config = &absolute_config(config)?;
  let pairs = matrix(pack, targets, variants)?;

  let mut resolver = InheritanceResolver::new(pack.variants());
  let mut plans = Vec::with_capacity(pairs.len());
  for (target, slug) in pairs {
    let resolved = resolver.resolve_variant(slug)?;
    let commands = generate_commands(&resolved, pack.manifest(), target, config)?;

    plans.push(Plan {
      target: target.clone(),
      variant: slug.clone(),
      dir: config.bin_dir(target, slug),
      commands,
      artifacts: Vec::new(),
    });
  }

  let bin = config.cwd.join(BIN_DIR);
  match tokio::fs::remove_dir_all(&bin).await {
    Ok(()) => debug!(path = ?bin, "cleared previous build output"),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = ?bin, error = %e, "failed to clear previous build output"),
  }

  info!(
    pack = %pack.manifest().slug,
    pipelines = plans.len(),
    "compiling"
  );

  run_plans(plans, config.shell.clone(), true).await
}

/// Export every compiled `(target, variant)` pair of the matrix.
///
/// Both export formats of a pair run concurrently from its `bin/` directory
/// and write into `exports/<target>/<variant>/`.
pub async fn export(
  pack: &Pack,
  targets: &[String],
  variants: &[String],
  config: &PackwizConfig,
) -> Result<BuildReport, BuildError> {
  let config = &absolute_config(config)?;
  let pairs = matrix(pack, targets, variants)?;

  let mut plans = Vec::with_capacity(pairs.len());
  for (target, slug) in pairs {
    let dir = config.bin_dir(target, slug);
    if !dir.is_dir() {
      return Err(BuildError::NotCompiled {
        target: target.clone(),
        variant: slug.clone(),
        path: dir,
      });
    }

    let commands = export_commands(pack.manifest(), slug, target, config);
    let artifacts = commands
      .iter()
      .filter_map(|c| c.args.last().map(PathBuf::from))
      .collect();

    plans.push(Plan {
      target: target.clone(),
      variant: slug.clone(),
      dir,
      commands,
      artifacts,
    });
  }

  info!(
    pack = %pack.manifest().slug,
    pipelines = plans.len(),
    "exporting"
  );

  run_plans(plans, config.shell.clone(), false).await
}

/// Run all plans concurrently. Steps of one plan run in order when
/// `sequential`, otherwise concurrently.
async fn run_plans(plans: Vec<Plan>, shell: Option<String>, sequential: bool) -> Result<BuildReport, BuildError> {
  let ops = plans.into_iter().map(|plan| {
    let shell = shell.clone();
    move || run_plan(plan, shell, sequential)
  });

  let pipelines = run_concurrently(ops).await?;
  Ok(BuildReport { pipelines })
}

async fn run_plan(plan: Plan, shell: Option<String>, sequential: bool) -> Result<PipelineReport, BuildError> {
  let Plan {
    target,
    variant,
    dir,
    commands,
    artifacts,
  } = plan;

  // Export pipelines run in an existing bin dir and need their output dir.
  let create = artifacts.first().and_then(|a| a.parent()).unwrap_or(&dir).to_path_buf();
  tokio::fs::create_dir_all(&create)
    .await
    .map_err(|source| BuildError::CreateDir { path: create, source })?;

  info!(target = %target, variant = %variant, steps = commands.len(), "starting pipeline");

  let exec_config = ExecConfig::strict(&dir).with_shell(shell);
  let steps = commands.len();
  let ops = commands.into_iter().map(|invocation| {
    let exec_config = exec_config.clone();
    move || async move { exec(&invocation, &exec_config).await }
  });

  let outcome = if sequential {
    run_in_order(ops).await
  } else {
    run_concurrently(ops).await
  };

  if let Err(source) = outcome {
    warn!(target = %target, variant = %variant, error = %source, "pipeline failed");
    return Err(BuildError::Pipeline {
      target,
      variant,
      source,
    });
  }

  info!(target = %target, variant = %variant, "pipeline finished");

  Ok(PipelineReport {
    target,
    variant,
    dir,
    steps,
    artifacts,
  })
}
