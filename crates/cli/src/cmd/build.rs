//! Implementation of `crystal compile` and `crystal export`.
//!
//! Both commands pick the `(target, variant)` matrix from the optional
//! arguments, then hand it to the pipeline on a tokio runtime.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crystal_lib::pipeline::{BuildReport, compile, export, select_matrix};

use super::Globals;
use crate::output::{format_duration, print_info, print_stat, print_success};

/// Execute the compile command.
///
/// Builds every selected pair into `bin/<target>/<variant>` with packwiz.
pub fn cmd_compile(globals: &Globals, target: Option<&str>, variant: Option<&str>) -> Result<()> {
  let (_, pack) = globals.load()?;
  let (targets, variants) = select_matrix(&pack, target, variant)?;
  if targets.is_empty() || variants.is_empty() {
    print_info("Nothing to compile: the pack needs at least one target and one variant");
    return Ok(());
  }
  let config = globals.packwiz_config(&pack)?;
  info!(program = %config.program, "using packwiz");

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(compile(&variants, &targets, &pack, &config))
    .context("Compile failed")?;

  print_success(&format!(
    "Compiled {} pack(s) in {}",
    report.pipelines.len(),
    format_duration(started.elapsed())
  ));
  print_pipelines(&report);

  Ok(())
}

/// Execute the export command.
///
/// Exports every selected, already compiled pair to `.mrpack` and `.zip`.
pub fn cmd_export(globals: &Globals, target: Option<&str>, variant: Option<&str>) -> Result<()> {
  let (_, pack) = globals.load()?;
  let (targets, variants) = select_matrix(&pack, target, variant)?;
  if targets.is_empty() || variants.is_empty() {
    print_info("Nothing to export: the pack needs at least one target and one variant");
    return Ok(());
  }
  let config = globals.packwiz_config(&pack)?;

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(export(&pack, &targets, &variants, &config))
    .context("Export failed")?;

  print_success(&format!(
    "Exported {} pack(s) in {}",
    report.pipelines.len(),
    format_duration(started.elapsed())
  ));
  for artifact in report.artifacts() {
    print_stat("Artifact", &artifact.display().to_string());
  }

  Ok(())
}

fn print_pipelines(report: &BuildReport) {
  for pipeline in &report.pipelines {
    print_stat(
      &format!("{}/{}", pipeline.target, pipeline.variant),
      &pipeline.dir.display().to_string(),
    );
  }
}
