//! make-driven install and check of an unpacked distribution

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::commands::Context;
use crate::commands::runner::{OutputMode, display_command};
use crate::error::ClientError;
use crate::spec::types::Spec;

/// Files left behind by a failed `make installcheck`
const REGRESSION_FILES: [&str; 2] = ["regression.out", "regression.diffs"];

/// Directory holding the sources a build command works on
pub fn source_dir(spec: &Spec) -> Result<&Path, ClientError> {
    match spec {
        Spec::Local(path) if path.is_dir() => Ok(path.as_path()),
        Spec::Local(path) => Err(ClientError::Unsupported(format!(
            "'{}' is not a directory: unpack the archive and pass its directory",
            path.display()
        ))),
        Spec::Name(_) | Spec::Remote(_) => Err(ClientError::Unsupported(format!(
            "cannot build '{}': download and unpack it, then pass the source directory",
            spec
        ))),
    }
}

/// Build and install the distribution at `spec`
pub async fn install(ctx: &Context, spec: &Spec) -> Result<(), ClientError> {
    let dir = source_dir(spec)?;

    info!("Building {}", dir.display());
    run_make(ctx, dir, None, None).await?;

    info!("Installing {}", dir.display());
    run_make(ctx, dir, Some("install"), ctx.config.sudo.as_deref()).await
}

/// Run the regression tests of the installed distribution at `spec`
///
/// On failure the regression output is moved into `output_dir` so it
/// survives the source tree.
pub async fn check(ctx: &Context, spec: &Spec, output_dir: &Path) -> Result<(), ClientError> {
    let dir = source_dir(spec)?;

    info!("Checking {}", dir.display());
    match run_make(ctx, dir, Some("installcheck"), None).await {
        Err(err @ ClientError::BuildFailed { .. }) => {
            for moved in move_regression_files(dir, output_dir).await? {
                warn!("Test output saved to {}", moved.display());
            }
            Err(err)
        }
        other => other,
    }
}

async fn run_make(
    ctx: &Context,
    dir: &Path,
    target: Option<&str>,
    sudo: Option<&str>,
) -> Result<(), ClientError> {
    let mut args = Vec::new();
    if let Some(pg_config) = &ctx.config.pg_config {
        args.push(format!("PG_CONFIG={}", pg_config.display()));
    }
    if let Some(target) = target {
        args.push(target.to_string());
    }

    let (program, args) = match sudo {
        Some(sudo) => {
            let mut prefixed = vec![ctx.config.make.clone()];
            prefixed.extend(args);
            (sudo.to_string(), prefixed)
        }
        None => (ctx.config.make.clone(), args),
    };

    let output = ctx
        .runner
        .run(&program, &args, dir, OutputMode::Inherit)
        .await?;

    if !output.success() {
        return Err(ClientError::BuildFailed {
            command: display_command(&program, &args),
            code: output.code,
        });
    }

    Ok(())
}

async fn move_regression_files(dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ClientError> {
    let mut moved = Vec::new();

    for name in REGRESSION_FILES {
        let from = dir.join(name);
        if !tokio::fs::try_exists(&from).await? {
            continue;
        }

        let to = output_dir.join(name);
        if from == to {
            moved.push(to);
            continue;
        }

        // rename fails across filesystems, so copy then remove
        tokio::fs::copy(&from, &to).await?;
        tokio::fs::remove_file(&from).await?;
        moved.push(to);
    }

    Ok(moved)
}
