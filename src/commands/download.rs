//! Download of release archives
//!
//! Archives fetched through the registry are checked against the SHA-1 in the
//! release metadata before anything is written. Existing files are never
//! overwritten: a numbered name is picked instead.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::commands::Context;
use crate::error::ClientError;
use crate::spec::types::{NameSpec, Spec};
use crate::version::catalog::{Archive, Release};
use crate::version::resolver::best_release;

/// Upper bound on numbered names tried before giving up
const MAX_RENAME_ATTEMPTS: u32 = 1000;

/// Find the release of a named distribution matching `spec` on the registry
pub async fn find_release(ctx: &Context, spec: &NameSpec) -> Result<Release, ClientError> {
    let catalog = ctx.registry.fetch_dist(spec.name.as_str()).await?;
    best_release(&catalog, spec, ctx.config.status).cloned()
}

/// Find the release a spec resolves to; only name specs have releases
pub async fn resolve_release(ctx: &Context, spec: &Spec) -> Result<Release, ClientError> {
    match spec {
        Spec::Name(spec) => find_release(ctx, spec).await,
        Spec::Local(_) | Spec::Remote(_) => Err(ClientError::Unsupported(format!(
            "cannot resolve '{}': only package names have releases",
            spec
        ))),
    }
}

/// Download the archive `spec` refers to into `target`
///
/// # Returns
/// The path of the written file, or the spec's own path for local specs
pub async fn download(ctx: &Context, spec: &Spec, target: &Path) -> Result<PathBuf, ClientError> {
    match spec {
        Spec::Local(path) => {
            info!("{} is a local file, nothing to download", path.display());
            Ok(path.clone())
        }
        Spec::Remote(url) => {
            let archive = ctx.registry.fetch_url(url).await?;
            save_archive(target, &archive).await
        }
        Spec::Name(spec) => {
            let release = find_release(ctx, spec).await?;
            let name = spec.name.as_str();

            let meta = ctx.registry.fetch_meta(name, &release.version).await?;
            let archive = ctx.registry.fetch_archive(name, &release.version).await?;
            verify_sha1(&archive, &meta.sha1)?;

            save_archive(target, &archive).await
        }
    }
}

/// Check the archive bytes against an expected hex SHA-1
pub fn verify_sha1(archive: &Archive, expected: &str) -> Result<(), ClientError> {
    let actual = hex::encode(Sha1::digest(&archive.bytes));

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ClientError::BadChecksum {
            file: archive.file_name.clone(),
            expected: expected.to_string(),
            actual,
        });
    }

    debug!("Checksum of {} verified", archive.file_name);
    Ok(())
}

/// Write `archive` into `dir` without overwriting existing files
pub async fn save_archive(dir: &Path, archive: &Archive) -> Result<PathBuf, ClientError> {
    for attempt in 0..MAX_RENAME_ATTEMPTS {
        let path = dir.join(numbered_name(&archive.file_name, attempt));

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} exists, trying another name", path.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(&archive.bytes).await?;
        file.flush().await?;

        info!("Saved {}", path.display());
        return Ok(path);
    }

    Err(ClientError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {} in {}", archive.file_name, dir.display()),
    )))
}

/// `foo-1.0.zip` for attempt 0, then `foo-1.0-1.zip`, `foo-1.0-2.zip`, ...
fn numbered_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, attempt, ext.to_string_lossy()),
        None => format!("{}-{}", stem, attempt),
    }
}
