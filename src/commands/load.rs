//! Loading an installed distribution into a database through psql

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::commands::Context;
use crate::commands::build::source_dir;
use crate::commands::runner::{OutputMode, display_command};
use crate::error::ClientError;
use crate::spec::types::Spec;

/// First server version with `CREATE EXTENSION`
const EXTENSION_SUPPORT: (u32, u32, u32) = (9, 1, 0);

static PG_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PostgreSQL (\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid server version pattern")
});

/// Connection options passed to every psql invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbOptions {
    pub dbname: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
}

impl DbOptions {
    pub fn psql_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(dbname) = &self.dbname {
            args.extend(["--dbname".to_string(), dbname.clone()]);
        }
        if let Some(host) = &self.host {
            args.extend(["--host".to_string(), host.clone()]);
        }
        if let Some(port) = self.port {
            args.extend(["--port".to_string(), port.to_string()]);
        }
        if let Some(username) = &self.username {
            args.extend(["--username".to_string(), username.clone()]);
        }
        args
    }
}

#[derive(Debug, Deserialize)]
struct MetaName {
    name: String,
}

/// Extract `(major, minor, patch)` from the output of `SELECT version()`.
///
/// Missing components and development suffixes read as zero:
/// "PostgreSQL 9.1alpha5 on ..." -> (9, 1, 0)
pub fn parse_pg_version(version: &str) -> Option<(u32, u32, u32)> {
    let caps = PG_VERSION.captures(version)?;
    let part = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some((part(1)?, part(2)?, part(3)?))
}

/// Ask the server for its version
pub async fn get_pg_version(
    ctx: &Context,
    db: &DbOptions,
    cwd: &Path,
) -> Result<(u32, u32, u32), ClientError> {
    let mut args = db.psql_args();
    args.extend(["-tA", "-c", "SELECT version();"].map(String::from));

    let stdout = run_psql(ctx, &args, cwd, OutputMode::Capture).await?;

    parse_pg_version(&stdout).ok_or_else(|| {
        ClientError::Unsupported(format!("cannot read server version from '{}'", stdout.trim()))
    })
}

/// Load the extension built in the directory `spec` names
pub async fn load(ctx: &Context, spec: &Spec, db: &DbOptions) -> Result<(), ClientError> {
    let dir = source_dir(spec)?;
    let name = extension_name(dir).await?;

    let server_version = get_pg_version(ctx, db, dir).await?;
    debug!("Server version is {:?}", server_version);

    let mut args = db.psql_args();
    args.extend(["--set", "ON_ERROR_STOP=1"].map(String::from));

    let control = dir.join(format!("{}.control", name));
    if server_version >= EXTENSION_SUPPORT && tokio::fs::try_exists(&control).await? {
        info!("Creating extension {}", name);
        args.extend([
            "-c".to_string(),
            format!("CREATE EXTENSION {};", quote_ident(&name)),
        ]);
    } else {
        let sql = find_sql_file(dir, &name).await?;
        info!("Loading {}", sql.display());
        args.extend(["-f".to_string(), sql.display().to_string()]);
    }

    run_psql(ctx, &args, dir, OutputMode::Inherit).await?;
    Ok(())
}

async fn run_psql(
    ctx: &Context,
    args: &[String],
    cwd: &Path,
    mode: OutputMode,
) -> Result<String, ClientError> {
    let output = ctx.runner.run(&ctx.config.psql, args, cwd, mode).await?;

    if !output.success() {
        return Err(ClientError::BuildFailed {
            command: display_command(&ctx.config.psql, args),
            code: output.code,
        });
    }

    Ok(output.stdout)
}

/// Extension name from the distribution's META.json, else the directory name
async fn extension_name(dir: &Path) -> Result<String, ClientError> {
    match tokio::fs::read_to_string(dir.join("META.json")).await {
        Ok(content) => {
            let meta: MetaName = serde_json::from_str(&content).map_err(|e| {
                ClientError::Unsupported(format!("bad META.json in {}: {}", dir.display(), e))
            })?;
            Ok(meta.name)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::Unsupported(format!("cannot name extension in {}", dir.display()))
            }),
        Err(e) => Err(e.into()),
    }
}

async fn find_sql_file(dir: &Path, name: &str) -> Result<PathBuf, ClientError> {
    let file = format!("{}.sql", name);

    for candidate in [dir.join(&file), dir.join("sql").join(&file)] {
        if tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(ClientError::ResourceNotFound(format!(
        "cannot find {} in {}",
        file,
        dir.display()
    )))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
