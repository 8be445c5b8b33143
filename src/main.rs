use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pgxn_client::commands::load::DbOptions;
use pgxn_client::commands::{Context, build, download, load};
use pgxn_client::config::{ClientConfig, config_path};
use pgxn_client::error::ClientError;
use pgxn_client::spec;
use pgxn_client::version::status::Status;

#[derive(Parser)]
#[command(name = "pgxn")]
#[command(version, about = "Interact with the PostgreSQL Extension Network")]
struct Cli {
    /// Registry mirror to use
    #[arg(long, global = true)]
    mirror: Option<String>,

    /// Configuration file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct StatusArgs {
    /// Also consider testing releases
    #[arg(long, conflicts_with = "unstable")]
    testing: bool,

    /// Also consider testing and unstable releases
    #[arg(long)]
    unstable: bool,
}

impl StatusArgs {
    fn status(&self) -> Option<Status> {
        if self.unstable {
            Some(Status::Unstable)
        } else if self.testing {
            Some(Status::Testing)
        } else {
            None
        }
    }
}

#[derive(Args)]
struct DbArgs {
    #[arg(short = 'd', long)]
    dbname: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    #[arg(short = 'U', long)]
    username: Option<String>,
}

impl From<DbArgs> for DbOptions {
    fn from(args: DbArgs) -> Self {
        DbOptions {
            dbname: args.dbname,
            host: args.host,
            port: args.port,
            username: args.username,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Download a distribution archive
    Download {
        /// Name with optional version constraint, url or local path
        spec: String,

        /// Directory to save the archive into
        #[arg(long, default_value = ".")]
        target: PathBuf,

        #[command(flatten)]
        status: StatusArgs,
    },
    /// Build and install an unpacked distribution
    Install {
        /// Source directory of the distribution
        spec: String,

        /// Program to run `make install` with
        #[arg(long)]
        sudo: Option<String>,

        #[arg(long)]
        pg_config: Option<PathBuf>,
    },
    /// Run the regression tests of an installed distribution
    Check {
        /// Source directory of the distribution
        spec: String,

        #[arg(long)]
        pg_config: Option<PathBuf>,
    },
    /// Load an installed extension into a database
    Load {
        /// Source directory of the distribution
        spec: String,

        #[command(flatten)]
        db: DbArgs,
    },
    /// Print the release a spec resolves to
    Resolve {
        /// Name with optional version constraint
        spec: String,

        #[command(flatten)]
        status: StatusArgs,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--verbose` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new("pgxn_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pgxn_client=warn"))
    };

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
        return Ok(None);
    };

    let file_name = log_file
        .file_name()
        .with_context(|| format!("log file {:?} has no file name", log_file))?;
    let dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .init();

    Ok(Some(guard))
}

fn effective_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config = ClientConfig::load(&path)?;
    if let Some(mirror) = &cli.mirror {
        config.mirror = mirror.clone();
    }
    Ok(config)
}

async fn run(command: Command, mut config: ClientConfig) -> Result<(), ClientError> {
    match command {
        Command::Download {
            spec,
            target,
            status,
        } => {
            if let Some(status) = status.status() {
                config.status = status;
            }
            let ctx = Context::from_config(config);
            let spec = spec::parse(&spec)?;
            let path = download::download(&ctx, &spec, &target).await?;
            println!("{}", path.display());
        }
        Command::Install {
            spec,
            sudo,
            pg_config,
        } => {
            config.sudo = sudo.or(config.sudo);
            config.pg_config = pg_config.or(config.pg_config);
            let ctx = Context::from_config(config);
            build::install(&ctx, &spec::parse(&spec)?).await?;
        }
        Command::Check { spec, pg_config } => {
            config.pg_config = pg_config.or(config.pg_config);
            let ctx = Context::from_config(config);
            let output_dir = std::env::current_dir()?;
            build::check(&ctx, &spec::parse(&spec)?, &output_dir).await?;
        }
        Command::Load { spec, db } => {
            let ctx = Context::from_config(config);
            load::load(&ctx, &spec::parse(&spec)?, &db.into()).await?;
        }
        Command::Resolve { spec, status } => {
            if let Some(status) = status.status() {
                config.status = status;
            }
            let ctx = Context::from_config(config);
            let release = download::resolve_release(&ctx, &spec::parse(&spec)?).await?;
            println!("{}", release.version);
        }
    }

    Ok(())
}

fn report(err: ClientError) -> ExitCode {
    tracing::debug!("Command failed: {:?}", err);
    eprintln!("pgxn: {}", err);
    ExitCode::from(err.exit_code())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match effective_config(&cli) {
        Ok(config) => config,
        Err(err) => return Ok(report(err)),
    };

    let _guard = init_tracing(cli.verbose, config.log_file.as_deref())?;
    tracing::debug!("Using mirror {}", config.mirror);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    Ok(match runtime.block_on(run(cli.command, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    })
}
