mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use filestore_core::{Context, Filestore, LocalConfig, LocalFilestore};
use output::{CODE_ERROR, CODE_NOT_FOUND, CODE_OK, FileStat, Removed, Reporter, Stored};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// filestore - A path-addressed file store
#[derive(Parser)]
#[command(name = "filestore")]
#[command(about = "Path-addressed file store with crash-safe writes", long_about = None)]
#[command(version)]
struct Cli {
    /// Store root directory (defaults to FILESTORE_ROOT env var, then the config file, then the working directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// TOML config file with store options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Permission bits for new files, in octal (e.g. 644)
    #[arg(long, global = true, value_parser = parse_octal)]
    file_perm: Option<u32>,

    /// Permission bits for new directories, in octal (e.g. 755)
    #[arg(long, global = true, value_parser = parse_octal)]
    dir_perm: Option<u32>,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file (use - to read from stdin)
    Put {
        /// Source file, or - for stdin
        src: String,

        /// Destination path inside the store
        dest: String,
    },

    /// Write a stored file to stdout
    Cat {
        /// Path inside the store
        path: String,
    },

    /// Remove a stored file
    Rm {
        /// Path inside the store
        path: String,
    },

    /// Show size and location of a stored file
    Stat {
        /// Path inside the store
        path: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let out = Reporter::new(cli.json);

    match run(cli, &out) {
        Ok(()) => ExitCode::from(CODE_OK),
        Err(err) => {
            let code = result_code(&err);
            out.fail(&err, code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli, out: &Reporter) -> Result<()> {
    let config = build_config(&cli)?;
    let store = LocalFilestore::new(config).context("Failed to open store")?;
    debug!(root = %store.root().display(), "using store");

    let ctx = Context::background();
    let result = match &cli.command {
        Commands::Put { src, dest } => cmd_put(&store, &ctx, out, src, dest),
        Commands::Cat { path } => cmd_cat(&store, &ctx, out, path),
        Commands::Rm { path } => cmd_rm(&store, &ctx, out, path),
        Commands::Stat { path } => cmd_stat(&store, &ctx, out, path),
    };

    store.close().context("Failed to close store")?;
    result
}

/// Merge config sources: flags > FILESTORE_ROOT > config file > defaults.
fn build_config(cli: &Cli) -> Result<LocalConfig> {
    let mut config = match &cli.config {
        Some(path) => LocalConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LocalConfig::default(),
    };

    let root = cli
        .root
        .clone()
        .or_else(|| std::env::var("FILESTORE_ROOT").ok().map(PathBuf::from));
    if let Some(root) = root {
        config = config.with_root(root);
    }
    if let Some(perm) = cli.file_perm {
        config = config.with_file_perm(perm);
    }
    if let Some(perm) = cli.dir_perm {
        config = config.with_dir_perm(perm);
    }

    Ok(config)
}

fn parse_octal(value: &str) -> std::result::Result<u32, String> {
    let digits = value.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode '{}': {}", value, e))
}

/// Map an error to the process exit code.
fn result_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<filestore_core::Error>() {
        Some(e) if e.is_not_found() => CODE_NOT_FOUND,
        _ => CODE_ERROR,
    }
}

fn cmd_put(
    store: &LocalFilestore,
    ctx: &Context,
    out: &Reporter,
    src: &str,
    dest: &str,
) -> Result<()> {
    if src == "-" {
        if atty::is(atty::Stream::Stdin) {
            anyhow::bail!("Refusing to read from a terminal; pipe data into stdin");
        }
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        store
            .insert(ctx, &mut reader, dest)
            .with_context(|| format!("Failed to store stdin at {}", dest))?;
    } else {
        let mut file =
            File::open(src).with_context(|| format!("Failed to open source file {}", src))?;
        store
            .insert(ctx, &mut file, dest)
            .with_context(|| format!("Failed to store {} at {}", src, dest))?;
    }

    out.emit(&Stored::new(src, dest))
}

fn cmd_cat(store: &LocalFilestore, ctx: &Context, out: &Reporter, path: &str) -> Result<()> {
    if out.is_json() {
        anyhow::bail!("cat writes raw content and does not support --json");
    }

    let mut file = store
        .get(ctx, path)
        .with_context(|| format!("Failed to open {}", path))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    io::copy(&mut file, &mut handle).with_context(|| format!("Failed to read {}", path))?;

    file.close()?;
    Ok(())
}

fn cmd_rm(store: &LocalFilestore, ctx: &Context, out: &Reporter, path: &str) -> Result<()> {
    store
        .remove(ctx, path)
        .with_context(|| format!("Failed to remove {}", path))?;

    out.emit(&Removed::new(path))
}

fn cmd_stat(store: &LocalFilestore, ctx: &Context, out: &Reporter, path: &str) -> Result<()> {
    let location = store.resolve(path)?;
    let mut file = store
        .get(ctx, path)
        .with_context(|| format!("Failed to open {}", path))?;

    // Size of the content this handle sees, not of whatever the path holds
    // by the time we print.
    let size = match file.size() {
        Some(size) => size,
        None => io::copy(&mut file, &mut io::sink())
            .with_context(|| format!("Failed to read {}", path))?,
    };
    file.close()?;

    out.emit(&FileStat::new(path, size, location.display().to_string()))
}
