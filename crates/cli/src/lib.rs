use anyhow::{Context as AnyhowContext, Result};
use app::ReviewApp;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use zoomer_annotations::{FlushConfig, FlushScheduler};
use zoomer_config::{flush_interval, ConfigSource};
use zoomer_indexer::IndexStats;

mod app;
mod bind;
mod http_api;
mod render;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "zoomer")]
#[command(about = "Review a source tree segment by segment", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a project and serve the review page over HTTP
    Serve(ServeArgs),

    /// Index a project and print the file list with stats
    Index(IndexArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Project root to review
    #[arg(long)]
    path: PathBuf,

    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,

    /// Seconds between annotation flushes (env: ZOOMER_FLUSH_INTERVAL_SECS, default 30)
    #[arg(long)]
    flush_interval_secs: Option<u64>,
}

#[derive(Args)]
struct IndexArgs {
    /// Project root to index
    #[arg(long)]
    path: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct IndexOutput<'a> {
    root: String,
    config: &'a std::path::Path,
    bootstrapped: bool,
    skipped_patterns: usize,
    files: &'a [String],
    stats: &'a IndexStats,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    log::debug!("zoomer v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve(args) => run_serve(args).await?,
        Commands::Index(args) => run_index(args).await?,
    }

    Ok(())
}

async fn run_index(args: IndexArgs) -> Result<()> {
    let app = ReviewApp::open(&args.path)
        .await
        .context("Failed to load project")?;
    let index = app.index();

    if args.json {
        let output = IndexOutput {
            root: app.root().display().to_string(),
            config: app.config_source().path(),
            bootstrapped: matches!(app.config_source(), ConfigSource::Bootstrapped(_)),
            skipped_patterns: app.pattern_warnings().len(),
            files: index.list_files(),
            stats: index.stats(),
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    for path in index.list_files() {
        print_stdout(path)?;
    }
    let stats = index.stats();
    eprintln!(
        "Indexed {} files, {} lines, {} segments in {}ms",
        stats.files, stats.total_lines, stats.segments, stats.time_ms
    );
    if stats.legacy_encoded > 0 {
        eprintln!("{} files decoded as Windows-1252", stats.legacy_encoded);
    }
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let target = bind::resolve_bind_target(&args.bind, args.public).await?;

    let app = Arc::new(
        ReviewApp::open(&args.path)
            .await
            .context("Failed to load project")?,
    );
    if let ConfigSource::Bootstrapped(path) = app.config_source() {
        print_stdout(&format!(
            "Wrote default config to {}; edit it and restart to customize",
            path.display()
        ))?;
    }

    let listener = tokio::net::TcpListener::bind(target.addr)
        .await
        .with_context(|| format!("Failed to bind {}", target.addr))?;
    let local_addr = listener.local_addr()?;

    let scheduler = FlushScheduler::start(
        app.store().clone(),
        app.snapshot_path().to_path_buf(),
        FlushConfig {
            interval: flush_interval(args.flush_interval_secs),
        },
    );
    let state = Arc::new(http_api::HttpState {
        app: app.clone(),
        flush_health: scheduler.subscribe(),
    });

    let base_url = format!("http://{local_addr}");
    print_stdout(&format!(
        "Serving {} ({} files): {base_url}/",
        app.config().project_name,
        app.index().len()
    ))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    if args.public {
        let addrs = target
            .resolved
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }

    let served = axum::serve(listener, http_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let health = scheduler.shutdown().await;
    if let Some(err) = &health.last_error {
        log::error!("Final annotation flush failed: {err}");
    } else {
        log::info!("Annotations saved ({} writes)", health.writes);
    }

    served.context("HTTP server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
