//! Main entry point for the mzrange CLI application.
//!
//! Resolves a repository (Zenodo record or local directory), locates one scan
//! through the file's offset index and writes that scan's XML out.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mzrange::{
    Cli, Error, HttpRangeFetcher, IndexingMode, LocalCatalog, LocalFileFetcher, RangeFetch,
    Record, RecordId, RepositorySession, RetryingFetcher, SessionConfig, Usi, ZenodoCatalog,
};

/// What the command line asks for, whichever way it was spelled.
struct Target {
    repository_id: String,
    file: Option<String>,
    scan: Option<RecordId>,
}

impl Target {
    fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.is_usi() {
            let usi: Usi = cli.source.parse()?;
            return Ok(Self {
                repository_id: usi.repository_id,
                file: Some(usi.container),
                scan: Some(usi.scan),
            });
        }

        let scan = cli.scan.as_deref().map(str::parse::<RecordId>).transpose()?;
        Ok(Self {
            repository_id: cli.source.clone(),
            file: cli.file.clone(),
            scan,
        })
    }
}

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let indexing = if cli.full {
        IndexingMode::Full
    } else {
        IndexingMode::Targeted
    };
    let config = SessionConfig::default()
        .with_window_size(cli.window)
        .with_indexing(indexing)
        .with_request_timeout(Duration::from_secs(cli.timeout));
    let target = Target::from_cli(&cli)?;

    if !cli.is_usi() && cli.is_local_dir() {
        // Local directory: same pipeline, reads straight from disk
        let catalog = LocalCatalog::new(&cli.source);
        let fetcher = Arc::new(LocalFileFetcher::new());
        let session =
            RepositorySession::open(&catalog, &target.repository_id, fetcher, config).await?;
        run(&session, &cli, &target).await?;
    } else {
        // Remote repository via HTTP Range requests
        let catalog = ZenodoCatalog::new(config.request_timeout)?;
        let http = Arc::new(HttpRangeFetcher::new(config.request_timeout)?);
        let fetcher = Arc::new(RetryingFetcher::new(http.clone(), cli.retries));
        let session =
            RepositorySession::open(&catalog, &target.repository_id, fetcher, config).await?;
        run(&session, &cli, &target).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(http.transferred_bytes())
            );
        }
    }

    Ok(())
}

/// List containers, or fetch and write one scan.
async fn run<F: RangeFetch>(session: &RepositorySession<F>, cli: &Cli, target: &Target) -> Result<()> {
    if cli.list {
        return list_files(session);
    }

    let file = match &target.file {
        Some(file) => file.clone(),
        None => {
            let mut containers = session.containers();
            match (containers.next(), containers.next()) {
                (Some(only), None) => only.name.clone(),
                (None, _) => bail!("no mzML files in {}", session.repository_id()),
                _ => bail!("several mzML files available, choose one with -f (see -l)"),
            }
        }
    };
    let Some(scan) = target.scan else {
        bail!("no scan number given");
    };

    let record = match session.fetch_record(&file, scan).await {
        Err(Error::InsufficientCoverage { .. }) => {
            // The cached index cannot bound this scan; pay for the whole trailer.
            warn!(file = %file, scan = scan.get(), "rebuilding full index");
            session.build_full_index(&file).await?;
            session.fetch_record(&file, scan).await?
        }
        result => result?,
    };

    if !cli.is_quiet() {
        eprintln!(
            "scan {} of {}: bytes {}-{} ({})",
            record.span.id(),
            record.container,
            record.span.start(),
            record.span.end(),
            format_size(record.bytes.len() as u64)
        );
    }

    write_record(&record, cli).await
}

/// List container files with their sizes.
fn list_files<F: RangeFetch>(session: &RepositorySession<F>) -> Result<()> {
    println!("{:>12}  Name", "Size");
    println!("{}", "-".repeat(40));

    let mut total = 0u64;
    let mut count = 0usize;
    for container in session.containers() {
        println!("{:>12}  {}", format_size(container.size), container.name);
        total += container.size;
        count += 1;
    }

    println!("{}", "-".repeat(40));
    println!("{:>12}  {} files", format_size(total), count);
    Ok(())
}

/// Write the scan to stdout (`-p`) or to `<stem>.scan<N>.mzML`.
async fn write_record(record: &Record, cli: &Cli) -> Result<()> {
    if cli.pipe {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&record.bytes).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let stem = Path::new(&record.container)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| record.container.clone());
    let file_name = format!("{}.scan{}.mzML", stem, record.span.id());
    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    if output_path.exists() && cli.never_overwrite {
        if !cli.is_quiet() {
            println!("  skipping: {}", output_path.display());
        }
        return Ok(());
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&output_path, &record.bytes)
        .await
        .with_context(|| format!("writing {}", output_path.display()))?;

    if !cli.is_quiet() {
        println!("    saving: {}", output_path.display());
    }
    Ok(())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
