use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use droplink::common::{config, format_size, load_config, DropConfig};
use droplink::download::{DiskSink, DownloadPhase, DownloadSession};
use droplink::output;
use droplink::upload::{FileDescriptor, UploadPhase, UploadSession};
use droplink::RETENTION_HOURS;

#[derive(Parser)]
#[command(name = "droplink")]
#[command(about = "Upload files to a drop service and share the link")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and print the share link
    Send {
        #[arg(required = true, help = "Paths of files to upload")]
        files: Vec<PathBuf>,
    },
    /// Fetch a shared batch by link or id and save it locally
    Fetch {
        #[arg(help = "Share link, service path, or bare transfer id")]
        link: String,
        #[arg(long, help = "Directory to save into (defaults to save_dir)")]
        out: Option<PathBuf>,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    match cli.command {
        Commands::Send { files } => send(files, &config).await,
        Commands::Fetch { link, out } => fetch(&link, out, &config).await,
        Commands::Config => {
            println!("# {}", config::config_path().display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn send(paths: Vec<PathBuf>, config: &DropConfig) -> Result<()> {
    // Fail fast before any bytes move.
    for path in &paths {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            std::process::exit(1);
        }
    }
    if paths.len() > config.max_files {
        eprintln!(
            "Error: Too many files: {} (limit is {})",
            paths.len(),
            config.max_files
        );
        std::process::exit(1);
    }

    let mut descriptors = Vec::with_capacity(paths.len());
    for path in &paths {
        descriptors.push(FileDescriptor::from_path(path).await?);
    }

    let mut session = UploadSession::new();
    session.add_files(descriptors);
    // Succeeding clears the batch, so keep the listing for the summary.
    let listing: Vec<(String, u64)> = session
        .files()
        .iter()
        .map(|f| (f.name.clone(), f.size_bytes))
        .collect();

    let client = config.build_client()?;
    let bar = output::transfer_bar();
    let watcher_bar = bar.clone();
    let mut rx = session.progress_receiver();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let percent = *rx.borrow();
            watcher_bar.set_position(percent.round() as u64);
        }
    });

    session.start_upload(&client, config).await;
    watcher.abort();
    bar.finish_and_clear();

    match session.phase() {
        UploadPhase::Succeeded(result) => {
            println!("{} Upload complete", style("✓").green().bold());
            println!();
            for (name, size) in &listing {
                println!("  {} ({})", name, format_size(*size));
            }
            println!();
            println!("  {}", style(&result.public_url).cyan().underlined());
            if config.show_qr {
                if let Ok(qr) = output::generate_qr(&result.public_url) {
                    println!("{qr}");
                }
            }
            println!(
                "{}",
                style(format!("Files are deleted after {RETENTION_HOURS} hours")).dim()
            );
            Ok(())
        }
        UploadPhase::Failed(err) => {
            eprintln!("{} Upload failed: {}", style("✗").red().bold(), err);
            std::process::exit(1);
        }
        phase => {
            eprintln!("Upload did not complete (state: {phase:?})");
            std::process::exit(1);
        }
    }
}

async fn fetch(link: &str, out: Option<PathBuf>, config: &DropConfig) -> Result<()> {
    let path = normalize_link(link);
    let mut session = DownloadSession::from_path(&path);
    let client = config.build_client()?;
    let sink = DiskSink::new(out.unwrap_or_else(|| config.save_dir.clone()));

    let spinner = output::spinner("Fetching...");
    session.start(&client, config, &sink).await;

    match session.phase() {
        DownloadPhase::Succeeded(file) => {
            output::finish_spinner_success(
                &spinner,
                &format!(
                    "Saved {} ({}) to {}",
                    file.filename,
                    format_size(file.size_bytes),
                    file.saved_to.display()
                ),
            );
            Ok(())
        }
        phase => {
            let message = match phase {
                DownloadPhase::Failed(err) => format!("Download failed: {err}"),
                _ => "Download did not complete".to_string(),
            };
            output::finish_spinner_error(&spinner, &message);
            std::process::exit(1);
        }
    }
}

/// Accepts a full share link, a service path, or a bare id; always yields
/// a path the download session can resolve.
fn normalize_link(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return match url::Url::parse(link) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => link.to_string(),
        };
    }
    if link.contains("/download/") {
        return link.to_string();
    }
    format!("/download/{}", link.trim_start_matches('/'))
}
