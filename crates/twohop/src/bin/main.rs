//! Twohop CLI

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twohop::{FsVault, Report, SortOrder, TwohopSession, VaultHost, collect_previews, load_settings};

/// Show forward, backward, two-hop and tag links for a note
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the vault directory
    #[arg(long, env = "TWOHOP_VAULT")]
    vault: PathBuf,

    /// Note to inspect, as a vault path or link text
    note: String,

    /// Settings file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ordering of every list
    #[arg(short, long)]
    sort_order: Option<SortOrder>,

    /// Exclude an exact path or a `dir/` prefix (repeatable)
    #[arg(short, long = "exclude")]
    exclude: Vec<String>,

    /// Keep two-hop members that are already listed elsewhere
    #[arg(long)]
    no_dedup: bool,

    /// Never use images as previews
    #[arg(long)]
    no_images: bool,

    /// Include previews of every listed note
    #[arg(short, long)]
    previews: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the report
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut settings = load_settings(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(order) = args.sort_order {
        settings.sort_order = order;
    }
    settings.exclude_paths.extend(args.exclude);
    if args.no_dedup {
        settings.enable_duplicate_removal = false;
    }
    if args.no_images {
        settings.show_image = false;
    }
    settings.normalize();
    settings.validate()?;

    let vault = FsVault::open(&args.vault)
        .await
        .with_context(|| format!("Failed to open vault {}", args.vault.display()))?;

    let note = if vault.contains(&args.note) {
        args.note.clone()
    } else {
        match vault.resolve_link(&args.note, "") {
            Some(path) => path,
            None => bail!("Note not found in vault: {}", args.note),
        }
    };

    let mut session = TwohopSession::new(vault, settings);
    let rendered = session
        .on_file_open(&note)
        .await
        .context("Two-hop links are disabled")?;

    let previews = if args.previews {
        collect_previews(&session, &rendered).await
    } else {
        BTreeMap::new()
    };
    let report = Report::new(rendered, previews);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", report.to_text()),
    }
    Ok(())
}
