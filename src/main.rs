use anyhow::{bail, Context, Result};
use bibfetch::config::{find_config_file, get_config, load_config, Config};
use bibfetch::{CitationResolver, Identifier, ResolvedRecord};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// bibfetch - Resolve DOIs, arXiv ids and PubMed ids to BibTeX
#[derive(Parser, Debug)]
#[command(name = "bibfetch")]
#[command(version = bibfetch::VERSION)]
#[command(author = "hongkongkiwi")]
#[command(about = "Resolve DOIs, arXiv ids and PubMed ids to BibTeX", long_about = None)]
struct Cli {
    /// Identifiers to resolve (e.g. 10.1000/xyz123, arXiv:1706.03762, PMC3531190)
    #[arg(required = true)]
    identifiers: Vec<String>,

    /// URI prefix prepended to every upstream request
    #[arg(long)]
    proxy: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bibfetch={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::debug!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        get_config().context("Failed to read configuration from environment")?
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = load_settings(&cli)?;
    let proxy = cli.proxy.clone().or_else(|| config.proxy.clone());

    let identifiers = cli
        .identifiers
        .iter()
        .map(|raw| raw.parse::<Identifier>().with_context(|| format!("Invalid identifier '{}'", raw)))
        .collect::<Result<Vec<_>>>()?;

    let resolver = CitationResolver::from_config(&config)?;
    let results = resolver.resolve_all(&identifiers, proxy.as_deref()).await;

    let records: Vec<ResolvedRecord> = cli
        .identifiers
        .iter()
        .zip(results)
        .map(|(raw, result)| match result {
            Ok(bibtex) => ResolvedRecord::success(raw.as_str(), bibtex),
            Err(e) => ResolvedRecord::error(raw.as_str(), e.to_string()),
        })
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let mut first = true;
        for record in &records {
            match (&record.bibtex, &record.error) {
                (Some(bibtex), _) => {
                    if !first {
                        println!();
                    }
                    first = false;
                    println!("{}", bibtex.trim_end());
                }
                (None, Some(error)) => eprintln!("{}: {}", record.identifier, error),
                (None, None) => {}
            }
        }
    }

    let failed = records.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        bail!("{} of {} identifiers could not be resolved", failed, records.len());
    }

    Ok(())
}
