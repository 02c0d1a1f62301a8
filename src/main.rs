use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use refugee_flows::cache::ResolutionCache;
use refugee_flows::candidates::{pattern_label, CandidateGenerator, CandidateSource};
use refugee_flows::cli::{CacheCommands, Cli, Commands};
use refugee_flows::config::Config;
use refugee_flows::driver;
use refugee_flows::fetcher::HttpFetcher;
use refugee_flows::input;
use refugee_flows::models::{language_name, Language, LANGUAGES};
use refugee_flows::resolver::{DocumentLayout, Resolver};

#[derive(Serialize)]
struct CacheEntry<'a> {
    date: String,
    language: Language,
    filename: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "refugee_flows=info");
    }

    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Cannot create log directory: {}", config.log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "refugee-flows.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    config.validate()?;

    match &cli.command {
        Commands::Fetch { from, to } => {
            let today = chrono::Local::now().date_naive();
            let range = {
                let stdin = std::io::stdin();
                let mut input = stdin.lock();
                let mut output = std::io::stdout();
                input::prompt_date_range(&mut input, &mut output, today, *from, *to)?
            };

            let fetcher = HttpFetcher::new(&config.http)?;
            let generator = CandidateGenerator::new(config.base_url.clone());
            let cache = ResolutionCache::open(&config.metadata_dir);
            let mut resolver = Resolver::new(
                fetcher,
                generator,
                cache,
                DocumentLayout::new(&config.output_dir),
                config.retry_policy(),
            );

            let summary = tokio::select! {
                summary = driver::run_range(&mut resolver, range) => Some(summary),
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, saving resolutions found so far");
                    None
                }
            };

            if let Err(e) = resolver.cache().flush() {
                warn!("Failed to save resolution cache: {}", e);
            }

            if let Some(summary) = summary {
                println!(
                    "Resolved {} of {} days ({} from cache, {} discovered) with {} requests",
                    summary.resolved(),
                    range.len(),
                    summary.from_cache,
                    summary.discovered,
                    summary.attempts
                );
                if !summary.unresolved.is_empty() {
                    println!("No document found for:");
                    for date in &summary.unresolved {
                        println!("  {}", date);
                    }
                }
            }
        }

        Commands::Candidates { date, language } => {
            let languages = match language {
                Some(language) => vec![Commands::parse_language(language)?],
                None => LANGUAGES.to_vec(),
            };
            let generator = CandidateGenerator::new(config.base_url.clone());

            for language in languages {
                for candidate in generator.candidates(*date, language) {
                    println!(
                        "{:<8} {:<11} {}",
                        language_name(language),
                        pattern_label(&candidate.pattern),
                        candidate.url
                    );
                }
            }
        }

        Commands::Cache { subcommand } => {
            let cache = ResolutionCache::load(&config.metadata_dir)?;
            match subcommand {
                CacheCommands::Stats => {
                    let stats = cache.stats();
                    println!("Cached resolutions: {}", stats.total);
                    println!("  english: {}", stats.english);
                    println!("  greek:   {}", stats.greek);
                    if let (Some(first), Some(last)) = (stats.first, stats.last) {
                        println!("Dates: {} to {}", first, last);
                    }
                }
                CacheCommands::List { json } => {
                    if *json {
                        let entries: Vec<CacheEntry> = cache
                            .iter()
                            .map(|(date, record)| CacheEntry {
                                date: date.to_string(),
                                language: record.language,
                                filename: &record.filename,
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    } else {
                        for (date, record) in cache.iter() {
                            println!(
                                "{} {:<8} {}",
                                date,
                                language_name(record.language),
                                record.filename
                            );
                        }
                    }
                }
            }
        }
    }

    info!("Done");
    Ok(())
}
