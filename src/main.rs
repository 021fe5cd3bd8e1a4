use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use offer_scraper_lib::application::{
    FileReportSink, LogReportSink, PipelineOptions, ReportSink, ScrapePipeline, StatisticsService,
};
use offer_scraper_lib::domain::OfferStore;
use offer_scraper_lib::infrastructure::{
    ConfigLoader, DatabaseConnection, HttpClient, HttpClientConfig, SqliteOfferRepository,
    init_logging_with_config,
};

#[derive(Parser)]
#[command(name = "offer-scraper", version, about = "Scrape job offers from configured sites")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, env = "OFFER_SCRAPER_CONFIG", default_value = ConfigLoader::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every site, store new offers and deliver the report (default)
    Run,
    /// Delete all stored offers, then run
    Reset,
    /// Print every stored offer
    List,
    /// Print position and salary statistics as JSON
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new(&cli.config)?;
    let config = loader.config().clone();
    let _log_guard = init_logging_with_config(&config.logging)?;

    let db = DatabaseConnection::with_config(&config.database).await?;
    db.migrate().await?;
    let store: Arc<dyn OfferStore> = Arc::new(SqliteOfferRepository::new(db.pool().clone()));

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&loader, Arc::clone(&store)).await?,
        Command::Reset => {
            warn!("Resetting offer store before the run");
            store.reset().await?;
            run(&loader, Arc::clone(&store)).await?;
        }
        Command::List => {
            for offer in store.read_all().await? {
                println!("{offer}");
            }
        }
        Command::Stats => {
            let service = StatisticsService::new(Arc::clone(&store));
            let stats = serde_json::json!({
                "total_offers": store.count().await?,
                "position_types": service.position_type_counts().await?,
                "salary": service.salary_statistics().await?,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

async fn run(loader: &ConfigLoader, store: Arc<dyn OfferStore>) -> Result<()> {
    let config = loader.config();

    let fetcher = HttpClient::with_config(HttpClientConfig::from_scraper_config(&config.scraper))
        .context("Failed to build HTTP client")?;
    let sink: Arc<dyn ReportSink> = match &config.notification.report_dir {
        Some(dir) => Arc::new(FileReportSink::new(dir)),
        None => Arc::new(LogReportSink),
    };

    let pipeline = ScrapePipeline::new(fetcher, store, sink, PipelineOptions::from_config(config));
    let report = pipeline.run(loader.get_sites_config()).await?;

    info!(
        "Run {} completed: {} sites, {} offers scraped, {} new",
        report.run_id,
        report.sites,
        report.offers_scraped,
        report.new_offers.len()
    );
    if !report.failed_sites.is_empty() {
        warn!("Sites with errors: {}", report.failed_sites.join(", "));
    }

    Ok(())
}
