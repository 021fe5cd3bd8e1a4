//! Application layer
//!
//! Use cases built on the domain types and infrastructure adapters: scraping
//! sites, running the end-to-end pipeline, reporting and statistics.

pub mod notification;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod site_scraper;
pub mod statistics;

pub use notification::{DeliveryResult, FileReportSink, LogReportSink, ReportSink};
pub use orchestrator::{ScrapeOrchestrator, ScrapeRun};
pub use pipeline::{PipelineOptions, PipelineReport, ScrapePipeline};
pub use report::{EmailFormatter, Report};
pub use site_scraper::{SiteOutcome, SiteReport, SiteScraper};
pub use statistics::{PositionKeywords, SalaryStatistics, StatisticsService};
