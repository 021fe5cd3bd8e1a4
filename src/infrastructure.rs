//! Infrastructure layer for database access, HTTP fetching, parsing and configuration
//!
//! Concrete adapters behind the domain traits plus the ambient services
//! (logging, layered configuration) used by the binary.

pub mod config;
pub mod database_connection;
pub mod logging;
pub mod offer_repository;
pub mod parsing;
pub mod parsing_error;
pub mod scrape_error;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, ConfigLoader};
pub use database_connection::DatabaseConnection;
pub use logging::{LoggingGuard, init_logging, init_logging_with_config};
pub use offer_repository::SqliteOfferRepository;
pub use parsing::{OfferListParser, ParseContext, ParsingError, ParsingResult};
pub use scrape_error::{ScrapeError, ScrapeResult};
pub use simple_http_client::{HttpClient, HttpClientConfig, PageFetcher};
