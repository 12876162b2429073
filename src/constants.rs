//! Shared names and defaults used across extraction, reporting and configuration.

/// Sentinel written into any field that neither the page nor the fallback metadata could fill
pub const UNKNOWN: &str = "Unknown";

// Site family identifiers (used in logs, metrics and the `strategies` command)
pub const LISTING_FAMILY: &str = "listing";
pub const CODE_HOSTING_FAMILY: &str = "code_hosting";
pub const PORTFOLIO_FAMILY: &str = "portfolio";
pub const GENERIC_FAMILY: &str = "generic";
/// Recorded as the strategy when the page never arrived
pub const NO_CONTENT: &str = "none";

// Project types implied by a site family once its markup is recognised
pub const LISTING_PROJECT_TYPE: &str = "Automotive";
pub const CODE_HOSTING_PROJECT_TYPE: &str = "Software Development";
pub const PORTFOLIO_PROJECT_TYPE: &str = "Portfolio";

/// Report columns, in artifact order
pub const REPORT_COLUMNS: [&str; 8] = [
    "name",
    "location",
    "type",
    "contact_name",
    "mobile_number",
    "quality_score",
    "source_tags",
    "run_timestamp",
];

pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const METADATA_SHEET_NAME: &str = "Metadata";

/// Excel refuses cells holding more characters than this
pub const MAX_CELL_CHARS: usize = 32_767;

// Defaults mirrored by `config::Settings`
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_FILE: &str = "scraped_data.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Projects";
pub const DEFAULT_TARGETS_FILE: &str = "config/websites.json";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_COUNTRY_CODE: &str = "1";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Mobile number acceptance window (E.164 caps at 15 digits)
pub const MIN_PHONE_DIGITS: usize = 8;
pub const MAX_PHONE_DIGITS: usize = 15;
