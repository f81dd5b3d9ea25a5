use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use volby::scraper::ScraperError;
use volby::{Dataset, ElectionScraper, Fetch, HttpFetcher};

#[derive(Parser)]
#[command(name = "volby")]
#[command(about = "A volby.cz district results scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        default_value = volby::BASE_URL,
        global = true,
        help = "Results root of the election to scrape"
    )]
    base_url: String,

    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 30,
        global = true,
        help = "HTTP request timeout",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every municipality of a district into one table
    Scrape {
        #[arg(help = "District results URL, one of those printed by `volby districts`")]
        url: String,

        #[arg(
            help = "Output file name without extension",
            value_parser = parse_output_name
        )]
        output_name: String,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "csv",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(
            long,
            help = "Skip municipalities that fail to download or parse instead of aborting"
        )]
        keep_going: bool,
    },
    /// List the district URLs accepted by `scrape`
    Districts,
}

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
// Room is left for the longest extension appended on save.
const MAX_NAME_LEN: usize = 255 - ".json".len();

/// Accepts names that are valid file names on every common platform.
fn parse_output_name(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("File name must not be empty".to_string());
    }
    if s.len() > MAX_NAME_LEN {
        return Err(format!("File name is longer than {} bytes", MAX_NAME_LEN));
    }
    if let Some(c) = s
        .chars()
        .find(|c| INVALID_CHARS.contains(c) || c.is_control())
    {
        return Err(format!("File name contains invalid character {:?}", c));
    }
    if s == "." || s == ".." {
        return Err(format!("'{}' is not a file name", s));
    }
    if s.ends_with(' ') || s.ends_with('.') {
        return Err("File name must not end with a space or a period".to_string());
    }
    let stem = s.split('.').next().unwrap_or(s);
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem.trim_end()))
    {
        return Err(format!("'{}' is a reserved file name", s));
    }
    Ok(s.to_string())
}

fn scrape<F: Fetch>(
    scraper: &ElectionScraper<F>,
    url: &str,
    keep_going: bool,
) -> Result<Dataset, ScraperError> {
    let district = scraper.validate_district_url(url)?;
    log::info!("Downloading data from selected URL: {}", district);

    if keep_going {
        scraper.scrape_district_skipping_failures(&district)
    } else {
        scraper.scrape_district(&district)
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let timeout = Duration::from_secs(cli.timeout);
    let fetcher = HttpFetcher::with_timeout(timeout).unwrap_or_else(|e| {
        log::error!("Error creating HTTP client: {}", e);
        process::exit(1);
    });
    let scraper = ElectionScraper::with_fetcher(fetcher, cli.base_url);

    match cli.command {
        Commands::Scrape {
            url,
            output_name,
            format,
            keep_going,
        } => {
            let dataset = scrape(&scraper, &url, keep_going).unwrap_or_else(|e| {
                log::error!("Error scraping {}: {}", url, e);
                process::exit(1);
            });

            if dataset.is_empty() {
                log::warn!("No municipalities found, output will be empty");
            }

            let file_name = format!("{}.{}", output_name, format.extension());
            let saved = match format {
                OutputFormat::Csv => dataset.save_csv(&file_name),
                OutputFormat::Json => dataset.save_json(&file_name),
            };
            if let Err(e) = saved {
                log::error!("Error writing {}: {}", file_name, e);
                process::exit(1);
            }

            println!("Saved {} municipalities to {}", dataset.len(), file_name);
        }

        Commands::Districts => {
            let districts = scraper.list_districts().unwrap_or_else(|e| {
                log::error!("Error fetching district list: {}", e);
                process::exit(1);
            });

            if districts.is_empty() {
                println!("No districts to display.");
            } else {
                for (i, district) in districts.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, district);
                }
            }
        }
    }
}
