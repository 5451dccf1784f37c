use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use urkm::scraper::{DEFAULT_MAX_ATTEMPTS, WebScraper};
use urkm::types::{FallbackDate, OutputMode};
use urkm::urls::enumerate_listings;
use urkm::utils::CrawlWindow;
use urkm::writer::{self, BatchOptions};

#[derive(Parser)]
#[command(name = "urkm")]
#[command(about = "A mk.ru news archive scraper", long_about = None)]
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

    #[command(subcommand)]
    command: Option<Commands>,
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

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listing pages and append date;title rows to the output file
    Crawl {
        #[arg(long, default_value = "data", help = "Directory for the output file")]
        out_dir: PathBuf,

        #[arg(long, default_value = "news.csv", help = "Name of the output file")]
        file_name: String,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Crawl listings from this date onwards",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        start_date: Option<NaiveDate>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Crawl listings up to this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        end_date: Option<NaiveDate>,

        #[arg(long, help = "Crawl only the most recent N listing pages")]
        tail: Option<usize>,

        #[arg(long, help = "Maximum number of listing pages to crawl")]
        limit: Option<usize>,

        #[arg(
            long,
            value_parser = parse_mode,
            default_value = "append",
            help = "Output file mode"
        )]
        mode: OutputMode,

        #[arg(
            long,
            value_parser = parse_fallback,
            default_value = "placeholder",
            help = "Date label for pages without a date header"
        )]
        fallback: FallbackDate,

        #[arg(
            long,
            default_value_t = writer::DEFAULT_PAUSE_EVERY,
            help = "Sleep after every N processed pages (0 disables pacing)"
        )]
        pause_every: usize,

        #[arg(
            long,
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            help = "HTTP attempts per page before giving up"
        )]
        max_attempts: u32,
    },
    /// Print the listing URLs the crawler would visit, without fetching
    Urls {
        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "List URLs from this date onwards",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        start_date: Option<NaiveDate>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "List URLs up to this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        end_date: Option<NaiveDate>,

        #[arg(long, help = "Only the most recent N URLs")]
        tail: Option<usize>,

        #[arg(long, help = "Maximum number of URLs to print")]
        limit: Option<usize>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Fetch a single listing page and print its headlines
    Page {
        #[arg(help = "URL or site path of the listing page to fetch")]
        url: String,

        #[arg(
            long,
            value_parser = parse_fallback,
            default_value = "from-url",
            help = "Date label for pages without a date header"
        )]
        fallback: FallbackDate,

        #[arg(
            long,
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            help = "HTTP attempts before giving up"
        )]
        max_attempts: u32,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_mode(s: &str) -> Result<OutputMode, String> {
    OutputMode::from_str(s).map_err(|e| e.to_string())
}

fn parse_fallback(s: &str) -> Result<FallbackDate, String> {
    FallbackDate::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn validated(window: CrawlWindow) -> CrawlWindow {
    window.validate().unwrap_or_else(|e| {
        log::error!("Invalid args: {e}");
        process::exit(1);
    })
}

async fn run_crawl(scraper: &WebScraper, window: CrawlWindow, options: BatchOptions) {
    let today = Local::now().date_naive();
    let pages = window.apply(enumerate_listings(today));

    log::info!(
        "Crawling {} listing pages into {}",
        pages.len(),
        options.output_dir.join(&options.file_name).display()
    );

    let stats = writer::run(scraper, &options, &pages)
        .await
        .unwrap_or_else(|e| {
            log::error!("Crawl failed: {}", e);
            process::exit(1);
        });

    print!("{}", stats);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    match cli.command {
        // Bare invocation: full historical crawl with every default.
        None => run_crawl(&scraper, CrawlWindow::default(), BatchOptions::default()).await,

        Some(Commands::Crawl {
            out_dir,
            file_name,
            start_date,
            end_date,
            tail,
            limit,
            mode,
            fallback,
            pause_every,
            max_attempts,
        }) => {
            let window = validated(CrawlWindow {
                start_date,
                end_date,
                tail,
                limit,
            });

            let options = BatchOptions {
                output_dir: out_dir,
                file_name,
                mode,
                fallback,
                pause_every,
                max_attempts,
                ..BatchOptions::default()
            };

            run_crawl(&scraper, window, options).await;
        }

        Some(Commands::Urls {
            start_date,
            end_date,
            tail,
            limit,
            format,
        }) => {
            let window = validated(CrawlWindow {
                start_date,
                end_date,
                tail,
                limit,
            });

            let today = Local::now().date_naive();
            let pages = window.apply(enumerate_listings(today));

            match format {
                OutputFormat::Json => serialize_json(&pages),
                OutputFormat::Text => {
                    for page in &pages {
                        println!("{}", page);
                    }
                    println!("\n{} listing page(s)", pages.len());
                }
            }
        }

        Some(Commands::Page {
            url,
            fallback,
            max_attempts,
            format,
        }) => {
            let headlines = scraper
                .fetch_listing(&url, fallback, max_attempts)
                .await
                .unwrap_or_else(|e| {
                    log::error!("Error fetching listing: {}", e);
                    process::exit(1);
                });

            match format {
                OutputFormat::Json => serialize_json(&headlines),
                OutputFormat::Text => {
                    if headlines.is_empty() {
                        println!("No headlines found.");
                    } else {
                        for (i, headline) in headlines.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, headline);
                        }
                    }
                }
            }
        }
    }
}
