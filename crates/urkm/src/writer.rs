use std::fs::{self, File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scraper::{DEFAULT_MAX_ATTEMPTS, ScraperError, WebScraper};
use crate::types::{FallbackDate, Headline, ListingPage, OutputMode};

pub const DELIMITER: char = ';';
pub const HEADER_ROW: &str = "date;title";
pub const DEFAULT_PAUSE_EVERY: usize = 20;

const PACING_PAUSE: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriterError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        WriterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub file_name: String,
    pub mode: OutputMode,
    pub fallback: FallbackDate,
    /// Sleep after every this many processed pages. Zero disables pacing.
    pub pause_every: usize,
    pub pause: Duration,
    pub max_attempts: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            output_dir: PathBuf::from("data"),
            file_name: "news.csv".to_string(),
            mode: OutputMode::Append,
            fallback: FallbackDate::Placeholder,
            pause_every: DEFAULT_PAUSE_EVERY,
            pause: PACING_PAUSE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub urls_processed: usize,
    pub urls_failed: usize,
    pub rows_written: usize,
    pub pauses: usize,
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nCrawl summary:")?;
        writeln!(f, "  Listings processed: {}", self.urls_processed)?;
        writeln!(f, "  Listings failed:    {}", self.urls_failed)?;
        writeln!(f, "  Rows written:       {}", self.rows_written)?;
        writeln!(f, "  Pauses taken:       {}", self.pauses)
    }
}

/// Crawl `pages` with the given scraper and append the extracted rows to
/// the configured output file.
pub async fn run(
    scraper: &WebScraper,
    options: &BatchOptions,
    pages: &[ListingPage],
) -> Result<BatchStats, WriterError> {
    let fallback = options.fallback;
    let max_attempts = options.max_attempts;

    write_batch(options, pages, |url| async move {
        scraper.fetch_listing(&url, fallback, max_attempts).await
    })
    .await
}

/// Drive `fetch` over every page in order and write the rows out.
///
/// Pages whose fetch fails are logged and skipped; the rest of the batch
/// continues. I/O failures on the output file abort the whole run. The
/// output file is re-opened in append mode for each page's rows, so a
/// killed run keeps everything written so far.
pub async fn write_batch<F, Fut>(
    options: &BatchOptions,
    pages: &[ListingPage],
    mut fetch: F,
) -> Result<BatchStats, WriterError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<Headline>, ScraperError>>,
{
    fs::create_dir_all(&options.output_dir)
        .map_err(|e| WriterError::io(&options.output_dir, e))?;
    let file_path = options.output_dir.join(&options.file_name);

    if options.mode == OutputMode::Truncate {
        let mut file = File::create(&file_path).map_err(|e| WriterError::io(&file_path, e))?;
        writeln!(file, "{}", HEADER_ROW).map_err(|e| WriterError::io(&file_path, e))?;
    }

    let mut stats = BatchStats::default();
    let total = pages.len();

    for page in pages {
        match fetch(page.url.clone()).await {
            Ok(headlines) => {
                append_rows(&file_path, &headlines)?;
                stats.rows_written += headlines.len();
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", page.url, e);
                stats.urls_failed += 1;
            }
        }

        stats.urls_processed += 1;
        log::info!("Processed {} of {} listings", stats.urls_processed, total);

        if options.pause_every > 0 && stats.urls_processed % options.pause_every == 0 {
            tokio::time::sleep(options.pause).await;
            stats.pauses += 1;
        }
    }

    Ok(stats)
}

fn append_rows(file_path: &Path, headlines: &[Headline]) -> Result<(), WriterError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|e| WriterError::io(file_path, e))?;

    for headline in headlines {
        writeln!(
            file,
            "{}{}{}",
            headline.date_label, DELIMITER, headline.title
        )
        .map_err(|e| WriterError::io(file_path, e))?;
    }

    Ok(())
}
