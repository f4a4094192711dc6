//! # Opinion Digest
//!
//! Reads the lead pieces of the El País opinion section, translates their
//! headlines, counts the words that repeat across the translations and saves
//! the best-resolution image of each piece.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=4444 &
//! RAPID_API_KEY=... opinion_digest --headless
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Extraction**: drive a browser to the opinion section and read up to 5 articles
//! 2. **Images**: pick the widest candidate of each article's `srcset`
//! 3. **Translation**: translate every headline through the translation API
//! 4. **Analysis**: count the words repeated across the translated headlines
//! 5. **Output**: print the summary, save the images, optionally write JSON
//!
//! The browser session is opened once and closed on every exit path.

use std::error::Error;

use clap::Parser;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod browser;
mod cli;
mod error;
mod images;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use api::{LanguagePair, Translate, TranslationClient};
use browser::{Browser, SnapshotBrowser, WebDriverBrowser};
use cli::Cli;
use images::{IMAGES_DIR, ImageDownloader, ImageStore};
use models::Report;
use outputs::{json, text};
use scrapers::elpais::{OpinionScraper, SITE_ROOT, ScrapeTimings};
use utils::{ensure_writable_dir, load_dotenv};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("opinion_digest starting up");

    load_dotenv();
    let args = Cli::parse();
    debug!(
        snapshot_dir = ?args.snapshot_dir,
        headless = args.headless,
        json_output_dir = ?args.json_output_dir,
        "Parsed CLI arguments"
    );

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let translator = TranslationClient::new(http.clone(), args.translation_settings())?;
    let downloader = ImageDownloader::new(http, IMAGES_DIR);
    let timings = ScrapeTimings::default();
    info!(images_dir = %downloader.dir().display(), "Images will be saved locally");

    let outcome = match &args.snapshot_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Replaying saved pages");
            let browser = SnapshotBrowser::from_dir(SITE_ROOT, dir)?;
            run_session(browser, timings, &translator, &downloader).await
        }
        None => {
            let browser = match WebDriverBrowser::connect(&args.webdriver_url, args.headless).await {
                Ok(browser) => browser,
                Err(e) => {
                    error!(webdriver_url = %args.webdriver_url, error = %e, "Failed to create browser session");
                    return Err(e.into());
                }
            };
            run_session(browser, timings, &translator, &downloader).await
        }
    };

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Digest run failed");
            return Err(e.into());
        }
    };

    println!("{}", text::render(&report));

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_report(&report, dir).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = report.articles.len(),
        skipped = report.skipped.len(),
        "Execution complete"
    );
    Ok(())
}

/// Run the pipeline on `browser`, closing the session whatever the outcome.
///
/// A failure to close is logged; the pipeline's own result is returned.
#[instrument(level = "info", skip_all)]
async fn run_session<B, T, I>(
    browser: B,
    timings: ScrapeTimings,
    translator: &T,
    images: &I,
) -> error::Result<Report>
where
    B: Browser,
    T: Translate,
    I: ImageStore,
{
    let outcome = {
        let scraper = OpinionScraper::new(&browser, timings);
        pipeline::run(&scraper, translator, images, &LanguagePair::default()).await
    };

    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
    outcome
}
