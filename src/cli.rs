//! Command-line interface definitions for the opinion digest.
//!
//! The digest itself takes no options: languages, endpoint, settle delay,
//! wait budget and image folder are fixed. The translation API key comes
//! from `RAPID_API_KEY` (a `.env` file works too). The remaining options only
//! choose where the pages come from and whether a JSON copy of the report is
//! kept.

use std::path::PathBuf;

use clap::Parser;

use crate::api::TranslationSettings;

/// Command-line arguments for the opinion digest.
///
/// # Examples
///
/// ```sh
/// # Live run against a local chromedriver
/// RAPID_API_KEY=... opinion_digest
///
/// # Headless, keeping a JSON report
/// opinion_digest --headless --json-output-dir ./reports
///
/// # Replay saved pages instead of driving a browser
/// opinion_digest --snapshot-dir ./snapshots/2025-05-06
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// RapidAPI key for the translation service
    #[arg(long, env = "RAPID_API_KEY", hide_env_values = true)]
    pub rapidapi_key: String,

    /// WebDriver server to open the browser session on
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Read saved pages from this directory instead of driving a browser
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// Output directory for the JSON report (no report file when omitted)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}

impl Cli {
    pub fn translation_settings(&self) -> TranslationSettings {
        TranslationSettings::new(&self.rapidapi_key)
    }
}
