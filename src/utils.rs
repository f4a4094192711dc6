//! Helpers for edition naming, log-friendly strings, environment files and
//! output directories.

use std::error::Error;
use std::path::Path;

use chrono::{NaiveTime, Timelike};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Edition name for a local time of day.
///
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn edition_for(time: NaiveTime) -> &'static str {
    match time.hour() {
        0..8 => "morning",
        8..16 => "afternoon",
        _ => "evening",
    }
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest character boundary
/// below `max` and suffixed with `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Load environment variables from `.env.local` or `.env`, first found wins.
///
/// Variables already present in the process environment are left untouched.
pub fn load_dotenv() {
    for env_file in [".env.local", ".env"] {
        if !Path::new(env_file).exists() {
            continue;
        }
        match dotenv::from_filename(env_file) {
            Ok(_) => {
                info!(file = env_file, "Loaded environment file");
                return;
            }
            Err(e) => warn!(file = env_file, error = %e, "Could not load environment file"),
        }
    }
    debug!("No environment file loaded");
}

/// Create `path` if needed and check that files can be written into it.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let marker = Path::new(path).join(".opinion_digest_write_check");
    fs::write(&marker, b"").await?;
    if let Err(e) = fs::remove_file(&marker).await {
        debug!(marker = %marker.display(), error = %e, "Could not remove write check file");
    }
    info!("Output directory is writable");
    Ok(())
}
