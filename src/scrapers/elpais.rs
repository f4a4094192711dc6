//! El País opinion section scraper.
//!
//! Walks a browser session through the homepage of
//! [El País](https://elpais.com/) to the Opinión section and reads the lead
//! block of articles.
//!
//! # Steps
//!
//! 1. **Load**: open the homepage and let dynamic content settle
//! 2. **Consent**: accept the cookie banner if it shows up (optional)
//! 3. **Navigate**: click the Opinión link (required)
//! 4. **Collect**: wait for the lead block and take its first 5 articles
//! 5. **Read**: headline, standfirst and image `srcset` of each article
//!
//! The settle delay is a lower bound: the scraper always waits at least that
//! long after a page change, then polls for the element it needs.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::ArticleSource;
use crate::browser::{Browser, Condition};
use crate::error::Result;
use crate::models::{ArticleRecord, Extraction, Skipped};

pub const SITE_ROOT: &str = "https://elpais.com/";
pub const OPINION_URL: &str = "https://elpais.com/opinion/";

/// Articles read from the lead block, at most.
pub const MAX_ARTICLES: usize = 5;

const CONSENT_BUTTON: &str = "#didomi-notice-agree-button";
const OPINION_LINK: &str = r#"a[data-mrf-link="https://elpais.com/opinion/"]"#;
const LEAD_SECTION: &str = r#"section[data-dtm-region="portada_apertura"]"#;

/// How long the scraper lets pages settle and waits for elements.
///
/// `Default` holds the timings of a real run: a 5 s settle floor and a 10 s
/// budget per wait.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeTimings {
    /// Minimum pause after loading the homepage and after opening the section.
    pub settle: Duration,
    /// Budget of each bounded wait for an element.
    pub wait: Duration,
}

impl Default for ScrapeTimings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            wait: Duration::from_secs(10),
        }
    }
}

/// Reads the lead opinion articles through a borrowed browser session.
pub struct OpinionScraper<'a, B> {
    browser: &'a B,
    timings: ScrapeTimings,
}

impl<'a, B: Browser> OpinionScraper<'a, B> {
    pub fn new(browser: &'a B, timings: ScrapeTimings) -> Self {
        Self { browser, timings }
    }

    #[instrument(level = "info", skip_all)]
    async fn load(&self) -> Result<()> {
        self.browser.navigate(SITE_ROOT).await?;
        sleep(self.timings.settle).await;

        let html = self.browser.find("html").await?;
        match self.browser.attribute(&html, "lang").await? {
            Some(lang) => info!(%lang, "Page language detected"),
            None => debug!("Page declares no language"),
        }
        Ok(())
    }

    /// Click the cookie banner's accept button; a missing banner is fine.
    #[instrument(level = "info", skip_all)]
    async fn accept_consent(&self) {
        let accepted = match self
            .browser
            .wait_until(CONSENT_BUTTON, Condition::Clickable, self.timings.wait)
            .await
        {
            Ok(button) => self.browser.click(&button).await,
            Err(e) => Err(e),
        };
        match accepted {
            Ok(()) => info!("Accepted cookie banner"),
            Err(e) => info!(reason = %e, "No accept banner"),
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn open_section(&self) -> Result<()> {
        let link = self
            .browser
            .wait_until(OPINION_LINK, Condition::Clickable, self.timings.wait)
            .await?;
        self.browser.click(&link).await?;
        sleep(self.timings.settle).await;
        Ok(())
    }

    #[instrument(level = "info", skip_all)]
    async fn collect(&self) -> Result<Vec<B::Element>> {
        let section = self
            .browser
            .wait_until(LEAD_SECTION, Condition::Visible, self.timings.wait)
            .await?;
        let mut articles = self.browser.find_all_within(&section, "article").await?;
        let found = articles.len();
        articles.truncate(MAX_ARTICLES);
        info!(found, kept = articles.len(), "Collected lead articles");
        Ok(articles)
    }

    async fn read_article(&self, article: &B::Element) -> Result<ArticleRecord> {
        let heading = self.browser.find_within(article, "h2").await?;
        let title = self.browser.text(&heading).await?;
        let paragraph = self.browser.find_within(article, "p").await?;
        let content = self.browser.text(&paragraph).await?;

        let image_candidates = match self.browser.find_within(article, "img").await {
            Ok(img) => match self.browser.attribute(&img, "srcset").await {
                Ok(Some(srcset)) if !srcset.trim().is_empty() => Some(srcset),
                Ok(_) => {
                    info!(%title, "Image has no srcset");
                    None
                }
                Err(e) => {
                    info!(%title, error = %e, "Could not read image srcset");
                    None
                }
            },
            Err(e) => {
                info!(%title, reason = %e, "No image found");
                None
            }
        };

        Ok(ArticleRecord {
            title,
            content,
            image_candidates,
        })
    }
}

impl<B: Browser> ArticleSource for OpinionScraper<'_, B> {
    fn base_url(&self) -> &str {
        OPINION_URL
    }

    #[instrument(level = "info", skip_all)]
    async fn extract(&self) -> Result<Extraction> {
        self.load().await?;
        self.accept_consent().await;
        self.open_section().await?;
        let articles = self.collect().await?;

        let mut extraction = Extraction::default();
        for (index, article) in articles.iter().enumerate() {
            match self.read_article(article).await {
                Ok(record) => {
                    debug!(index, title = %record.title, "Read article");
                    extraction.articles.push(record);
                }
                Err(e) => {
                    warn!(index, error = %e, "Could not read article; skipping");
                    extraction.skipped.push(Skipped::Article {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            count = extraction.articles.len(),
            skipped = extraction.skipped.len(),
            "Extracted opinion articles"
        );
        Ok(extraction)
    }
}
