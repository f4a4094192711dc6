//! Data models shared by the scrapers, the pipeline and the outputs.
//!
//! - [`ArticleRecord`]: one article as read from the opinion section
//! - [`Extraction`]: everything a scraper produced in one run
//! - [`Skipped`]: an item dropped by a stage, with the reason
//! - [`Report`]: the final digest of a run

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An article as extracted from the section page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Headline text.
    pub title: String,
    /// Standfirst paragraph shown under the headline.
    pub content: String,
    /// Raw `srcset` of the article image, when there is one.
    pub image_candidates: Option<String>,
}

/// Result of one scraping pass.
#[derive(Debug, Default)]
pub struct Extraction {
    pub articles: Vec<ArticleRecord>,
    pub skipped: Vec<Skipped>,
}

/// An item a stage dropped instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Skipped {
    /// Title or standfirst could not be read.
    Article { index: usize, reason: String },
    /// A later article with the same title replaced this content.
    DuplicateTitle { title: String, replaced: String },
    /// The article has no image descriptor.
    NoImage { title: String },
    /// The image descriptor could not be parsed.
    MalformedImage { title: String, reason: String },
    /// The translation service gave no result for this title.
    Translation { title: String, reason: String },
    /// The image could not be fetched or saved.
    Download { url: String, reason: String },
}

/// One headline and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedTitle {
    pub original: String,
    pub translated: String,
}

/// An article as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub title: String,
    pub content: String,
    /// Best image selected for the article, absolute URL.
    pub image: Option<String>,
}

/// Digest produced by one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Local time the run started.
    pub generated_at: DateTime<FixedOffset>,
    /// Title → content entries, first-seen order, one per distinct title.
    pub articles: Vec<ArticleSummary>,
    /// Selected image URLs in article order.
    pub images: Vec<String>,
    pub translated_titles: Vec<TranslatedTitle>,
    /// Tokens occurring at least twice across the translated titles.
    pub word_counts: BTreeMap<String, usize>,
    /// Files written by the image downloads.
    pub downloads: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}
