//! Article sources.
//!
//! A source drives a [`Browser`](crate::browser::Browser) session to the
//! section it covers and returns an [`Extraction`]: the article records it
//! could read plus a [`Skipped`](crate::models::Skipped) entry for every
//! article it could not.
//!
//! # Supported Sources
//!
//! | Source | Module | Section |
//! |--------|--------|---------|
//! | El País | [`elpais`] | Opinión, lead block, top 5 |
//!
//! Failures while reaching the section abort the run; failures on a single
//! article are recorded and the remaining articles are still read.

use crate::error::Result;
use crate::models::Extraction;

pub mod elpais;

/// Something that yields the articles of one section.
pub trait ArticleSource {
    /// Page the article links and images are relative to.
    fn base_url(&self) -> &str;

    async fn extract(&self) -> Result<Extraction>;
}
