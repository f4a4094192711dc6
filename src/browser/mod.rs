//! Browser automation capability.
//!
//! The scrapers only talk to a page through the [`Browser`] trait, which
//! mirrors the handful of operations a WebDriver session offers: navigate,
//! find elements by CSS selector, read text and attributes, click, and wait
//! for an element to reach a [`Condition`].
//!
//! # Implementations
//!
//! | Type | Module | Backing |
//! |------|--------|---------|
//! | [`WebDriverBrowser`] | [`webdriver`] | Live session through a WebDriver server (fantoccini) |
//! | [`SnapshotBrowser`] | [`snapshot`] | Static HTML pages parsed with `scraper` |

use std::fmt;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::{Error, Result};

pub mod snapshot;
pub mod webdriver;

pub use snapshot::SnapshotBrowser;
pub use webdriver::WebDriverBrowser;

/// Interval between two checks of a bounded wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// State an element must reach before [`Browser::wait_until`] returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Attached and rendered.
    Visible,
    /// Rendered and enabled.
    Clickable,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::Visible => "visible",
            Condition::Clickable => "clickable",
        };
        f.write_str(s)
    }
}

/// A single browser session.
///
/// Selectors are CSS selectors. `find*` methods fail with
/// [`Error::NoSuchElement`] when nothing matches, and element operations
/// fail with [`Error::StaleElement`] once the element has left the page.
pub trait Browser {
    /// Handle to an element of the current page.
    type Element;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn find(&self, selector: &str) -> Result<Self::Element>;

    /// First descendant of `scope` matching `selector`.
    async fn find_within(&self, scope: &Self::Element, selector: &str) -> Result<Self::Element>;

    async fn find_all_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>>;

    /// Rendered text of the element, whitespace collapsed.
    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// End the session.
    async fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Poll for the first element matching `selector` until it satisfies
    /// `condition`, failing with [`Error::WaitTimeout`] once `timeout` has
    /// elapsed. A missing or stale element counts as not ready yet. The
    /// element is checked at least once even with a zero timeout.
    async fn wait_until(
        &self,
        selector: &str,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Self::Element> {
        let deadline = Instant::now() + timeout;
        let mut polls = 0usize;

        loop {
            polls += 1;
            match self.find(selector).await {
                Ok(element) => {
                    let ready = match condition {
                        Condition::Visible => self.is_displayed(&element).await,
                        Condition::Clickable => match self.is_displayed(&element).await {
                            Ok(true) => self.is_enabled(&element).await,
                            other => other,
                        },
                    };
                    match ready {
                        Ok(true) => {
                            debug!(selector, %condition, polls, "Element ready");
                            return Ok(element);
                        }
                        Ok(false) | Err(Error::NoSuchElement(_)) => {}
                        Err(Error::StaleElement(reason)) => {
                            debug!(selector, polls, %reason, "Element went stale, polling again");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(Error::NoSuchElement(_) | Error::StaleElement(_)) => {}
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::WaitTimeout {
                    selector: selector.to_string(),
                    condition,
                    timeout,
                });
            }
            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
