//! Offline browser over saved HTML pages.
//!
//! Pages are parsed with `scraper` and served from a directory laid out like
//! the site (`/` → `index.html`,
//! `/opinion/` → `opinion/index.html`). There is no layout engine, so
//! visibility is approximated from markup: an element is displayed unless it
//! or one of its ancestors carries `hidden` or an inline `display:none`.
//!
//! Element handles are positions in document order, tied to the page they
//! came from; using one after a navigation fails as a stale reference.

use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::Browser;
use crate::error::{Error, Result};

/// Handle to an element of a [`SnapshotBrowser`] page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotElement {
    generation: u64,
    ordinal: usize,
}

enum Source {
    #[cfg(test)]
    Pages(HashMap<String, String>),
    Directory { root: Url, dir: PathBuf },
}

struct Page {
    url: Url,
    html: Html,
    generation: u64,
}

pub struct SnapshotBrowser {
    source: Source,
    page: RefCell<Option<Page>>,
    generation: Cell<u64>,
    clicks: RefCell<Vec<String>>,
}

impl SnapshotBrowser {
    /// Serve the given `(url, html)` pairs.
    #[cfg(test)]
    pub fn from_pages<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(url, html)| (normalize(url.as_ref()), html.into()))
            .collect();
        Self::new(Source::Pages(pages))
    }

    /// Serve pages of `root`'s host from files under `dir`.
    pub fn from_dir(root: &str, dir: impl Into<PathBuf>) -> Result<Self> {
        let root = Url::parse(root).map_err(|e| Error::InvalidUrl(format!("{root}: {e}")))?;
        Ok(Self::new(Source::Directory {
            root,
            dir: dir.into(),
        }))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            page: RefCell::new(None),
            generation: Cell::new(0),
            clicks: RefCell::new(Vec::new()),
        }
    }

    /// Labels of every clicked element, in click order (`#id` or tag name).
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.page.borrow().as_ref().map(|p| p.url.to_string())
    }

    fn has_page(&self, url: &Url) -> bool {
        match &self.source {
            #[cfg(test)]
            Source::Pages(pages) => pages.contains_key(url.as_str()),
            Source::Directory { root, dir } => {
                snapshot_path(root, dir, url).is_some_and(|p| p.is_file())
            }
        }
    }

    async fn load(&self, url: &Url) -> Result<String> {
        match &self.source {
            #[cfg(test)]
            Source::Pages(pages) => pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| Error::Browser(format!("no snapshot for {url}"))),
            Source::Directory { root, dir } => {
                let path = snapshot_path(root, dir, url)
                    .ok_or_else(|| Error::Browser(format!("{url} is outside {root}")))?;
                debug!(path = %path.display(), "Reading snapshot page");
                Ok(tokio::fs::read_to_string(&path).await?)
            }
        }
    }

    fn with_page<T>(&self, f: impl FnOnce(&Page) -> Result<T>) -> Result<T> {
        let page = self.page.borrow();
        match page.as_ref() {
            Some(page) => f(page),
            None => Err(Error::Browser("no page loaded".to_string())),
        }
    }
}

impl Page {
    fn resolve(&self, element: &SnapshotElement) -> Result<ElementRef<'_>> {
        if element.generation != self.generation {
            return Err(Error::StaleElement(format!(
                "element {} of a previous page",
                element.ordinal
            )));
        }
        self.html
            .select(&any())
            .nth(element.ordinal)
            .ok_or_else(|| Error::StaleElement(format!("element {}", element.ordinal)))
    }

    fn handle(&self, element: ElementRef<'_>) -> SnapshotElement {
        let ordinal = self
            .html
            .select(&any())
            .position(|e| e.id() == element.id())
            .unwrap_or(usize::MAX);
        SnapshotElement {
            generation: self.generation,
            ordinal,
        }
    }
}

impl Browser for SnapshotBrowser {
    type Element = SnapshotElement;

    #[instrument(level = "debug", skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        let body = self.load(&url).await?;
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.page.borrow_mut() = Some(Page {
            url,
            html: Html::parse_document(&body),
            generation,
        });
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Self::Element> {
        let sel = parse_selector(selector)?;
        self.with_page(|page| {
            page.html
                .select(&sel)
                .next()
                .map(|e| page.handle(e))
                .ok_or_else(|| Error::NoSuchElement(selector.to_string()))
        })
    }

    async fn find_within(&self, scope: &Self::Element, selector: &str) -> Result<Self::Element> {
        let sel = parse_selector(selector)?;
        self.with_page(|page| {
            page.resolve(scope)?
                .select(&sel)
                .next()
                .map(|e| page.handle(e))
                .ok_or_else(|| Error::NoSuchElement(selector.to_string()))
        })
    }

    async fn find_all_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>> {
        let sel = parse_selector(selector)?;
        self.with_page(|page| {
            Ok(page
                .resolve(scope)?
                .select(&sel)
                .map(|e| page.handle(e))
                .collect())
        })
    }

    async fn text(&self, element: &Self::Element) -> Result<String> {
        self.with_page(|page| {
            let el = page.resolve(element)?;
            Ok(el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "))
        })
    }

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>> {
        self.with_page(|page| Ok(page.resolve(element)?.value().attr(name).map(str::to_string)))
    }

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool> {
        self.with_page(|page| {
            let el = page.resolve(element)?;
            Ok(std::iter::once(el)
                .chain(el.ancestors().filter_map(ElementRef::wrap))
                .all(|e| !hidden(e)))
        })
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool> {
        self.with_page(|page| Ok(page.resolve(element)?.value().attr("disabled").is_none()))
    }

    async fn click(&self, element: &Self::Element) -> Result<()> {
        let (label, target) = self.with_page(|page| {
            let el = page.resolve(element)?;
            let label = match el.value().id() {
                Some(id) => format!("#{id}"),
                None => el.value().name().to_string(),
            };
            let href = std::iter::once(el)
                .chain(el.ancestors().filter_map(ElementRef::wrap))
                .find(|e| e.value().name() == "a")
                .and_then(|a| a.value().attr("href"));
            let target = match href {
                Some(href) => Some(
                    page.url
                        .join(href)
                        .map_err(|e| Error::InvalidUrl(format!("{href}: {e}")))?,
                ),
                None => None,
            };
            Ok((label, target))
        })?;

        self.clicks.borrow_mut().push(label);
        match target {
            Some(url) if self.has_page(&url) => self.navigate(url.as_str()).await,
            Some(url) => {
                debug!(%url, "Link target not in snapshot; staying on page");
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn close(self) -> Result<()> {
        info!(url = ?self.current_url(), clicks = ?self.clicks(), "Snapshot session closed");
        Ok(())
    }
}

fn any() -> Selector {
    Selector::parse("*").unwrap()
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.attr("hidden").is_some()
        || value.attr("style").is_some_and(|style| {
            style
                .to_ascii_lowercase()
                .split(';')
                .any(|decl| decl.replace(char::is_whitespace, "") == "display:none")
        })
}

#[cfg(test)]
fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// File holding the snapshot of `url`, or `None` for another host.
fn snapshot_path(root: &Url, dir: &Path, url: &Url) -> Option<PathBuf> {
    if url.host_str() != root.host_str() {
        return None;
    }
    let mut path = dir.to_path_buf();
    let rel = url.path().trim_matches('/');
    if !rel.is_empty() {
        path.push(rel);
    }
    if path.extension().is_none() {
        path.push("index.html");
    }
    Some(path)
}
