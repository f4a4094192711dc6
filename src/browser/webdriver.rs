//! Live browser session through a WebDriver server.
//!
//! Requires a running WebDriver endpoint such as `chromedriver --port=4444`.

use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{info, instrument};

use super::Browser;
use crate::error::{Error, Result};

pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Open a Chrome session on the WebDriver server at `webdriver_url`.
    #[instrument(level = "info")]
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut args = vec!["--window-size=1920,1080"];
        if headless {
            args.push("--headless=new");
        }
        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;
        info!("WebDriver session started");
        Ok(Self { client })
    }
}

fn command(selector: &str) -> impl Fn(CmdError) -> Error + '_ {
    move |e| {
        if e.is_no_such_element() {
            Error::NoSuchElement(selector.to_string())
        } else {
            plain(e)
        }
    }
}

fn plain(e: CmdError) -> Error {
    if e.is_stale_element_reference() {
        Error::StaleElement(e.to_string())
    } else {
        Error::Browser(e.to_string())
    }
}

impl Browser for WebDriverBrowser {
    type Element = Element;

    #[instrument(level = "info", skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(plain)
    }

    async fn find(&self, selector: &str) -> Result<Element> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(command(selector))
    }

    async fn find_within(&self, scope: &Element, selector: &str) -> Result<Element> {
        scope
            .find(Locator::Css(selector))
            .await
            .map_err(command(selector))
    }

    async fn find_all_within(&self, scope: &Element, selector: &str) -> Result<Vec<Element>> {
        scope
            .find_all(Locator::Css(selector))
            .await
            .map_err(command(selector))
    }

    async fn text(&self, element: &Element) -> Result<String> {
        let text = element.text().await.map_err(plain)?;
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element.attr(name).await.map_err(plain)
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        element.is_displayed().await.map_err(plain)
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        element.is_enabled().await.map_err(plain)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await.map_err(plain)
    }

    async fn close(self) -> Result<()> {
        self.client.close().await.map_err(plain)?;
        info!("WebDriver session closed");
        Ok(())
    }
}
