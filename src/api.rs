//! Translation service client.
//!
//! Headlines are translated through the Rapid Translate Multi Traduction API
//! on RapidAPI. A request is a JSON `{from, to, q}` POST; a successful
//! response is a JSON array whose first element is the translation.
//!
//! # Architecture
//!
//! - [`Translate`]: core trait, one text in, one translation out
//! - [`TranslationClient`]: the HTTP implementation
//!
//! Every call is a single attempt with the transport's default timeout.
//! Any failure, a non-200 status included, means no translation for that
//! text.

use std::fmt;
use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::utils::truncate_for_log;

/// Endpoint of the translation API.
pub const ENDPOINT: &str = "https://rapid-translate-multi-traduction.p.rapidapi.com/t";

/// Source and target language codes, e.g. `es` → `en`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Spanish headlines into English.
impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("es", "en")
    }
}

/// Trait for translating a single text.
pub trait Translate {
    /// Translate `text` between `languages`.
    ///
    /// An error means "no translation for this text"; callers skip the item.
    async fn translate(&self, text: &str, languages: &LanguagePair) -> Result<String>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    from: &'a str,
    to: &'a str,
    q: &'a str,
}

/// Connection settings for [`TranslationClient`].
#[derive(Clone)]
pub struct TranslationSettings {
    pub endpoint: String,
    pub api_key: String,
    /// Value of the `x-rapidapi-host` header; defaults to the endpoint host.
    pub host: Option<String>,
}

impl TranslationSettings {
    /// Settings for the public endpoint with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
            api_key: api_key.into(),
            host: None,
        }
    }
}

/// HTTP client for the translation API.
pub struct TranslationClient {
    http: Client,
    endpoint: Url,
    host: String,
    api_key: String,
}

impl TranslationClient {
    pub fn new(http: Client, settings: TranslationSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", settings.endpoint)))?;
        let host = match settings.host {
            Some(host) => host,
            None => endpoint
                .host_str()
                .ok_or_else(|| Error::InvalidUrl(format!("{endpoint} has no host")))?
                .to_string(),
        };
        Ok(Self {
            http,
            endpoint,
            host,
            api_key: settings.api_key,
        })
    }
}

impl fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Translate for TranslationClient {
    #[instrument(level = "info", skip_all, fields(from = %languages.from, to = %languages.to))]
    async fn translate(&self, text: &str, languages: &LanguagePair) -> Result<String> {
        let t0 = Instant::now();
        let payload = TranslateRequest {
            from: &languages.from,
            to: &languages.to,
            q: text,
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Translation API error");
            return Err(Error::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body: Value = response.json().await?;
        let translated = body
            .as_array()
            .and_then(|items| items.first())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::UnexpectedResponse(truncate_for_log(&body.to_string(), 200))
            })?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = translated.chars().count(),
            "Translated text"
        );
        Ok(translated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubResponse, serve_once};

    fn client(endpoint: &str) -> TranslationClient {
        TranslationClient::new(
            Client::new(),
            TranslationSettings {
                endpoint: endpoint.to_string(),
                api_key: "secret-key".to_string(),
                host: Some("rapid-translate-multi-traduction.p.rapidapi.com".to_string()),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_translate_success_returns_first_element() {
        let (base, request) = serve_once(StubResponse::json(200, r#"["The old man and the sea"]"#)).await;
        let translated = client(&format!("{base}/t"))
            .translate("El viejo y el mar", &LanguagePair::new("es", "en"))
            .await
            .unwrap();
        assert_eq!(translated, "The old man and the sea");

        let request = request.await.unwrap();
        assert!(request.request_line().starts_with("POST /t "));
        assert_eq!(request.header("x-rapidapi-key"), Some("secret-key"));
        assert_eq!(
            request.header("x-rapidapi-host"),
            Some("rapid-translate-multi-traduction.p.rapidapi.com")
        );
        let payload: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({"from": "es", "to": "en", "q": "El viejo y el mar"})
        );
    }

    #[tokio::test]
    async fn test_translate_non_200_is_an_error() {
        let (base, _request) = serve_once(StubResponse::json(403, r#"{"message":"forbidden"}"#)).await;
        let err = client(&format!("{base}/t"))
            .translate("Hola", &LanguagePair::new("es", "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_translate_unexpected_body() {
        let (base, _request) = serve_once(StubResponse::json(200, r#"{"text":"Hello"}"#)).await;
        let err = client(&format!("{base}/t"))
            .translate("Hola", &LanguagePair::new("es", "en"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn test_host_defaults_to_endpoint_host() {
        let c = TranslationClient::new(Client::new(), TranslationSettings::new("k")).unwrap();
        assert_eq!(c.endpoint.as_str(), ENDPOINT);
        assert_eq!(c.host, "rapid-translate-multi-traduction.p.rapidapi.com");
        assert!(!format!("{c:?}").contains("\"k\""));
    }

    #[test]
    fn test_default_languages() {
        assert_eq!(LanguagePair::default(), LanguagePair::new("es", "en"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_without_retrying() {
        // Nothing listens on port 9 of localhost in the test environment.
        let err = client("http://127.0.0.1:9/t")
            .translate("Hola", &LanguagePair::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
