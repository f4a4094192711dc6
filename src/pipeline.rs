//! End-to-end digest run.
//!
//! ```text
//! extract → best image per article → translate titles → count words → summary → download images
//! ```
//!
//! Everything runs in sequence. Only the extraction can fail the run; every
//! later failure concerns a single item, is logged, and ends up in
//! [`Report::skipped`].

use chrono::Local;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::analysis::{MIN_REPEATS, repeated_words};
use crate::api::{LanguagePair, Translate};
use crate::error::{Error, Result};
use crate::images::{ImageStore, best_candidate, resolve_candidate};
use crate::models::{ArticleRecord, ArticleSummary, Report, Skipped, TranslatedTitle};
use crate::scrapers::ArticleSource;

/// Run the whole digest against `source`.
#[instrument(level = "info", skip_all, fields(from = %languages.from, to = %languages.to))]
pub async fn run<S, T, I>(
    source: &S,
    translator: &T,
    images: &I,
    languages: &LanguagePair,
) -> Result<Report>
where
    S: ArticleSource,
    T: Translate,
    I: ImageStore,
{
    let extraction = source.extract().await?;
    let base = Url::parse(source.base_url())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", source.base_url())))?;

    let mut report = Report {
        generated_at: Local::now().fixed_offset(),
        skipped: extraction.skipped,
        ..Default::default()
    };

    // ---- Best image per article ----
    let mut selected = Vec::with_capacity(extraction.articles.len());
    for record in &extraction.articles {
        let image = select_image(record, &base, &mut report.skipped);
        if let Some(url) = &image {
            report.images.push(url.clone());
        }
        selected.push(image);
    }
    info!(count = report.images.len(), images = ?report.images, "Images found");

    // ---- Title → content ----
    for (record, image) in extraction.articles.into_iter().zip(selected) {
        index_article(&mut report, record, image);
    }

    // ---- Translate ----
    for article in &report.articles {
        match translator.translate(&article.title, languages).await {
            Ok(translated) => {
                debug!(original = %article.title, %translated, "Translated title");
                report.translated_titles.push(TranslatedTitle {
                    original: article.title.clone(),
                    translated,
                });
            }
            Err(e) => {
                warn!(title = %article.title, error = %e, "No translation; skipping title");
                report.skipped.push(Skipped::Translation {
                    title: article.title.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    // ---- Word counts ----
    report.word_counts = repeated_words(
        report.translated_titles.iter().map(|t| t.translated.as_str()),
        MIN_REPEATS,
    );

    info!(
        articles = report.articles.len(),
        images = report.images.len(),
        translated = report.translated_titles.len(),
        repeated_words = ?report.word_counts,
        "Digest ready"
    );

    // ---- Download images ----
    let outcomes: Vec<(String, Result<std::path::PathBuf>)> = stream::iter(report.images.clone())
        .then(|url| async move {
            let saved = images.save(&url).await;
            (url, saved)
        })
        .collect()
        .await;

    for (url, saved) in outcomes {
        match saved {
            Ok(path) => report.downloads.push(path),
            Err(e) => {
                warn!(%url, error = %e, "Failed to retrieve image");
                report.skipped.push(Skipped::Download {
                    url,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        downloads = report.downloads.len(),
        skipped = report.skipped.len(),
        "Digest run complete"
    );
    Ok(report)
}

fn select_image(record: &ArticleRecord, base: &Url, skipped: &mut Vec<Skipped>) -> Option<String> {
    let Some(descriptor) = record.image_candidates.as_deref() else {
        info!(title = %record.title, "No image found");
        skipped.push(Skipped::NoImage {
            title: record.title.clone(),
        });
        return None;
    };

    let picked = best_candidate(descriptor)
        .map_err(|e| e.to_string())
        .and_then(|url| resolve_candidate(base, &url).map_err(|e| e.to_string()));
    match picked {
        Ok(url) => Some(url),
        Err(reason) => {
            warn!(title = %record.title, %reason, "Unusable image descriptor");
            skipped.push(Skipped::MalformedImage {
                title: record.title.clone(),
                reason,
            });
            None
        }
    }
}

/// Add `record` under its title; a repeated title replaces the earlier
/// content in place and is recorded as skipped.
fn index_article(report: &mut Report, record: ArticleRecord, image: Option<String>) {
    match report.articles.iter_mut().find(|a| a.title == record.title) {
        Some(existing) => {
            warn!(title = %record.title, "Duplicate title; keeping the later content");
            let replaced = std::mem::replace(&mut existing.content, record.content);
            existing.image = image;
            report.skipped.push(Skipped::DuplicateTitle {
                title: record.title,
                replaced,
            });
        }
        None => report.articles.push(ArticleSummary {
            title: record.title,
            content: record.content,
            image,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Extraction;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap};
    use std::path::PathBuf;

    struct FakeSource {
        articles: Vec<ArticleRecord>,
        fail: bool,
    }

    impl ArticleSource for FakeSource {
        fn base_url(&self) -> &str {
            "https://elpais.com/opinion/"
        }

        async fn extract(&self) -> Result<Extraction> {
            if self.fail {
                return Err(Error::NoSuchElement("section".to_string()));
            }
            Ok(Extraction {
                articles: self.articles.clone(),
                skipped: vec![],
            })
        }
    }

    struct FakeTranslator {
        known: HashMap<&'static str, &'static str>,
        calls: RefCell<usize>,
    }

    impl FakeTranslator {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self {
                known: pairs.iter().copied().collect(),
                calls: RefCell::new(0),
            }
        }
    }

    impl Translate for FakeTranslator {
        async fn translate(&self, text: &str, _languages: &LanguagePair) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            self.known
                .get(text)
                .map(|t| t.to_string())
                .ok_or_else(|| Error::Status {
                    status: 500,
                    url: "https://translate.example/t".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        saved: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ImageStore for FakeStore {
        async fn save(&self, url: &str) -> Result<PathBuf> {
            if self.fail_on == Some(url) {
                return Err(Error::Status {
                    status: 404,
                    url: url.to_string(),
                });
            }
            self.saved.borrow_mut().push(url.to_string());
            Ok(PathBuf::from("images").join(url.rsplit('/').next().unwrap()))
        }
    }

    fn record(title: &str, content: &str, srcset: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            content: content.to_string(),
            image_candidates: srcset.map(str::to_string),
        }
    }

    fn languages() -> LanguagePair {
        LanguagePair::new("es", "en")
    }

    #[tokio::test]
    async fn test_end_to_end_two_articles() {
        let source = FakeSource {
            articles: vec![
                record(
                    "El viejo",
                    "Un hombre",
                    Some("https://img.example/a_400.jpg 400w, https://img.example/a_1200.jpg 1200w"),
                ),
                record("El mar", "Una historia", None),
            ],
            fail: false,
        };
        let translator = FakeTranslator::new(&[
            ("El viejo", "the old man"),
            ("El mar", "the sea and the old"),
        ]);
        let store = FakeStore::default();

        let report = run(&source, &translator, &store, &languages()).await.unwrap();

        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.articles[0].title, "El viejo");
        assert_eq!(report.articles[0].content, "Un hombre");
        assert_eq!(report.images, vec!["https://img.example/a_1200.jpg".to_string()]);
        assert_eq!(report.translated_titles.len(), 2);
        let expected: BTreeMap<String, usize> =
            [("old".to_string(), 2), ("the".to_string(), 3)].into_iter().collect();
        assert_eq!(report.word_counts, expected);
        assert_eq!(*store.saved.borrow(), vec!["https://img.example/a_1200.jpg".to_string()]);
        assert_eq!(report.downloads, vec![PathBuf::from("images/a_1200.jpg")]);
        assert_eq!(
            report.skipped,
            vec![Skipped::NoImage {
                title: "El mar".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_translation_failure_skips_title() {
        let source = FakeSource {
            articles: vec![
                record("Conocido", "a", None),
                record("Desconocido", "b", None),
            ],
            fail: false,
        };
        let translator = FakeTranslator::new(&[("Conocido", "Known known")]);
        let report = run(&source, &translator, &FakeStore::default(), &languages())
            .await
            .unwrap();

        assert_eq!(*translator.calls.borrow(), 2);
        assert_eq!(report.translated_titles.len(), 1);
        assert!(report.translated_titles.len() <= report.articles.len());
        assert_eq!(report.word_counts.get("known"), Some(&2));
        assert!(report.skipped.iter().any(|s| matches!(
            s,
            Skipped::Translation { title, .. } if title == "Desconocido"
        )));
    }

    #[tokio::test]
    async fn test_download_failure_continues() {
        let source = FakeSource {
            articles: vec![
                record("Uno", "a", Some("https://img.example/one.jpg 100w")),
                record("Dos", "b", Some("https://img.example/two.jpg 100w")),
            ],
            fail: false,
        };
        let translator = FakeTranslator::new(&[("Uno", "One"), ("Dos", "Two")]);
        let store = FakeStore {
            fail_on: Some("https://img.example/one.jpg"),
            ..Default::default()
        };

        let report = run(&source, &translator, &store, &languages()).await.unwrap();
        assert_eq!(*store.saved.borrow(), vec!["https://img.example/two.jpg".to_string()]);
        assert_eq!(report.downloads.len(), 1);
        assert!(matches!(
            report.skipped.as_slice(),
            [Skipped::Download { url, .. }] if url == "https://img.example/one.jpg"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_title_keeps_later_content() {
        let source = FakeSource {
            articles: vec![
                record("Mismo", "primero", Some("https://img.example/1.jpg 10w")),
                record("Mismo", "segundo", Some("https://img.example/2.jpg 10w")),
            ],
            fail: false,
        };
        let translator = FakeTranslator::new(&[("Mismo", "Same")]);
        let report = run(&source, &translator, &FakeStore::default(), &languages())
            .await
            .unwrap();

        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.articles[0].content, "segundo");
        assert_eq!(report.articles[0].image.as_deref(), Some("https://img.example/2.jpg"));
        // both images were selected, as in the article order
        assert_eq!(report.images.len(), 2);
        assert_eq!(*translator.calls.borrow(), 1);
        assert_eq!(
            report.skipped,
            vec![Skipped::DuplicateTitle {
                title: "Mismo".to_string(),
                replaced: "primero".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_malformed_and_relative_descriptors() {
        let source = FakeSource {
            articles: vec![
                record("Roto", "a", Some("https://img.example/a.jpg")),
                record("Relativo", "b", Some("//imagenes.elpais.com/b.jpg 640w")),
            ],
            fail: false,
        };
        let translator = FakeTranslator::new(&[]);
        let report = run(&source, &translator, &FakeStore::default(), &languages())
            .await
            .unwrap();

        assert_eq!(report.images, vec!["https://imagenes.elpais.com/b.jpg".to_string()]);
        assert!(report.translated_titles.is_empty());
        assert!(report.word_counts.is_empty());
        assert!(report.skipped.iter().any(|s| matches!(
            s,
            Skipped::MalformedImage { title, .. } if title == "Roto"
        )));
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_run() {
        let source = FakeSource {
            articles: vec![],
            fail: true,
        };
        let translator = FakeTranslator::new(&[]);
        let store = FakeStore::default();
        let err = run(&source, &translator, &store, &languages()).await.unwrap_err();
        assert!(matches!(err, Error::NoSuchElement(_)));
        assert_eq!(*translator.calls.borrow(), 0);
        assert!(store.saved.borrow().is_empty());
    }
}
