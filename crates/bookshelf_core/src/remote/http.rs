//! Blocking HTTP catalog source.

use super::{CatalogSource, TransportError, TransportResult};
use crate::config::RemoteConfig;
use crate::model::book::BookRecord;
use crate::model::chapter::ChapterRecord;
use crate::snapshot::{parse_books, parse_chapters};
use log::{debug, error};
use reqwest::blocking::Client;
use std::time::Instant;

const BOOK_ENDPOINT: &str = "getBookDatabase";
const CHAPTER_ENDPOINT: &str = "getChapterDatabase";
const USER_AGENT: &str = concat!("bookshelf/", env!("CARGO_PKG_VERSION"));

/// [`CatalogSource`] backed by the `booksAndChapters` REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    config: RemoteConfig,
}

impl HttpCatalogSource {
    /// Builds a client honouring the configured timeout.
    pub fn new(config: RemoteConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| TransportError::Request {
                endpoint: config.base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn get_text(&self, name: &str) -> TransportResult<String> {
        let endpoint = self.config.endpoint(name);
        let started_at = Instant::now();
        let request_error = |err: reqwest::Error| TransportError::Request {
            endpoint: endpoint.clone(),
            message: err.to_string(),
        };

        let result = self
            .client
            .get(endpoint.as_str())
            .send()
            .map_err(request_error)
            .and_then(|response| {
                let status = response.status();
                if !status.is_success() {
                    return Err(TransportError::Status {
                        endpoint: endpoint.clone(),
                        status: status.as_u16(),
                    });
                }
                response.text().map_err(request_error)
            });

        match &result {
            Ok(body) => debug!(
                "event=http_get module=remote status=ok endpoint={} duration_ms={} bytes={}",
                name,
                started_at.elapsed().as_millis(),
                body.len()
            ),
            Err(err) => error!(
                "event=http_get module=remote status=error endpoint={} duration_ms={} error={}",
                name,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch_books(&self) -> TransportResult<Vec<BookRecord>> {
        Ok(parse_books(&self.get_text(BOOK_ENDPOINT)?)?)
    }

    fn fetch_chapters(&self) -> TransportResult<Vec<ChapterRecord>> {
        Ok(parse_chapters(&self.get_text(CHAPTER_ENDPOINT)?)?)
    }
}
