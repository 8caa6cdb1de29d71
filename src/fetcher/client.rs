use bytes::Bytes;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::io::{self, Cursor, Read};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::fetcher::errors::FetchError;
use crate::locator::DocumentLocator;
use crate::stream::ByteSource;

const ACCEPT_HEADER: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/n-triples;q=0.8,*/*;q=0.5";
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP(S) byte source.
///
/// Every `open` issues a new request, so wrap it in a stream cache when a
/// document is read more than once.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    max_body_bytes: u64,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));

        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes(),
        })
    }

    #[instrument(skip_all, fields(url = %locator))]
    pub fn fetch(&self, locator: &DocumentLocator) -> Result<Bytes, FetchError> {
        let url = locator.as_url();
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > self.max_body_bytes
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let final_url = response.url().clone();
        let mut body = Vec::new();
        response
            .take(self.max_body_bytes + 1)
            .read_to_end(&mut body)?;

        // Content-Length may be missing or wrong
        if body.len() as u64 > self.max_body_bytes {
            return Err(FetchError::BodyTooLarge(body.len() as u64));
        }

        debug!(
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched document"
        );
        Ok(Bytes::from(body))
    }
}

impl ByteSource for HttpSource {
    fn open(&self, locator: &DocumentLocator) -> io::Result<Box<dyn Read>> {
        let body = self.fetch(locator)?;
        Ok(Box::new(Cursor::new(body)))
    }
}
