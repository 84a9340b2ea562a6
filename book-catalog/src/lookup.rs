//! Title/author lookup for a scanned ISBN.
//!
//! Open Library is asked first and Google Books second. A provider that
//! answers with a non-success status or without a record simply has no
//! match; only transport and parse failures are errors.

use std::time::Duration;

use serde_json::Value;

use isbn_capture_core::Identifier;

use crate::book::BookMetadata;
use crate::error::CatalogError;

pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of book metadata keyed by ISBN.
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the provider has no record for `isbn`.
    fn lookup(&self, isbn: &Identifier) -> Result<Option<BookMetadata>, CatalogError>;
}

/// GET `url` and return the body, or `None` for a non-success status.
fn fetch(url: &str, timeout: Duration) -> Result<Option<String>, CatalogError> {
    log::debug!("GET {}", url);
    match ureq::get(url)
        .timeout(timeout)
        .set("Accept", "application/json")
        .call()
    {
        Ok(resp) => resp
            .into_string()
            .map(Some)
            .map_err(|e| CatalogError::Lookup(format!("reading {}: {}", url, e))),
        Err(ureq::Error::Status(code, _)) => {
            log::debug!("{} answered {}", url, code);
            Ok(None)
        }
        Err(e) => Err(CatalogError::Lookup(format!("{}: {}", url, e))),
    }
}

fn parse_json(body: &str) -> Result<Value, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Lookup(format!("bad JSON: {}", e)))
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

pub struct OpenLibraryProvider {
    base_url: String,
    timeout: Duration,
}

impl OpenLibraryProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OpenLibraryProvider {
    fn default() -> Self {
        Self::new(OPEN_LIBRARY_URL)
    }
}

impl MetadataProvider for OpenLibraryProvider {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    fn lookup(&self, isbn: &Identifier) -> Result<Option<BookMetadata>, CatalogError> {
        let url = format!(
            "{}/api/books?bibkeys=ISBN:{}&format=json&jscmd=data",
            self.base_url, isbn
        );
        match fetch(&url, self.timeout)? {
            Some(body) => parse_open_library(isbn.as_str(), &body),
            None => Ok(None),
        }
    }
}

/// Extract the record keyed `ISBN:{isbn}` from an Open Library response.
pub fn parse_open_library(isbn: &str, body: &str) -> Result<Option<BookMetadata>, CatalogError> {
    let data = parse_json(body)?;
    let Some(record) = data.get(format!("ISBN:{}", isbn)) else {
        return Ok(None);
    };

    let author = record["authors"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(|a| a["name"].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Ok(Some(BookMetadata {
        title: text(&record["title"]),
        author,
        isbn: isbn.to_string(),
        source: "Open Library",
    }))
}

pub struct GoogleBooksProvider {
    base_url: String,
    timeout: Duration,
}

impl GoogleBooksProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GoogleBooksProvider {
    fn default() -> Self {
        Self::new(GOOGLE_BOOKS_URL)
    }
}

impl MetadataProvider for GoogleBooksProvider {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    fn lookup(&self, isbn: &Identifier) -> Result<Option<BookMetadata>, CatalogError> {
        let url = format!("{}/books/v1/volumes?q=isbn:{}", self.base_url, isbn);
        match fetch(&url, self.timeout)? {
            Some(body) => parse_google_books(isbn.as_str(), &body),
            None => Ok(None),
        }
    }
}

/// Take the first volume of a Google Books search response.
pub fn parse_google_books(isbn: &str, body: &str) -> Result<Option<BookMetadata>, CatalogError> {
    let data = parse_json(body)?;
    let Some(info) = data["items"]
        .as_array()
        .and_then(|items| items.first())
        .map(|item| &item["volumeInfo"])
    else {
        return Ok(None);
    };

    let author = info["authors"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Ok(Some(BookMetadata {
        title: text(&info["title"]),
        author,
        isbn: isbn.to_string(),
        source: "Google Books",
    }))
}

/// Providers tried in order until one has a record.
pub struct LookupChain {
    providers: Vec<Box<dyn MetadataProvider>>,
}

impl LookupChain {
    pub fn new(providers: Vec<Box<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }

    /// Open Library, then Google Books, at the given base URLs.
    pub fn standard(open_library_url: &str, google_books_url: &str, timeout: Duration) -> Self {
        Self::new(vec![
            Box::new(OpenLibraryProvider::new(open_library_url).with_timeout(timeout)),
            Box::new(GoogleBooksProvider::new(google_books_url).with_timeout(timeout)),
        ])
    }

    /// Look `isbn` up. `NotFound` if no provider has it; if a provider failed
    /// and none matched, that failure is returned instead.
    pub fn lookup(&self, isbn: &Identifier) -> Result<BookMetadata, CatalogError> {
        let mut failure = None;
        for provider in &self.providers {
            match provider.lookup(isbn) {
                Ok(Some(meta)) => {
                    log::info!("found \"{}\" via {}", meta.title, provider.name());
                    return Ok(meta);
                }
                Ok(None) => {
                    log::info!("{} has no record for {}", provider.name(), isbn);
                }
                Err(e) => {
                    log::warn!("{} lookup failed: {}", provider.name(), e);
                    failure = Some(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| CatalogError::NotFound(format!("book with ISBN {}", isbn))))
    }
}

impl Default for LookupChain {
    fn default() -> Self {
        Self::standard(OPEN_LIBRARY_URL, GOOGLE_BOOKS_URL, DEFAULT_TIMEOUT)
    }
}
