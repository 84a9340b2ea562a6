use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::lookup::{LookupChain, GOOGLE_BOOKS_URL, OPEN_LIBRARY_URL};
use crate::store::BookStore;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Directory holding books.json [default: platform data dir]
    #[arg(long, env = "BOOK_CATALOG_DATA", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Open Library base URL
    #[arg(
        long,
        env = "BOOK_CATALOG_OPEN_LIBRARY_URL",
        default_value = OPEN_LIBRARY_URL,
        global = true
    )]
    pub open_library_url: String,

    /// Google Books base URL
    #[arg(
        long,
        env = "BOOK_CATALOG_GOOGLE_BOOKS_URL",
        default_value = GOOGLE_BOOKS_URL,
        global = true
    )]
    pub google_books_url: String,

    /// Per-request lookup timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub lookup_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            open_library_url: OPEN_LIBRARY_URL.into(),
            google_books_url: GOOGLE_BOOKS_URL.into(),
            lookup_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// The configured data directory, or `book-catalog` under the platform
    /// data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn store(&self) -> BookStore {
        BookStore::open(self.data_dir())
    }

    pub fn lookup_chain(&self) -> LookupChain {
        LookupChain::standard(
            &self.open_library_url,
            &self.google_books_url,
            Duration::from_secs(self.lookup_timeout_secs.max(1)),
        )
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("book-catalog")
}
