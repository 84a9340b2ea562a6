//! JSON file persistence for the catalog.
//!
//! The whole catalog lives in one pretty-printed `books.json` array, newest
//! first. Every operation reads and rewrites the file, so two processes
//! writing at once can lose an update.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::book::{Book, NewBook};
use crate::error::CatalogError;

pub const BOOKS_FILE: &str = "books.json";

pub struct BookStore {
    path: PathBuf,
}

impl BookStore {
    /// Store backed by `{data_dir}/books.json`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(BOOKS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All books, newest first. A missing file is an empty catalog.
    pub fn list(&self) -> Result<Vec<Book>, CatalogError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| {
            CatalogError::Storage(format!("{} is corrupt: {}", self.path.display(), e))
        })
    }

    /// Store a new book at the front of the catalog.
    pub fn add(&self, new_book: NewBook) -> Result<Book, CatalogError> {
        new_book.validate()?;
        let book = new_book.into_book();

        let mut books = self.list()?;
        books.insert(0, book.clone());
        self.write(&books)?;

        log::info!("added \"{}\" by {} ({})", book.title, book.author, book.id);
        Ok(book)
    }

    /// Remove the book with `id`.
    pub fn delete(&self, id: &str) -> Result<Book, CatalogError> {
        let mut books = self.list()?;
        let Some(index) = books.iter().position(|b| b.id == id) else {
            return Err(CatalogError::NotFound(format!("book {}", id)));
        };
        let removed = books.remove(index);
        self.write(&books)?;

        log::info!("deleted \"{}\" ({})", removed.title, removed.id);
        Ok(removed)
    }

    fn write(&self, books: &[Book]) -> Result<(), CatalogError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(books)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
