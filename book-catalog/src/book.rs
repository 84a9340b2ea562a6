//! Book records as stored in the catalog file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use isbn_capture_core::Identifier;

use crate::error::CatalogError;

/// Physical binding of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoverStyle {
    #[default]
    Hardback,
    Softback,
    Paperback,
    #[serde(rename = "Mass Market Paperback")]
    MassMarketPaperback,
    #[serde(rename = "Leather Bound")]
    LeatherBound,
    #[serde(rename = "Board Book")]
    BoardBook,
}

impl CoverStyle {
    pub const ALL: [CoverStyle; 6] = [
        Self::Hardback,
        Self::Softback,
        Self::Paperback,
        Self::MassMarketPaperback,
        Self::LeatherBound,
        Self::BoardBook,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hardback => "Hardback",
            Self::Softback => "Softback",
            Self::Paperback => "Paperback",
            Self::MassMarketPaperback => "Mass Market Paperback",
            Self::LeatherBound => "Leather Bound",
            Self::BoardBook => "Board Book",
        }
    }
}

impl fmt::Display for CoverStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CoverStyle {
    type Err = CatalogError;

    /// Accepts the display label in any case, with spaces, dashes or
    /// underscores between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|style| {
                style
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .eq(key.chars())
            })
            .ok_or_else(|| CatalogError::InvalidInput(format!("unknown cover style: {}", s)))
    }
}

/// A catalogued book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_style: CoverStyle,
    /// RFC 3339 timestamp.
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

/// Form data for a book that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub cover_style: CoverStyle,
    pub isbn: Option<Identifier>,
}

impl NewBook {
    /// Title and author are required; surrounding whitespace is dropped.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput("title is required".into()));
        }
        if self.author.trim().is_empty() {
            return Err(CatalogError::InvalidInput("author is required".into()));
        }
        Ok(())
    }

    /// Assign an id and the current time.
    pub fn into_book(self) -> Book {
        Book {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            cover_style: self.cover_style,
            date_added: chrono::Utc::now().to_rfc3339(),
            isbn: self.isbn.map(Identifier::into_string),
        }
    }
}

/// Title and author found for an ISBN, used to prefill [`NewBook`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Which provider answered.
    #[serde(skip)]
    pub source: &'static str,
}

impl BookMetadata {
    pub fn prefill(&self, cover_style: CoverStyle) -> NewBook {
        NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            cover_style,
            isbn: isbn_capture_core::validate(&self.isbn).ok(),
        }
    }
}
