//! Catalog filtering and author autocomplete.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::book::Book;
use crate::error::CatalogError;

/// Which fields a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Title,
    Author,
}

impl FromStr for SearchField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(CatalogError::InvalidInput(format!(
                "search field must be all, title or author, got: {}",
                other
            ))),
        }
    }
}

/// Books matching `term`, case-insensitively, in catalog order.
/// An empty term matches everything.
pub fn filter<'a>(books: &'a [Book], term: &str, field: SearchField) -> Vec<&'a Book> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return books.iter().collect();
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    books
        .iter()
        .filter(|b| match field {
            SearchField::Title => contains(&b.title),
            SearchField::Author => contains(&b.author),
            SearchField::All => {
                contains(&b.title) || contains(&b.author) || contains(b.cover_style.label())
            }
        })
        .collect()
}

/// Distinct authors, sorted.
pub fn unique_authors(books: &[Book]) -> Vec<String> {
    books
        .iter()
        .map(|b| b.author.trim())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// First author extending `input`. An author equal to the input is not a
/// suggestion.
pub fn suggest_author<'a>(input: &str, authors: &'a [String]) -> Option<&'a str> {
    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() {
        return None;
    }
    authors
        .iter()
        .map(String::as_str)
        .find(|a| {
            let lower = a.to_lowercase();
            lower.starts_with(&prefix) && lower != prefix
        })
}
