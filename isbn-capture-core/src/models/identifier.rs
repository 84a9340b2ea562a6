use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ScanError;

/// Lengths an ISBN may have once separators are stripped.
const VALID_LENGTHS: [usize; 2] = [10, 13];

/// A validated ISBN-shaped identifier.
///
/// Only [`validate`] can produce one, so holding an `Identifier` means the
/// value has been normalized to digits (plus `X`) and is 10 or 13 long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_isbn13(&self) -> bool {
        self.0.len() == 13
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        validate(&raw).map_err(serde::de::Error::custom)
    }
}

/// Strip everything except ASCII digits and `X`, upper-casing `x`.
pub fn normalize(candidate: &str) -> String {
    candidate
        .chars()
        .filter_map(|c| match c {
            '0'..='9' | 'X' => Some(c),
            'x' => Some('X'),
            _ => None,
        })
        .collect()
}

/// The single acceptance gate shared by every recognition channel and by
/// manual entry.
pub fn validate(candidate: &str) -> Result<Identifier, ScanError> {
    let normalized = normalize(candidate);
    if VALID_LENGTHS.contains(&normalized.len()) {
        Ok(Identifier(normalized))
    } else {
        Err(ScanError::ValidationRejected(candidate.trim().to_string()))
    }
}
