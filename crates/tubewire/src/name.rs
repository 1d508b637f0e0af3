//! Tube name grammar.
//!
//! Tube names travel as bare protocol tokens, so they are checked locally
//! before any command carrying one is built. [`TubeName`] is the validated
//! form used throughout the crate.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::NameError;

/// Longest tube name the protocol accepts, in bytes.
pub const MAX_NAME_LENGTH: usize = 200;

/// Name of the tube every fresh connection uses and watches.
pub const DEFAULT_TUBE_NAME: &str = "default";

const fn is_name_char(character: char) -> bool {
    character.is_ascii_alphanumeric()
        || matches!(character, '-' | '+' | '/' | ';' | '.' | '$' | '_' | '(' | ')')
}

/// Checks `name` against the tube name grammar.
///
/// # Errors
///
/// Returns a [`NameError`] when the name is empty, longer than
/// [`MAX_NAME_LENGTH`] bytes, starts with `-` or contains a character outside
/// `A-Z a-z 0-9 - + / ; . $ _ ( )`.
pub fn ensure_valid_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong { length: name.len() });
    }
    if let Some(character) = name.chars().find(|character| !is_name_char(*character)) {
        return Err(NameError::InvalidCharacter {
            name: name.to_owned(),
            character,
        });
    }
    if name.starts_with('-') {
        return Err(NameError::LeadingHyphen {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// A tube name that satisfies the protocol grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TubeName(String);

impl TubeName {
    /// Validates and wraps `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] when `name` breaks the grammar checked by
    /// [`ensure_valid_name`].
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        ensure_valid_name(&name)?;
        Ok(Self(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for TubeName {
    fn default() -> Self {
        Self(DEFAULT_TUBE_NAME.to_owned())
    }
}

impl fmt::Display for TubeName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for TubeName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for TubeName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for TubeName {
    type Err = NameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl TryFrom<&str> for TubeName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for TubeName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
