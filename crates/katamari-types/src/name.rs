//! Command names and the policy used to match them.

use std::fmt;

use serde::Deserialize;

use crate::error::RegistryError;

/// How command names are compared.
///
/// The policy is fixed when a registry is constructed and applied
/// identically to registration and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Names must match byte for byte (after trimming).
    #[default]
    Exact,
    /// Names are compared after ASCII lowercasing.
    CaseInsensitive,
}

impl NameMatch {
    /// Normalize a raw token into the key used for registry storage.
    ///
    /// Surrounding whitespace is trimmed; case is folded only under
    /// [`NameMatch::CaseInsensitive`].
    pub fn normalize(self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            Self::Exact => trimmed.to_string(),
            Self::CaseInsensitive => trimmed.to_ascii_lowercase(),
        }
    }
}

/// A validated command name: non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandName(String);

impl CommandName {
    /// Validate `raw` as a command name.
    pub fn new(raw: &str) -> Result<Self, RegistryError> {
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
