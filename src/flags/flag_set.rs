use serde::Serialize;
use std::fmt;

/// Ordered, append-only list of compiler or linker tokens.
///
/// Order is significant: when a flag is repeated the compiler honours the
/// last occurrence, so nothing here sorts or deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSet(Vec<String>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.0.push(token.into());
    }

    /// Concatenation: append every token of `other`, in order.
    pub fn extend_from(&mut self, other: &FlagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Index of the first occurrence of `token`.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.0.iter().position(|t| t == token)
    }

    /// Shell-quoted single line, suitable for a makefile variable.
    pub fn to_command_line(&self) -> String {
        shell_words::join(&self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for FlagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command_line())
    }
}
