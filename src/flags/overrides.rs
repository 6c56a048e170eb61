use super::FlagSet;
use crate::error::{BuildError, Result};

/// User flag strings exactly as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFlagOverrides {
    pub cppflags: String,
    pub cflags: String,
    pub cxxflags: String,
    /// Plain linker flags; each token gets a `-Wl,` prefix.
    pub ldflags: String,
}

/// Tokenized user flags, appended after every default flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub cppflags: FlagSet,
    pub cflags: FlagSet,
    pub cxxflags: FlagSet,
    pub ldflags: FlagSet,
}

impl FlagOverrides {
    /// Split each string by shell word rules; a malformed string (for
    /// example an unterminated quote) is rejected here, before any tool runs.
    pub fn parse(raw: &RawFlagOverrides) -> Result<Self> {
        Ok(Self {
            cppflags: tokenize("cppflags", &raw.cppflags)?,
            cflags: tokenize("cflags", &raw.cflags)?,
            cxxflags: tokenize("cxxflags", &raw.cxxflags)?,
            ldflags: tokenize("ldflags", &raw.ldflags)?
                .iter()
                .map(|flag| format!("-Wl,{flag}"))
                .collect(),
        })
    }
}

fn tokenize(kind: &str, raw: &str) -> Result<FlagSet> {
    shell_words::split(raw)
        .map(FlagSet::from_iter)
        .map_err(|source| BuildError::MalformedFlagOverride {
            kind: kind.to_string(),
            flags: raw.to_string(),
            source,
        })
}
