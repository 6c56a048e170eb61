use semver::Version;
use std::fmt;

/// Version of the SDK installation, read from `lib/version.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkVersion {
    version: Version,
    legacy: bool,
}

impl SdkVersion {
    /// Parse `1.0.5`, `1.6`, `1.6.0-r2` or the pre-1.0 `0022` style.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.contains('.') {
            let minor = raw.parse::<u64>().ok()?;
            return Some(Self {
                version: Version::new(0, minor, 0),
                legacy: true,
            });
        }

        let (core, pre) = match raw.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (raw, None),
        };
        let mut parts = core.split('.').map(|p| p.parse::<u64>());
        let major = parts.next()?.ok()?;
        let minor = parts.next().unwrap_or(Ok(0)).ok()?;
        let patch = parts.next().unwrap_or(Ok(0)).ok()?;

        let mut version = Version::new(major, minor, patch);
        if let Some(pre) = pre {
            version.pre = semver::Prerelease::new(pre).ok()?;
        }
        Some(Self {
            version,
            legacy: false,
        })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    /// Value of the `-DARDUINO=` macro.
    pub fn as_int(&self) -> u64 {
        let v = &self.version;
        if self.legacy {
            v.minor
        } else if (v.major, v.minor) >= (1, 5) {
            v.major * 10000 + v.minor * 100 + v.patch
        } else {
            v.major * 100 + v.minor * 10 + v.patch
        }
    }
}

impl Default for SdkVersion {
    fn default() -> Self {
        Self {
            version: Version::new(1, 0, 0),
            legacy: false,
        }
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.legacy {
            write!(f, "{:04}", self.version.minor)
        } else {
            write!(f, "{}", self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_values() {
        assert_eq!(SdkVersion::parse("1.0.5").unwrap().as_int(), 105);
        assert_eq!(SdkVersion::parse("1.6.4").unwrap().as_int(), 10604);
        assert_eq!(SdkVersion::parse("1.5").unwrap().as_int(), 10500);
        assert_eq!(SdkVersion::parse("0022").unwrap().as_int(), 22);
    }

    #[test]
    fn test_legacy_is_major_zero() {
        let legacy = SdkVersion::parse("0023\n").unwrap();
        assert_eq!(legacy.major(), 0);
        assert_eq!(legacy.to_string(), "0023");
    }

    #[test]
    fn test_prerelease_suffix() {
        let v = SdkVersion::parse("1.6.0-r2").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.as_int(), 10600);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(SdkVersion::parse("nightly").is_none());
        assert!(SdkVersion::parse("1.x").is_none());
    }
}
