//! Board and platform definitions shipped with an SDK installation.
//!
//! Boards live in `hardware/arduino/<arch>/boards.txt`; SDKs older than 1.5
//! keep a single `hardware/arduino/boards.txt` that only covers `avr`.

use super::profile::BoardProfile;
use crate::error::{BuildError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const LEGACY_ARCH: &str = "avr";

#[derive(Debug, Clone)]
struct BoardEntry {
    arch: String,
    properties: BTreeMap<String, String>,
}

/// Compiler settings an architecture's `platform.txt` contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSettings {
    pub cpp_flags: Vec<String>,
    pub elf2hex_flags: Vec<String>,
}

impl PlatformSettings {
    pub fn from_properties(properties: &BTreeMap<String, String>) -> Self {
        Self {
            cpp_flags: expanded_tokens(properties, "compiler.cpp.flags"),
            elf2hex_flags: expanded_tokens(properties, "compiler.elf2hex.flags"),
        }
    }

    /// Settings used when an SDK ships no `platform.txt` for the architecture.
    pub fn fallback(arch: &str) -> Self {
        let split = |s: &str| s.split_whitespace().map(String::from).collect();
        match arch {
            "sam" => Self {
                cpp_flags: split(
                    "-c -g -Os -w -ffunction-sections -fdata-sections -nostdlib \
                     -fno-threadsafe-statics --param max-inline-insns-single=500 \
                     -fno-rtti -fno-exceptions -Dprintf=iprintf",
                ),
                elf2hex_flags: split("-O binary"),
            },
            _ => Self {
                cpp_flags: split("-c -g -Os -w -fno-exceptions -ffunction-sections -fdata-sections"),
                elf2hex_flags: split("-O ihex -R .eeprom"),
            },
        }
    }
}

/// Every board and platform definition found across the SDK roots.
#[derive(Debug, Clone, Default)]
pub struct BoardCatalog {
    boards: BTreeMap<String, BoardEntry>,
    platforms: BTreeMap<String, PlatformSettings>,
}

impl BoardCatalog {
    /// Load definitions from each SDK root; earlier roots win on conflicts.
    pub fn load(sdk_roots: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::default();

        for root in sdk_roots {
            let hardware = root.join("hardware").join("arduino");
            if !hardware.is_dir() {
                continue;
            }

            let legacy = hardware.join("boards.txt");
            if legacy.is_file() {
                catalog.add_arch(LEGACY_ARCH, &hardware)?;
            }

            let mut arch_dirs: Vec<PathBuf> = fs::read_dir(&hardware)
                .map_err(|e| BuildError::at_path(&hardware, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.join("boards.txt").is_file())
                .collect();
            arch_dirs.sort();

            for dir in arch_dirs {
                if let Some(arch) = dir.file_name().and_then(|n| n.to_str()) {
                    catalog.add_arch(arch, &dir)?;
                }
            }
        }

        debug!(
            "Loaded {} board definitions for {} platforms",
            catalog.boards.len(),
            catalog.platforms.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory `boards.txt` text for one architecture.
    pub fn from_boards_txt(arch: &str, contents: &str) -> Self {
        let mut catalog = Self::default();
        catalog.insert_boards(arch, contents);
        catalog
    }

    fn add_arch(&mut self, arch: &str, dir: &Path) -> Result<()> {
        let boards_path = dir.join("boards.txt");
        let contents =
            fs::read_to_string(&boards_path).map_err(|e| BuildError::at_path(&boards_path, e))?;
        self.insert_boards(arch, &contents);

        let platform_path = dir.join("platform.txt");
        if !self.platforms.contains_key(arch) && platform_path.is_file() {
            let contents = fs::read_to_string(&platform_path)
                .map_err(|e| BuildError::at_path(&platform_path, e))?;
            let settings = PlatformSettings::from_properties(&parse_properties(&contents));
            self.platforms.insert(arch.to_string(), settings);
        }
        Ok(())
    }

    fn insert_boards(&mut self, arch: &str, contents: &str) {
        let mut grouped: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (key, value) in parse_properties(contents) {
            let Some((id, rest)) = key.split_once('.') else {
                continue;
            };
            if id == "menu" || rest.starts_with("menu.") {
                continue;
            }
            grouped
                .entry(id.to_string())
                .or_default()
                .insert(rest.to_string(), value);
        }

        for (id, properties) in grouped {
            if !properties.contains_key("name") {
                continue;
            }
            self.boards.entry(id).or_insert_with(|| BoardEntry {
                arch: arch.to_string(),
                properties,
            });
        }
    }

    /// Resolve and validate one board profile.
    pub fn profile(&self, board_id: &str) -> Result<BoardProfile> {
        let entry = self
            .boards
            .get(board_id)
            .ok_or_else(|| BuildError::UnknownBoard {
                board: board_id.to_string(),
            })?;
        BoardProfile::from_properties(board_id, &entry.arch, &entry.properties)
    }

    pub fn platform(&self, arch: &str) -> PlatformSettings {
        self.platforms
            .get(arch)
            .cloned()
            .unwrap_or_else(|| PlatformSettings::fallback(arch))
    }

    /// `(id, display name)` for every known board, sorted by id.
    pub fn boards(&self) -> Vec<(&str, &str)> {
        self.boards
            .iter()
            .map(|(id, entry)| {
                let name = entry
                    .properties
                    .get("name")
                    .map(String::as_str)
                    .unwrap_or(id.as_str());
                (id.as_str(), name)
            })
            .collect()
    }
}

/// Parse `key=value` lines, ignoring blanks and `#` comments.
pub fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Expand `{key}` references against the same property set and split into
/// tokens. Tokens still carrying an unresolved placeholder are dropped.
fn expanded_tokens(properties: &BTreeMap<String, String>, key: &str) -> Vec<String> {
    let Some(raw) = properties.get(key) else {
        return Vec::new();
    };
    let placeholder = &*PLACEHOLDER;

    let mut value = raw.clone();
    for _ in 0..8 {
        let expanded = placeholder
            .replace_all(&value, |caps: &regex::Captures| {
                properties
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if expanded == value {
            break;
        }
        value = expanded;
    }

    value
        .split_whitespace()
        .filter(|token| !placeholder.is_match(token))
        .map(String::from)
        .collect()
}
