use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed description of one target board, read from a `boards.txt` entry.
///
/// Required fields are checked once when the profile is built; everything
/// downstream reads plain fields instead of looking keys up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardProfile {
    pub id: String,
    pub name: String,
    pub arch: String,
    pub mcu: String,
    /// Clock frequency exactly as the SDK spells it, e.g. `16000000L`.
    pub f_cpu: String,
    /// Suffix of the `-DARDUINO_<board>` identity macro.
    pub board_macro: String,
    pub variant: String,
    pub variant_system_lib: Option<String>,
    pub ldscript: Option<String>,
    pub usb_vid: Option<String>,
    pub usb_pid: Option<String>,
    pub extra_flags: Option<String>,
    /// Upload settings, carried for tools that flash the image.
    pub upload_protocol: Option<String>,
    pub upload_speed: Option<String>,
}

impl BoardProfile {
    /// Build a profile from the `<id>.`-stripped properties of one board.
    pub fn from_properties(
        id: &str,
        arch: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            properties
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| BuildError::InvalidBoardProfile {
                    board: id.to_string(),
                    field: key.to_string(),
                })
        };
        let optional = |key: &str| -> Option<String> {
            properties
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let board_macro = optional("build.board")
            .unwrap_or_else(|| format!("{}_{}", arch, id).to_uppercase());

        Ok(Self {
            id: id.to_string(),
            name: optional("name").unwrap_or_else(|| id.to_string()),
            arch: arch.to_string(),
            mcu: required("build.mcu")?,
            f_cpu: required("build.f_cpu")?,
            board_macro,
            variant: required("build.variant")?,
            variant_system_lib: optional("build.variant_system_lib"),
            ldscript: optional("build.ldscript"),
            usb_vid: optional("build.vid"),
            usb_pid: optional("build.pid"),
            extra_flags: optional("build.extra_flags"),
            upload_protocol: optional("upload.protocol"),
            upload_speed: optional("upload.speed"),
        })
    }
}
