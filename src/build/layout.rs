use crate::error::{BuildError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn object_name(stem: &str) -> String {
    format!("{stem}.o")
}

pub fn archive_name(stem: &str) -> String {
    format!("lib{stem}.a")
}

pub fn translation_unit_name(stem: &str) -> String {
    format!("{stem}.cpp")
}

pub fn dependency_listing_name(stem: &str) -> String {
    format!("{stem}.d")
}

/// Identity of a unit in the build tree and in make variable names.
/// Units whose keys are equal would overwrite each other's artifacts.
pub fn unit_key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

const LISTINGS_DIR: &str = ".deps";
const FIRMWARE_STEM: &str = "firmware";

/// Where every generated artifact of one build lives.
///
/// Each build unit (a library or the project sources) gets a directory named
/// after its identifier; dependency listings are kept apart so they never
/// collide with the per-object `.d` files the compiler writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output tree. Safe to call on an existing tree.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.root.join(LISTINGS_DIR)] {
            fs::create_dir_all(&dir).map_err(|e| BuildError::at_path(&dir, e))?;
        }
        Ok(())
    }

    pub fn unit_dir(&self, unit: &str) -> PathBuf {
        self.root.join(unit)
    }

    pub fn object(&self, unit: &str, stem: &str) -> PathBuf {
        self.unit_dir(unit).join(object_name(stem))
    }

    pub fn archive(&self, unit: &str) -> PathBuf {
        self.unit_dir(unit).join(archive_name(unit))
    }

    pub fn translation_unit(&self, unit: &str, stem: &str) -> PathBuf {
        self.unit_dir(unit).join(translation_unit_name(stem))
    }

    pub fn dependency_listing(&self, stem: &str) -> PathBuf {
        self.root.join(LISTINGS_DIR).join(dependency_listing_name(stem))
    }

    pub fn unit_makefile(&self, unit: &str) -> PathBuf {
        self.unit_dir(unit).join("Makefile")
    }

    pub fn makefile(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn firmware_elf(&self) -> PathBuf {
        self.root.join(format!("{FIRMWARE_STEM}.elf"))
    }

    pub fn firmware_hex(&self) -> PathBuf {
        self.root.join(format!("{FIRMWARE_STEM}.hex"))
    }
}
