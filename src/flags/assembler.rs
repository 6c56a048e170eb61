use super::{FlagOverrides, FlagSet};
use crate::board::{BoardProfile, PlatformSettings};
use crate::build::BuildLayout;
use crate::toolchain::Toolchain;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Linker flags that must bracket the full object/library set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkGroup {
    pub prologue: FlagSet,
    pub epilogue: FlagSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledFlags {
    pub cppflags: FlagSet,
    pub cflags: FlagSet,
    pub cxxflags: FlagSet,
    pub ldflags: FlagSet,
    /// Flags for the elf-to-image conversion step.
    pub objcopyflags: FlagSet,
    pub link_group: Option<LinkGroup>,
    /// Prebuilt archive shipped with the variant, linked after the objects.
    pub variant_system_lib: Option<PathBuf>,
}

/// Composes compiler and linker flags for one board.
///
/// Borrowing a [`Toolchain`] means the assembler can only exist once every
/// tool and SDK directory has been resolved.
pub struct FlagAssembler<'a> {
    toolchain: &'a Toolchain,
    platform: &'a PlatformSettings,
    layout: &'a BuildLayout,
}

impl<'a> FlagAssembler<'a> {
    pub fn new(
        toolchain: &'a Toolchain,
        platform: &'a PlatformSettings,
        layout: &'a BuildLayout,
    ) -> Self {
        Self {
            toolchain,
            platform,
            layout,
        }
    }

    pub fn assemble(&self, board: &BoardProfile, overrides: &FlagOverrides) -> AssembledFlags {
        let flags = AssembledFlags {
            cppflags: self.preprocessor_flags(board, overrides),
            cflags: overrides.cflags.clone(),
            cxxflags: overrides.cxxflags.clone(),
            ldflags: self.link_flags(board, overrides),
            objcopyflags: self.platform.elf2hex_flags.iter().cloned().collect(),
            link_group: self.link_group(),
            variant_system_lib: board.variant_system_lib.as_ref().and_then(|lib| {
                self.toolchain
                    .layout
                    .variant_dir(board)
                    .map(|dir| dir.join(lib))
            }),
        };
        debug!(
            "Assembled {} preprocessor and {} linker flags for {}",
            flags.cppflags.len(),
            flags.ldflags.len(),
            board.id
        );
        flags
    }

    fn cpu_flag(&self, board: &BoardProfile) -> String {
        format!("{}{}", self.toolchain.arch.cpu_flag, board.mcu)
    }

    fn preprocessor_flags(&self, board: &BoardProfile, overrides: &FlagOverrides) -> FlagSet {
        let arch = self.toolchain.arch;
        let layout = &self.toolchain.layout;
        let mut flags = FlagSet::new();

        flags.push(self.cpu_flag(board));
        flags.push(format!("-DF_CPU={}", board.f_cpu));

        flags.push(format!("-DARDUINO={}", layout.version.as_int()));
        flags.push(format!("-DARDUINO_{}", board.board_macro));
        flags.push(format!("-DARDUINO_ARCH_{}", arch.id.to_uppercase()));

        flags.push(include_flag(&layout.core_dir));

        for token in &self.platform.cpp_flags {
            flags.push(token.clone());
        }

        if let Some(system_dir) = &layout.system_dir {
            for include in arch.system_includes {
                flags.push(format!("-I{}/{}", system_dir.display(), include));
            }
        }

        if let Some(vid) = &board.usb_vid {
            flags.push(format!("-DUSB_VID={vid}"));
        }
        if let Some(pid) = &board.usb_pid {
            flags.push(format!("-DUSB_PID={pid}"));
        }
        if let Some(usb_macro) = arch.usb_enable_macro {
            flags.push(usb_macro);
        }

        if let Some(extra) = &board.extra_flags {
            extra
                .split_whitespace()
                .filter(|f| !(f.starts_with('{') && f.ends_with('}')))
                .for_each(|f| flags.push(f));
        }

        if let Some(variant_dir) = layout.variant_dir(board) {
            flags.push(include_flag(&variant_dir));
        }

        flags.extend_from(&overrides.cppflags);
        flags
    }

    fn link_flags(&self, board: &BoardProfile, overrides: &FlagOverrides) -> FlagSet {
        let mut flags = FlagSet::new();
        flags.push(self.cpu_flag(board));

        for flag in self.toolchain.arch.link_flags {
            flags.push(*flag);
        }

        if let (Some(script), Some(variant_dir)) =
            (&board.ldscript, self.toolchain.layout.variant_dir(board))
        {
            flags.push(format!("-T{}", variant_dir.join(script).display()));
        }

        flags.extend_from(&overrides.ldflags);
        flags
    }

    fn link_group(&self) -> Option<LinkGroup> {
        let spec = self.toolchain.arch.link_group?;
        let core_unit = unit_name(&self.toolchain.layout.core_dir);

        let mut prologue: FlagSet = spec.prologue.iter().copied().collect();
        prologue.push(
            self.layout
                .unit_dir(&core_unit)
                .join(spec.startup_object)
                .display()
                .to_string(),
        );

        Some(LinkGroup {
            prologue,
            epilogue: spec.epilogue.iter().copied().collect(),
        })
    }
}

pub fn include_flag(dir: &Path) -> String {
    format!("-I{}", dir.display())
}

fn unit_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
