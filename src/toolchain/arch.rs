use serde::{Deserialize, Serialize};
use std::fmt;

/// Native tools a build needs, independent of architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolKey {
    /// The build driver that runs the generated makefiles.
    Make,
    Cc,
    Cxx,
    Ar,
    Ld,
    Objcopy,
}

impl ToolKey {
    pub const ALL: [ToolKey; 6] = [
        ToolKey::Make,
        ToolKey::Cc,
        ToolKey::Cxx,
        ToolKey::Ar,
        ToolKey::Ld,
        ToolKey::Objcopy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKey::Make => "make",
            ToolKey::Cc => "cc",
            ToolKey::Cxx => "cxx",
            ToolKey::Ar => "ar",
            ToolKey::Ld => "ld",
            ToolKey::Objcopy => "objcopy",
        }
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linker bracketing for architectures that resolve symbols across the whole
/// object/library set in one group.
#[derive(Debug, Clone, Copy)]
pub struct LinkGroupSpec {
    /// Diagnostics flags followed by the group start.
    pub prologue: &'static [&'static str],
    /// Object built from the core that must precede every system archive.
    pub startup_object: &'static str,
    pub epilogue: &'static [&'static str],
}

/// Static toolchain description of one architecture.
#[derive(Debug, Clone, Copy)]
pub struct ArchSpec {
    pub id: &'static str,
    /// Directory under `hardware/tools` holding the compiler binaries.
    pub tool_dir: &'static str,
    pub tool_prefix: &'static str,
    pub cc: &'static str,
    pub cxx: &'static str,
    pub ar: &'static str,
    pub ld: &'static str,
    pub objcopy: &'static str,
    pub cpu_flag: &'static str,
    /// Include paths below the prebuilt system directory, when the
    /// architecture ships one.
    pub system_includes: &'static [&'static str],
    pub usb_enable_macro: Option<&'static str>,
    pub link_flags: &'static [&'static str],
    pub link_group: Option<LinkGroupSpec>,
}

const BUILD_DRIVER: &str = "make";
const BUILD_DRIVER_DIR: &str = "avr";

const SAM_LINK_GROUP: LinkGroupSpec = LinkGroupSpec {
    prologue: &[
        "-Wl,--check-sections",
        "-Wl,--gc-sections",
        "-Wl,--entry=Reset_Handler",
        "-Wl,--unresolved-symbols=report-all",
        "-Wl,--warn-common",
        "-Wl,--warn-section-align",
        "-Wl,--warn-unresolved-symbols",
        "-Wl,--start-group",
    ],
    startup_object: "syscalls_sam3.o",
    epilogue: &["-Wl,--end-group"],
};

pub const ARCHITECTURES: &[ArchSpec] = &[
    ArchSpec {
        id: "avr",
        tool_dir: "avr",
        tool_prefix: "avr-",
        cc: "gcc",
        cxx: "g++",
        ar: "ar",
        ld: "gcc",
        objcopy: "objcopy",
        cpu_flag: "-mmcu=",
        system_includes: &[],
        usb_enable_macro: None,
        link_flags: &[],
        link_group: None,
    },
    ArchSpec {
        id: "sam",
        tool_dir: "g++_arm_none_eabi",
        tool_prefix: "arm-none-eabi-",
        cc: "gcc",
        cxx: "g++",
        ar: "ar",
        ld: "g++",
        objcopy: "objcopy",
        cpu_flag: "-mcpu=",
        system_includes: &["libsam", "CMSIS/CMSIS/Include/", "CMSIS/Device/ATMEL/"],
        usb_enable_macro: Some("-DUSBCON"),
        link_flags: &["-mthumb", "-lgcc"],
        link_group: Some(SAM_LINK_GROUP),
    },
];

pub fn arch_spec(arch: &str) -> Option<&'static ArchSpec> {
    ARCHITECTURES.iter().find(|spec| spec.id == arch)
}

impl ArchSpec {
    pub fn requires_system_dir(&self) -> bool {
        !self.system_includes.is_empty()
    }

    /// Default binary name for a tool on this architecture.
    pub fn binary_name(&self, key: ToolKey) -> String {
        let base = match key {
            ToolKey::Make => return BUILD_DRIVER.to_string(),
            ToolKey::Cc => self.cc,
            ToolKey::Cxx => self.cxx,
            ToolKey::Ar => self.ar,
            ToolKey::Ld => self.ld,
            ToolKey::Objcopy => self.objcopy,
        };
        format!("{}{}", self.tool_prefix, base)
    }

    /// Location of a tool relative to an SDK root.
    pub fn tool_subpath(&self, key: ToolKey) -> [&'static str; 4] {
        let dir = match key {
            ToolKey::Make => BUILD_DRIVER_DIR,
            _ => self.tool_dir,
        };
        ["hardware", "tools", dir, "bin"]
    }
}
