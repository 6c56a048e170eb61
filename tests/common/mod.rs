#![allow(dead_code)]

use fwbuild::driver::{BuildDriver, DependencyRequest, FirmwarePlan, SketchRequest};
use fwbuild::build::translation_unit_name;
use fwbuild::{BuildConfig, Result};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const AVR_BOARDS: &str = "\
uno.name=Arduino Uno
uno.upload.protocol=arduino
uno.upload.speed=115200
uno.build.mcu=atmega328p
uno.build.f_cpu=16000000L
uno.build.board=AVR_UNO
uno.build.core=arduino
uno.build.variant=standard
";

pub const SAM_BOARDS: &str = "\
arduino_due_x.name=Arduino Due (Native USB Port)
arduino_due_x.build.mcu=cortex-m3
arduino_due_x.build.f_cpu=84000000L
arduino_due_x.build.board=SAM_DUE
arduino_due_x.build.core=arduino
arduino_due_x.build.extra_flags=-D__SAM3X8E__ -mthumb {build.usb_flags}
arduino_due_x.build.ldscript=linker_scripts/gcc/flash.ld
arduino_due_x.build.variant=arduino_due_x
arduino_due_x.build.variant_system_lib=libsam_sam3x8e_gcc_rel.a
arduino_due_x.build.vid=0x2341
arduino_due_x.build.pid=0x003e
";

pub const ESP_BOARDS: &str = "\
nodemcu.name=NodeMCU 1.0
nodemcu.build.mcu=esp8266
nodemcu.build.f_cpu=80000000L
nodemcu.build.variant=nodemcu
";

/// An SDK installation and a project, both under one temporary directory.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            temp: TempDir::new().unwrap(),
        };
        workspace.write("sdk/lib/version.txt", "1.6.4\n");
        workspace.write("sdk/hardware/arduino/avr/boards.txt", AVR_BOARDS);
        workspace.write(
            "sdk/hardware/arduino/avr/platform.txt",
            "compiler.cpp.flags=-c -g -Os -w -fno-exceptions\ncompiler.elf2hex.flags=-O ihex -R .eeprom\n",
        );
        workspace.write("sdk/hardware/arduino/avr/cores/arduino/Arduino.h", "");
        workspace.write(
            "sdk/hardware/arduino/avr/cores/arduino/main.cpp",
            "#include <Arduino.h>\n",
        );
        workspace.write("sdk/hardware/arduino/avr/variants/standard/pins_arduino.h", "");
        for tool in ["make", "avr-gcc", "avr-g++", "avr-ar", "avr-objcopy"] {
            workspace.write(&format!("sdk/hardware/tools/avr/bin/{tool}"), "");
        }
        fs::create_dir_all(workspace.sdk().join("libraries")).unwrap();
        fs::create_dir_all(workspace.project().join("src")).unwrap();
        workspace
    }

    /// Add the `sam` platform next to `avr`.
    pub fn with_sam(self) -> Self {
        self.write("sdk/hardware/arduino/sam/boards.txt", SAM_BOARDS);
        self.write("sdk/hardware/arduino/sam/cores/arduino/Arduino.h", "");
        self.write("sdk/hardware/arduino/sam/cores/arduino/syscalls_sam3.c", "");
        self.write(
            "sdk/hardware/arduino/sam/variants/arduino_due_x/linker_scripts/gcc/flash.ld",
            "",
        );
        fs::create_dir_all(self.sdk().join("hardware/arduino/sam/system/libsam")).unwrap();
        for tool in [
            "arm-none-eabi-gcc",
            "arm-none-eabi-g++",
            "arm-none-eabi-ar",
            "arm-none-eabi-objcopy",
        ] {
            self.write(&format!("sdk/hardware/tools/g++_arm_none_eabi/bin/{tool}"), "");
        }
        self
    }

    pub fn with_esp8266(self) -> Self {
        self.write("sdk/hardware/arduino/esp8266/boards.txt", ESP_BOARDS);
        self
    }

    /// SDK library `name` with a header and a source file including `includes`.
    pub fn library(&self, name: &str, includes: &[&str]) -> PathBuf {
        let body: String = includes
            .iter()
            .map(|h| format!("#include <{h}>\n"))
            .collect();
        self.write(&format!("sdk/libraries/{name}/{name}.h"), "");
        self.write(
            &format!("sdk/libraries/{name}/{name}.cpp"),
            &format!("#include \"{name}.h\"\n{body}"),
        );
        self.sdk().join("libraries").join(name)
    }

    pub fn sketch(&self, name: &str, includes: &[&str]) {
        let body: String = includes
            .iter()
            .map(|h| format!("#include <{h}>\n"))
            .collect();
        self.write(&format!("project/src/{name}.ino"), &format!("{body}void setup() {{}}\nvoid loop() {{}}\n"));
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.temp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Write a script and mark it executable.
    #[cfg(unix)]
    pub fn executable(&self, relative: &str, contents: &str) {
        use std::os::unix::fs::PermissionsExt;

        self.write(relative, contents);
        let path = self.temp.path().join(relative);
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn sdk(&self) -> PathBuf {
        self.temp.path().join("sdk")
    }

    pub fn project(&self) -> PathBuf {
        self.temp.path().join("project")
    }

    pub fn config(&self, board: &str) -> BuildConfig {
        let mut config = BuildConfig::new(self.project(), board);
        config.sdk_roots = vec![self.sdk()];
        config
    }
}

/// What the recording driver was asked to do.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub sketches: Vec<PathBuf>,
    pub scanned_units: Vec<String>,
    pub built_libraries: Vec<String>,
    pub cppflags: Vec<String>,
}

/// Stands in for the compiler: generated translation units are written for
/// real, and dependency listings are produced by following `#include`
/// directives through the `-I` directories, like `-MM` does.
pub struct RecordingDriver {
    include: Regex,
    pub recorded: RefCell<Recorded>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            include: Regex::new(r#"^\s*#\s*include\s*[<"]([^>"]+)[>"]"#).unwrap(),
            recorded: RefCell::new(Recorded::default()),
        }
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded.borrow().clone()
    }

    fn headers(&self, source: &Path, include_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![source.to_path_buf()];

        while let Some(file) = pending.pop() {
            let Ok(text) = fs::read_to_string(&file) else {
                continue;
            };
            let local_dir = file.parent().map(Path::to_path_buf);
            for line in text.lines() {
                let Some(captures) = self.include.captures(line) else {
                    continue;
                };
                let name = &captures[1];
                let header = local_dir
                    .iter()
                    .chain(include_dirs.iter())
                    .map(|dir| dir.join(name))
                    .find(|candidate| candidate.is_file());
                if let Some(header) = header {
                    if seen.insert(header.clone()) {
                        found.push(header.clone());
                        pending.push(header);
                    }
                }
            }
        }
        found
    }
}

impl BuildDriver for RecordingDriver {
    fn preprocess_sketches(&self, request: &SketchRequest<'_>) -> Result<()> {
        fs::create_dir_all(request.output_dir)?;
        for sketch in request.sketches {
            let body = fs::read_to_string(&sketch.path)?;
            let output = request.output_dir.join(translation_unit_name(&sketch.stem));
            fs::write(&output, format!("#include <{}>\n{body}", request.prelude_header))?;
            self.recorded.borrow_mut().sketches.push(output);
        }
        Ok(())
    }

    fn list_dependencies(&self, request: &DependencyRequest<'_>) -> Result<()> {
        let include_dirs: Vec<PathBuf> = request
            .flags
            .iter()
            .filter_map(|flag| flag.strip_prefix("-I"))
            .map(PathBuf::from)
            .collect();

        let mut listing = String::new();
        for source in request.sources {
            listing.push_str(&format!("{}.o: {}", request.unit, source.display()));
            for header in self.headers(source, &include_dirs) {
                listing.push_str(&format!(" \\\n {}", header.display()));
            }
            listing.push('\n');
        }

        fs::create_dir_all(request.output.parent().unwrap())?;
        fs::write(request.output, listing)?;
        self.recorded
            .borrow_mut()
            .scanned_units
            .push(request.unit.to_string());
        Ok(())
    }

    fn build_firmware(&self, plan: &FirmwarePlan<'_>) -> Result<()> {
        let mut recorded = self.recorded.borrow_mut();
        recorded.built_libraries = plan.libraries.iter().map(|l| l.name.clone()).collect();
        recorded.cppflags = plan.flags.cppflags.iter().cloned().collect();
        Ok(())
    }

    fn driver_name(&self) -> &'static str {
        "recording"
    }
}
