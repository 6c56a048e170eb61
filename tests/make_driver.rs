#![cfg(unix)]

mod common;

use common::Workspace;
use fwbuild::board::BoardCatalog;
use fwbuild::{BuildConfig, BuildOrchestrator};
use std::fs;
use std::path::{Path, PathBuf};

/// `-MM` prints the headers each source includes that exist on the `-I`
/// path; every other invocation creates its `-o` output.
const COMPILER: &str = r##"#!/bin/sh
mm=; out=; prev=; dirs=; srcs=
for arg in "$@"; do
  case "$arg" in
    -MM) mm=1 ;;
    -I*) dirs="$dirs ${arg#-I}" ;;
    *.c|*.cpp) srcs="$srcs $arg" ;;
  esac
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -n "$mm" ]; then
  for src in $srcs; do
    printf '%s:' "$src"
    for header in $(sed -n 's/^#include [<"]\(.*\)[>"]$/\1/p' "$src"); do
      for dir in $dirs; do
        if [ -f "$dir/$header" ]; then printf ' %s' "$dir/$header"; fi
      done
    done
    echo
  done
  exit 0
fi
if [ -n "$out" ]; then : > "$out"; fi
"##;

const ARCHIVER: &str = "#!/bin/sh\n: > \"$2\"\n";

const OBJCOPY: &str = "#!/bin/sh\nfor last; do :; done\n: > \"$last\"\n";

#[test]
fn test_make_driver_builds_relative_project() {
    if which::which("make").is_err() {
        eprintln!("make is not installed, skipping");
        return;
    }

    let workspace = Workspace::new();
    workspace.library("Wire", &[]);
    workspace.library("Servo", &[]);
    workspace.sketch("Blink", &["Wire.h"]);

    let bin = "sdk/hardware/tools/avr/bin";
    fs::remove_file(workspace.sdk().join("hardware/tools/avr/bin/make")).unwrap();
    workspace.executable(&format!("{bin}/avr-gcc"), COMPILER);
    workspace.executable(&format!("{bin}/avr-g++"), COMPILER);
    workspace.executable(&format!("{bin}/avr-ar"), ARCHIVER);
    workspace.executable(&format!("{bin}/avr-objcopy"), OBJCOPY);

    // Only test in this binary, so changing directory affects nothing else.
    std::env::set_current_dir(workspace.temp.path()).unwrap();
    let mut config = BuildConfig::new("project", "uno");
    config.sdk_roots = vec![PathBuf::from("sdk")];

    let catalog = BoardCatalog::load(&config.sdk_roots).unwrap();
    let report = BuildOrchestrator::new(&config, &catalog).run().unwrap();

    assert_eq!(report.used_libraries.names(), vec!["arduino", "Wire"]);

    let build = Path::new("project/.build/uno");
    let generated = fs::read_to_string(build.join("src/Blink.cpp")).unwrap();
    assert!(generated.starts_with("#include <Arduino.h>\n"));
    assert!(generated.contains("#include <Wire.h>"));

    let listing = fs::read_to_string(build.join(".deps/src.d")).unwrap();
    assert!(listing.contains("sdk/libraries/Wire/Wire.h"));
    assert!(listing.contains("sdk/hardware/arduino/avr/cores/arduino/Arduino.h"));
    assert!(!build.join(".deps/Servo.d").exists());

    assert!(build.join("src/Blink.o").is_file());
    assert!(build.join("Wire/libWire.a").is_file());
    assert!(build.join("arduino/libarduino.a").is_file());
    assert!(!build.join("Servo").exists());
    assert_eq!(report.firmware, build.join("firmware.hex"));
    assert!(report.firmware.is_file());
}
