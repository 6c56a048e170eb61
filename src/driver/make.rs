use super::{run_tool, BuildDriver, BuildUnit, DependencyRequest, FirmwarePlan, SketchRequest};
use crate::build::{translation_unit_name, unit_key, BuildLayout};
use crate::error::{BuildError, Result};
use crate::flags::FlagSet;
use crate::library::SourceKind;
use crate::toolchain::ToolchainPaths;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

const SKETCH_TEMPLATE: &str = "makefile_sketch";
const DEPS_TEMPLATE: &str = "makefile_deps";
const UNIT_TEMPLATE: &str = "makefile_unit";
const FIRMWARE_TEMPLATE: &str = "makefile_firmware";

/// Renders makefiles into the build tree and hands them to `make`.
pub struct MakeDriver {
    handlebars: Handlebars<'static>,
    tools: ToolchainPaths,
    layout: BuildLayout,
    board: String,
    verbose: bool,
}

#[derive(Serialize)]
struct SketchContext {
    prelude_header: String,
    units: Vec<SketchUnit>,
}

#[derive(Serialize)]
struct SketchUnit {
    source: String,
    output: String,
}

#[derive(Serialize)]
struct DepsContext<'a> {
    unit: &'a str,
    cxx: String,
    flags: String,
    output: String,
    sources: Vec<String>,
}

#[derive(Serialize)]
struct UnitContext<'a> {
    name: &'a str,
    var: String,
    archive: Option<String>,
    objects: Vec<ObjectRule>,
}

#[derive(Serialize)]
struct ObjectRule {
    object: String,
    source: String,
    recipe: &'static str,
}

#[derive(Serialize)]
struct FirmwareContext {
    board: String,
    tools: ToolContext,
    flags: FlagContext,
    units: Vec<String>,
    project_var: String,
    archives: Vec<String>,
    system_lib: String,
    link_prologue: String,
    link_epilogue: String,
    elf: String,
    image: String,
}

#[derive(Serialize)]
struct ToolContext {
    cc: String,
    cxx: String,
    ar: String,
    ld: String,
    objcopy: String,
}

#[derive(Serialize)]
struct FlagContext {
    cppflags: String,
    cflags: String,
    cxxflags: String,
    ldflags: String,
    objcopyflags: String,
}

impl MakeDriver {
    pub fn new(
        tools: ToolchainPaths,
        layout: BuildLayout,
        board: impl Into<String>,
        verbose: bool,
    ) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in [
            (SKETCH_TEMPLATE, include_str!("../templates/makefile_sketch.template")),
            (DEPS_TEMPLATE, include_str!("../templates/makefile_deps.template")),
            (UNIT_TEMPLATE, include_str!("../templates/makefile_unit.template")),
            (FIRMWARE_TEMPLATE, include_str!("../templates/makefile_firmware.template")),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| BuildError::Template {
                    template: name.to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            handlebars,
            tools,
            layout,
            board: board.into(),
            verbose,
        })
    }

    fn render<T: Serialize>(&self, template: &str, context: &T, target: &Path) -> Result<()> {
        let contents = self
            .handlebars
            .render(template, context)
            .map_err(|e| BuildError::Template {
                template: template.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::at_path(parent, e))?;
        }
        fs::write(target, contents).map_err(|e| BuildError::at_path(target, e))
    }

    /// Paths in the rendered makefiles are relative to the current
    /// directory, so `make` runs there too.
    fn make(&self, makefile: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.tools.make);
        if !self.verbose {
            cmd.arg("-s");
        }
        cmd.arg("--no-print-directory")
            .arg("-f")
            .arg(makefile)
            .arg("all");
        run_tool("make", cmd)
    }

    fn render_unit(&self, unit: &BuildUnit, archived: bool) -> Result<PathBuf> {
        let objects = unit
            .sources
            .iter()
            .map(|source| ObjectRule {
                object: make_path(&self.layout.object(&unit.name, &source.stem)),
                source: make_path(&source.path),
                recipe: recipe(source.kind),
            })
            .collect();

        let context = UnitContext {
            name: &unit.name,
            var: make_var(&unit.name),
            archive: archived.then(|| make_path(&self.layout.archive(&unit.name))),
            objects,
        };

        let target = self.layout.unit_makefile(&unit.name);
        self.render(UNIT_TEMPLATE, &context, &target)?;
        Ok(target)
    }
}

impl BuildDriver for MakeDriver {
    fn preprocess_sketches(&self, request: &SketchRequest<'_>) -> Result<()> {
        if request.sketches.is_empty() {
            return Ok(());
        }

        let context = SketchContext {
            prelude_header: request.prelude_header.to_string(),
            units: request
                .sketches
                .iter()
                .map(|sketch| SketchUnit {
                    source: make_path(&sketch.path),
                    output: make_path(&request.output_dir.join(translation_unit_name(&sketch.stem))),
                })
                .collect(),
        };

        let makefile = self.layout.makefile("Makefile.sketch");
        self.render(SKETCH_TEMPLATE, &context, &makefile)?;
        info!("Preprocessing {} sketch file(s)", request.sketches.len());
        self.make(&makefile)
    }

    fn list_dependencies(&self, request: &DependencyRequest<'_>) -> Result<()> {
        let context = DepsContext {
            unit: request.unit,
            cxx: make_path(&self.tools.cxx),
            flags: make_words(request.flags),
            output: make_path(request.output),
            sources: request.sources.iter().map(|s| make_path(s)).collect(),
        };

        let makefile = self.layout.makefile(&format!("Makefile.deps.{}", request.unit));
        self.render(DEPS_TEMPLATE, &context, &makefile)?;
        self.make(&makefile)
    }

    fn build_firmware(&self, plan: &FirmwarePlan<'_>) -> Result<()> {
        let mut units = vec![make_path(&self.render_unit(plan.project, false)?)];
        for library in plan.libraries {
            units.push(make_path(&self.render_unit(library, true)?));
        }

        let flags = plan.flags;
        let (link_prologue, link_epilogue) = flags
            .link_group
            .as_ref()
            .map(|group| (make_words(&group.prologue), make_words(&group.epilogue)))
            .unwrap_or_default();

        let context = FirmwareContext {
            board: self.board.clone(),
            tools: ToolContext {
                cc: make_path(&self.tools.cc),
                cxx: make_path(&self.tools.cxx),
                ar: make_path(&self.tools.ar),
                ld: make_path(&self.tools.ld),
                objcopy: make_path(&self.tools.objcopy),
            },
            flags: FlagContext {
                cppflags: make_words(&flags.cppflags),
                cflags: make_words(&flags.cflags),
                cxxflags: make_words(&flags.cxxflags),
                ldflags: make_words(&flags.ldflags),
                objcopyflags: make_words(&flags.objcopyflags),
            },
            units,
            project_var: make_var(&plan.project.name),
            archives: plan
                .libraries
                .iter()
                .map(|library| make_path(&self.layout.archive(&library.name)))
                .collect(),
            system_lib: flags
                .variant_system_lib
                .as_deref()
                .map(make_path)
                .unwrap_or_default(),
            link_prologue,
            link_epilogue,
            elf: make_path(plan.elf),
            image: make_path(plan.image),
        };

        let makefile = self.layout.makefile("Makefile");
        self.render(FIRMWARE_TEMPLATE, &context, &makefile)?;
        info!(
            "Building firmware with {} libraries",
            plan.libraries.len()
        );
        self.make(&makefile)
    }

    fn driver_name(&self) -> &'static str {
        "make"
    }
}

fn recipe(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::C => "$(CC) $(CPPFLAGS) $(CFLAGS)",
        SourceKind::Asm => "$(CC) $(CPPFLAGS) -x assembler-with-cpp",
        SourceKind::Cpp | SourceKind::Sketch => "$(CXX) $(CPPFLAGS) $(CXXFLAGS)",
    }
}

/// Shell-quoted tokens with `$` escaped for make.
fn make_words(flags: &FlagSet) -> String {
    flags.to_command_line().replace('$', "$$")
}

fn make_path(path: &Path) -> String {
    path.display().to_string().replace('$', "$$").replace(' ', "\\ ")
}

/// Make variable prefix for a unit name.
fn make_var(name: &str) -> String {
    unit_key(name)
}
