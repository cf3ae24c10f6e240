// Licensed under the Apache-2.0 license

//! Generation orchestrator.
//!
//! One run derives a single [`DesignState`] from the elaborated tree,
//! validates it, rotates any previous output out of the way and then renders
//! every artifact group from that one state:
//!
//! ```text
//! <root>/<MODULE>/
//! ├── rtl/      module, package, RTL offsets header
//! ├── sw/       <module>_reg_offsets.h, <module>_reg_defines.h
//! ├── html/     documentation
//! └── csr.tree  hierarchy dump
//! ```

use crate::cpuif::BusOptions;
use crate::design::{DesignOptions, DesignState};
use crate::docs::{DocExporter, HtmlExporter};
use crate::error::GenerateError;
use crate::render::{ArtifactError, ArtifactRenderer, TemplateNames};
use crate::template::{BuiltinTemplates, TemplateEngine};
use crate::tree_printer::{print_tree, TREE_FILE};
use crate::validate::validate;
use csrgen_model::AddrMap;
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

/// Everything that shapes one run.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Directory the `<MODULE>` output tree is created in.
    pub output_root: PathBuf,
    pub design: DesignOptions,
    pub bus: BusOptions,
    pub templates: TemplateNames,
}

impl GeneratorConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            design: DesignOptions::default(),
            bus: BusOptions::default(),
            templates: TemplateNames::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GenerationReport {
    pub module_dir: PathBuf,
    /// Where the previous run was moved, if there was one.
    pub backup: Option<PathBuf>,
    /// Files written, in artifact order.
    pub files: Vec<PathBuf>,
}

pub struct Generator {
    config: GeneratorConfig,
    engine: Box<dyn TemplateEngine>,
    docs: Box<dyn DocExporter>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            engine: Box::new(BuiltinTemplates::new()),
            docs: Box::new(HtmlExporter),
        }
    }

    pub fn with_engine(mut self, engine: Box<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_doc_exporter(mut self, docs: Box<dyn DocExporter>) -> Self {
        self.docs = docs;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run every stage for `top`.
    ///
    /// Nothing is written if validation fails or a configured template is
    /// unknown to the engine. Once the output tree exists,
    /// every artifact is attempted and all failures are reported together.
    pub fn run(&self, top: &AddrMap) -> Result<GenerationReport, GenerateError> {
        let state = DesignState::new(top, self.config.design.clone());
        let cpuif = self.config.bus.build();
        info!(
            "Generating {} ({} registers, {} bus, {})",
            state.module_name,
            state.regs.len(),
            cpuif.name(),
            state.language
        );
        validate(&state, cpuif.as_ref())?;
        let unknown: Vec<String> = self
            .config
            .templates
            .required(state.language)
            .into_iter()
            .filter(|name| !self.engine.contains(name))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(GenerateError::UnknownTemplates(unknown));
        }

        let dir = self.config.output_root.join(&state.module_name);
        let backup = rotate_output_dir(&dir).map_err(|source| GenerateError::Rotate {
            path: dir.clone(),
            source,
        })?;
        let html_dir = dir.join("html");
        for sub in ["rtl", "sw", "html"] {
            let path = dir.join(sub);
            fs::create_dir_all(&path).map_err(|source| GenerateError::CreateDir { path, source })?;
        }

        let renderer = ArtifactRenderer::new(
            &state,
            cpuif.as_ref(),
            self.engine.as_ref(),
            &self.config.templates,
            &dir,
        );
        let tree_path = dir.join(TREE_FILE);
        let regs = &state.regs;
        let results: Vec<Vec<Result<Vec<PathBuf>, ArtifactError>>> = thread::scope(|s| {
            let renderer = &renderer;
            let jobs = [
                s.spawn(move || single_files(renderer.render_hdl())),
                s.spawn(move || vec![renderer.render_rtl_header().map(|p| vec![p])]),
                s.spawn(move || single_files(renderer.render_sw_headers())),
                s.spawn(|| {
                    vec![self
                        .docs
                        .export(top, regs, &html_dir)
                        .map_err(|source| ArtifactError::Io {
                            artifact: "documentation",
                            path: html_dir.clone(),
                            source,
                        })]
                }),
                s.spawn(|| {
                    vec![print_tree(top, &tree_path)
                        .map(|()| vec![tree_path.clone()])
                        .map_err(|source| ArtifactError::Io {
                            artifact: "register tree dump",
                            path: tree_path.clone(),
                            source,
                        })]
                }),
            ];
            jobs.into_iter()
                .map(|job| job.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for result in results.into_iter().flatten() {
            match result {
                Ok(written) => files.extend(written),
                Err(e) => {
                    warn!("{e}");
                    errors.push(e);
                }
            }
        }
        if !errors.is_empty() {
            return Err(GenerateError::Artifacts(errors));
        }
        info!("Wrote {} files to {}", files.len(), dir.display());
        Ok(GenerationReport {
            module_dir: dir,
            backup,
            files,
        })
    }
}

fn single_files(
    results: Vec<Result<PathBuf, ArtifactError>>,
) -> Vec<Result<Vec<PathBuf>, ArtifactError>> {
    results.into_iter().map(|r| r.map(|p| vec![p])).collect()
}

/// `<dir>.copy`
pub fn backup_path(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(".copy");
    PathBuf::from(name)
}

/// Move an existing `dir` to `<dir>.copy`, deleting an older copy first.
/// Returns the backup location when something was moved.
pub fn rotate_output_dir(dir: &Path) -> io::Result<Option<PathBuf>> {
    let copy = backup_path(dir);
    match fs::remove_dir_all(&copy) {
        Ok(()) => debug!("Removed stale backup {}", copy.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if !dir.exists() {
        return Ok(None);
    }
    warn!(
        "Renaming previous run {} to {}",
        dir.display(),
        copy.display()
    );
    fs::rename(dir, &copy)?;
    Ok(Some(copy))
}
