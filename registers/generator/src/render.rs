// Licensed under the Apache-2.0 license

//! Renders the template-driven artifacts of one design into the output tree.

use crate::context::{
    ModuleContext, PackageContext, RtlHeaderContext, SwHeaderContext, TemplateContext,
};
use crate::cpuif::CpuInterface;
use crate::design::DesignState;
use crate::language::HdlLanguage;
use crate::template::{
    RenderError, TemplateEngine, MODULE_TEMPLATE, PACKAGE_TEMPLATE, RTL_OFFSETS_TEMPLATE,
    SW_DEFINES_TEMPLATE, SW_OFFSETS_TEMPLATE,
};
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Template used for each artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateNames {
    pub module: String,
    /// Required only for languages with a separate package unit.
    pub package: Option<String>,
    pub rtl_offsets: String,
    pub sw_offsets: String,
    pub sw_defines: String,
}

impl Default for TemplateNames {
    fn default() -> Self {
        Self {
            module: MODULE_TEMPLATE.to_string(),
            package: Some(PACKAGE_TEMPLATE.to_string()),
            rtl_offsets: RTL_OFFSETS_TEMPLATE.to_string(),
            sw_offsets: SW_OFFSETS_TEMPLATE.to_string(),
            sw_defines: SW_DEFINES_TEMPLATE.to_string(),
        }
    }
}

/// A failure producing one artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{artifact}: {source}")]
    Render {
        artifact: &'static str,
        #[source]
        source: RenderError,
    },
    #[error("{artifact}: no template configured")]
    MissingTemplate { artifact: &'static str },
    #[error("{artifact}: failed to write {}: {source}", .path.display())]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateNames {
    /// Template names a run in `language` renders. A missing package
    /// template is reported by the renderer instead.
    pub fn required(&self, language: HdlLanguage) -> Vec<&str> {
        let mut names = vec![self.module.as_str()];
        if language.needs_package() {
            names.extend(self.package.as_deref());
        }
        names.extend([
            self.rtl_offsets.as_str(),
            self.sw_offsets.as_str(),
            self.sw_defines.as_str(),
        ]);
        names
    }
}

impl ArtifactError {
    pub fn artifact(&self) -> &'static str {
        match self {
            ArtifactError::Render { artifact, .. }
            | ArtifactError::MissingTemplate { artifact }
            | ArtifactError::Io { artifact, .. } => *artifact,
        }
    }
}

pub struct ArtifactRenderer<'a> {
    state: &'a DesignState<'a>,
    cpuif: &'a dyn CpuInterface,
    engine: &'a dyn TemplateEngine,
    templates: &'a TemplateNames,
    /// `<output root>/<MODULE>`
    dir: &'a Path,
}

impl<'a> ArtifactRenderer<'a> {
    pub fn new(
        state: &'a DesignState<'a>,
        cpuif: &'a dyn CpuInterface,
        engine: &'a dyn TemplateEngine,
        templates: &'a TemplateNames,
        dir: &'a Path,
    ) -> Self {
        Self {
            state,
            cpuif,
            engine,
            templates,
            dir,
        }
    }

    pub fn module_path(&self) -> PathBuf {
        self.dir.join("rtl").join(format!(
            "{}.{}",
            self.state.module_name,
            self.state.language.extension()
        ))
    }

    /// None when the language has no separate package unit.
    pub fn package_path(&self) -> Option<PathBuf> {
        let lang = self.state.language;
        lang.needs_package().then(|| {
            self.dir
                .join("rtl")
                .join(format!("{}.{}", self.state.package_name, lang.extension()))
        })
    }

    pub fn rtl_header_path(&self) -> PathBuf {
        self.dir.join("rtl").join(format!(
            "{}.{}",
            self.state.module_name,
            self.state.language.header_extension()
        ))
    }

    pub fn sw_offsets_path(&self) -> PathBuf {
        self.dir
            .join("sw")
            .join(format!("{}_reg_offsets.h", self.state.base_name()))
    }

    pub fn sw_defines_path(&self) -> PathBuf {
        self.dir
            .join("sw")
            .join(format!("{}_reg_defines.h", self.state.base_name()))
    }

    /// The register block module and, where the language has one, its
    /// package. Both are attempted; one result per file.
    pub fn render_hdl(&self) -> Vec<Result<PathBuf, ArtifactError>> {
        let ctx = TemplateContext::Module(ModuleContext::new(self.state, self.cpuif));
        let mut results = vec![self.emit(
            "HDL module",
            &self.templates.module,
            &ctx,
            self.module_path(),
        )];
        if let Some(path) = self.package_path() {
            let ctx = TemplateContext::Package(PackageContext::new(self.state));
            results.push(match self.templates.package.as_deref() {
                Some(template) => self.emit("HDL package", template, &ctx, path),
                None => Err(ArtifactError::MissingTemplate {
                    artifact: "HDL package",
                }),
            });
        }
        results
    }

    pub fn render_rtl_header(&self) -> Result<PathBuf, ArtifactError> {
        let ctx = TemplateContext::RtlHeader(RtlHeaderContext::new(self.state));
        self.emit(
            "RTL header",
            &self.templates.rtl_offsets,
            &ctx,
            self.rtl_header_path(),
        )
    }

    /// Software offsets and defines headers, one result each.
    pub fn render_sw_headers(&self) -> Vec<Result<PathBuf, ArtifactError>> {
        let ctx = TemplateContext::SwHeader(SwHeaderContext::new(self.state));
        vec![
            self.emit(
                "software offsets header",
                &self.templates.sw_offsets,
                &ctx,
                self.sw_offsets_path(),
            ),
            self.emit(
                "software defines header",
                &self.templates.sw_defines,
                &ctx,
                self.sw_defines_path(),
            ),
        ]
    }

    fn emit(
        &self,
        artifact: &'static str,
        template: &str,
        ctx: &TemplateContext<'_>,
        path: PathBuf,
    ) -> Result<PathBuf, ArtifactError> {
        let text = self
            .engine
            .render(template, ctx)
            .map_err(|source| ArtifactError::Render { artifact, source })?;
        std::fs::write(&path, text).map_err(|source| ArtifactError::Io {
            artifact,
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {} to {}", artifact, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuif::{BusOptions, BusProtocol, PortStyle};
    use crate::design::DesignOptions;
    use crate::template::BuiltinTemplates;
    use csrgen_model::{AccessType, Block, Field, Node, Register};

    fn top() -> Block {
        Block::new("foo").with_child(Node::Reg(
            Register::new("ctrl", 0)
                .with_field(Field::new("CTRL", 7, 0, AccessType::Rw, AccessType::R)),
        ))
    }

    fn make_dirs(root: &Path) {
        std::fs::create_dir_all(root.join("rtl")).unwrap();
        std::fs::create_dir_all(root.join("sw")).unwrap();
    }

    #[test]
    fn test_paths_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("FOO");
        make_dirs(&dir);
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let cpuif = BusOptions::new(BusProtocol::Axi4Lite).build();
        let engine = BuiltinTemplates::new();
        let names = TemplateNames::default();
        let renderer = ArtifactRenderer::new(&state, cpuif.as_ref(), &engine, &names, &dir);

        let hdl: Vec<PathBuf> = renderer.render_hdl().into_iter().map(Result::unwrap).collect();
        assert_eq!(hdl, [dir.join("rtl/FOO.sv"), dir.join("rtl/foo_pkg.sv")]);
        assert_eq!(renderer.render_rtl_header().unwrap(), dir.join("rtl/FOO.svh"));
        assert_eq!(
            renderer
                .render_sw_headers()
                .into_iter()
                .map(Result::unwrap)
                .collect::<Vec<_>>(),
            [dir.join("sw/foo_reg_offsets.h"), dir.join("sw/foo_reg_defines.h")]
        );
        for path in hdl {
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_verilog_has_no_package() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("FOO");
        make_dirs(&dir);
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default().language(HdlLanguage::Verilog));
        let cpuif = BusOptions::new(BusProtocol::Apb4)
            .port_style(PortStyle::Flattened)
            .build();
        let engine = BuiltinTemplates::new();
        let names = TemplateNames {
            package: None,
            ..Default::default()
        };
        let renderer = ArtifactRenderer::new(&state, cpuif.as_ref(), &engine, &names, &dir);
        let hdl: Vec<PathBuf> = renderer.render_hdl().into_iter().map(Result::unwrap).collect();
        assert_eq!(hdl, [dir.join("rtl/FOO.v")]);
        assert_eq!(renderer.rtl_header_path(), dir.join("rtl/FOO.vh"));
    }

    #[test]
    fn test_errors_name_the_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("FOO");
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let cpuif = BusOptions::new(BusProtocol::Axi4Lite).build();
        let engine = BuiltinTemplates::new();
        let names = TemplateNames {
            sw_defines: "missing.h".to_string(),
            ..Default::default()
        };
        let renderer = ArtifactRenderer::new(&state, cpuif.as_ref(), &engine, &names, &dir);

        // No output directories exist yet.
        let err = renderer.render_rtl_header().unwrap_err();
        assert!(matches!(err, ArtifactError::Io { artifact: "RTL header", .. }));

        make_dirs(&dir);
        let [offsets, defines]: [Result<PathBuf, ArtifactError>; 2] =
            renderer.render_sw_headers().try_into().unwrap();
        assert!(offsets.is_ok());
        let err = defines.unwrap_err();
        assert_eq!(err.artifact(), "software defines header");
        assert!(err.to_string().contains("missing.h"));
        assert!(dir.join("sw/foo_reg_offsets.h").is_file());
    }

    #[test]
    fn test_every_file_of_a_group_is_attempted() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("FOO");
        make_dirs(&dir);
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let cpuif = BusOptions::new(BusProtocol::Axi4Lite).build();
        let engine = BuiltinTemplates::new();
        let names = TemplateNames {
            module: "missing.sv".to_string(),
            package: None,
            sw_offsets: "missing_offsets.h".to_string(),
            sw_defines: "missing_defines.h".to_string(),
            ..Default::default()
        };
        let renderer = ArtifactRenderer::new(&state, cpuif.as_ref(), &engine, &names, &dir);

        let failed: Vec<&str> = renderer
            .render_hdl()
            .iter()
            .chain(renderer.render_sw_headers().iter())
            .map(|r| r.as_ref().unwrap_err().artifact())
            .collect();
        assert_eq!(
            failed,
            [
                "HDL module",
                "HDL package",
                "software offsets header",
                "software defines header"
            ]
        );
    }

    #[test]
    fn test_required_templates() {
        let names = TemplateNames::default();
        assert_eq!(
            names.required(HdlLanguage::SystemVerilog),
            [
                MODULE_TEMPLATE,
                PACKAGE_TEMPLATE,
                RTL_OFFSETS_TEMPLATE,
                SW_OFFSETS_TEMPLATE,
                SW_DEFINES_TEMPLATE
            ]
        );
        assert_eq!(names.required(HdlLanguage::Verilog).len(), 4);
    }
}
