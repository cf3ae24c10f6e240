// Licensed under the Apache-2.0 license

//! `csrgen.toml` handling.
//!
//! ```toml
//! [design]
//! language = "systemverilog"
//! bus = "axi4-lite"
//! port_style = "interface"
//! max_outstanding = 1
//! byte_addresses = false
//! prefix = "soc"
//!
//! [templates]
//! tfolder = "templates"
//! module_template = "regblock.sv"
//! package_template = "regblock_pkg.sv"
//! rtl_offset_template = "offsets.svh"
//! sw_offset_template = "sw_offsets.h"
//! sw_defines_template = "sw_defines.h"
//!
//! [output]
//! dir = "csrgen.gen"
//! ```

use anyhow::{bail, Context, Result};
use csrgen_generator::{
    BuiltinTemplates, BusOptions, BusProtocol, DesignOptions, GeneratorConfig, HdlLanguage,
    PortStyle, TemplateEngine, TemplateNames,
};
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "csrgen.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "csrgen.gen";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub design: DesignSection,
    pub templates: TemplateSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DesignSection {
    pub language: String,
    pub bus: String,
    pub port_style: Option<String>,
    pub max_outstanding: Option<usize>,
    pub address_width: Option<u32>,
    pub byte_addresses: bool,
    pub prefix: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplateSection {
    pub tfolder: PathBuf,
    pub module_template: String,
    pub package_template: Option<String>,
    pub rtl_offset_template: String,
    pub sw_offset_template: String,
    pub sw_defines_template: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub out_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Resolve the file plus `overrides` into a generator configuration,
    /// rejecting combinations the generator cannot produce.
    pub fn generator_config(&self, overrides: &Overrides) -> Result<GeneratorConfig> {
        let design = &self.design;
        let language: HdlLanguage = design.language.parse().map_err(anyhow::Error::msg)?;
        let protocol: BusProtocol = design.bus.parse().map_err(anyhow::Error::msg)?;
        let port_style = match &design.port_style {
            Some(style) => style.parse().map_err(anyhow::Error::msg)?,
            None if language == HdlLanguage::Verilog => PortStyle::Flattened,
            None => PortStyle::Interface,
        };
        if language == HdlLanguage::Verilog && port_style == PortStyle::Interface {
            bail!("interface port style requires SystemVerilog, not {language}");
        }
        if language.needs_package() && self.templates.package_template.is_none() {
            bail!("{language} output needs [templates] package_template");
        }

        let mut bus = BusOptions::new(protocol).port_style(port_style);
        if let Some(max) = design.max_outstanding {
            if protocol != BusProtocol::Axi4Lite {
                warn!("max_outstanding only applies to AXI4-Lite, ignoring {max}");
            }
            bus = bus.max_outstanding(max);
        }

        let prefix = overrides
            .prefix
            .as_deref()
            .or(design.prefix.as_deref())
            .unwrap_or_default();
        let mut options = DesignOptions::default()
            .language(language)
            .prefix(prefix)
            .byte_addresses(design.byte_addresses);
        if let Some(width) = design.address_width {
            options = options.address_width(width);
        }

        let templates = &self.templates;
        debug!("Template folder {}", templates.tfolder.display());
        let out_dir = overrides.out_dir.as_ref().unwrap_or(&self.output.dir);
        let mut config = GeneratorConfig::new(out_dir);
        config.design = options;
        config.bus = bus;
        config.templates = TemplateNames {
            module: templates.module_template.clone(),
            package: language
                .needs_package()
                .then(|| templates.package_template.clone())
                .flatten(),
            rtl_offsets: templates.rtl_offset_template.clone(),
            sw_offsets: templates.sw_offset_template.clone(),
            sw_defines: templates.sw_defines_template.clone(),
        };
        let builtin = BuiltinTemplates::new();
        let unknown: Vec<&str> = config
            .templates
            .required(language)
            .into_iter()
            .filter(|name| !builtin.contains(name))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "unknown template(s) {} in {}",
                unknown.join(", "),
                templates.tfolder.display()
            );
        }
        Ok(config)
    }
}
