// Licensed under the Apache-2.0 license

//! Multi-artifact register block generator.
//!
//! Turns an elaborated register tree into a hardware register block (module
//! and package), an RTL offsets header, software C headers, HTML
//! documentation and a plain-text hierarchy dump. All artifacts of a run are
//! rendered from one [`DesignState`], so they always agree on register order.
//!
//! ## Usage
//!
//! ```no_run
//! use csrgen_generator::{BusOptions, BusProtocol, Generator, GeneratorConfig};
//! use csrgen_model::Block;
//! use std::path::Path;
//!
//! let top = Block::from_file(Path::new("foo.json")).unwrap();
//! let mut config = GeneratorConfig::new("out");
//! config.bus = BusOptions::new(BusProtocol::Apb4);
//! let report = Generator::new(config).run(&top).unwrap();
//! println!("wrote {} files", report.files.len());
//! ```
//!
//! ## Module Organization
//!
//! - [`cpuif`]: Bus interface adapters ([`CpuInterface`])
//! - [`design`]: Per-run design state ([`DesignState`])
//! - [`validate`]: Pre-flight design checks
//! - [`hwif`], [`addr_decode`], [`field_logic`], [`readback`]: Register block
//!   building blocks used by the templates
//! - [`context`], [`template`]: Typed template contexts and the template
//!   engine boundary
//! - [`render`]: Per-artifact rendering into the output tree
//! - [`docs`], [`tree_printer`]: Documentation and hierarchy dump
//! - [`generate`]: The orchestrator ([`Generator`])

pub mod addr_decode;
pub mod context;
pub mod cpuif;
pub mod design;
pub mod docs;
pub mod error;
pub mod field_logic;
pub mod generate;
pub mod hwif;
pub mod language;
pub mod readback;
pub mod render;
pub mod template;
pub mod tree_printer;
pub mod util;
pub mod validate;

pub use cpuif::{BusOptions, BusProtocol, CpuInterface, PortStyle};
pub use design::{DesignOptions, DesignState};
pub use docs::{DocExporter, HtmlExporter};
pub use error::GenerateError;
pub use generate::{GenerationReport, Generator, GeneratorConfig};
pub use language::HdlLanguage;
pub use render::{ArtifactError, ArtifactRenderer, TemplateNames};
pub use template::{BuiltinTemplates, RenderError, TemplateEngine};
pub use validate::{validate, ConstructKind, UnsupportedConstruct, ValidationErrors};
