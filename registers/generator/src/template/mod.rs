// Licensed under the Apache-2.0 license

//! Template rendering boundary.
//!
//! The renderer hands a typed [`TemplateContext`] and a template name to a
//! [`TemplateEngine`]. [`BuiltinTemplates`] is the engine shipped with the
//! generator; it knows a fixed set of named templates and emits their text
//! directly.

mod headers;
mod module;
mod package;

use crate::context::{ContextKind, TemplateContext};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const MODULE_TEMPLATE: &str = "regblock.sv";
pub const PACKAGE_TEMPLATE: &str = "regblock_pkg.sv";
pub const RTL_OFFSETS_TEMPLATE: &str = "offsets.svh";
pub const SW_OFFSETS_TEMPLATE: &str = "sw_offsets.h";
pub const SW_DEFINES_TEMPLATE: &str = "sw_defines.h";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template {0:?}")]
    UnknownTemplate(String),
    #[error("template {template:?} expects a {expected} context, got a {found} context")]
    ContextMismatch {
        template: String,
        expected: ContextKind,
        found: ContextKind,
    },
    #[error("failed to format template {template:?}")]
    Format {
        template: String,
        #[source]
        source: fmt::Error,
    },
}

/// Text-templating facility used by the artifact renderer.
pub trait TemplateEngine: Send + Sync {
    /// Whether `template` can be rendered at all.
    fn contains(&self, template: &str) -> bool;

    fn render(&self, template: &str, ctx: &TemplateContext<'_>) -> Result<String, RenderError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Builtin {
    Module,
    Package,
    RtlOffsets,
    SwOffsets,
    SwDefines,
}

impl Builtin {
    fn kind(self) -> ContextKind {
        match self {
            Builtin::Module => ContextKind::Module,
            Builtin::Package => ContextKind::Package,
            Builtin::RtlOffsets => ContextKind::RtlHeader,
            Builtin::SwOffsets | Builtin::SwDefines => ContextKind::SwHeader,
        }
    }
}

/// Registry of the built-in templates, addressable by name.
#[derive(Clone, Debug)]
pub struct BuiltinTemplates {
    templates: BTreeMap<String, Builtin>,
}

impl Default for BuiltinTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinTemplates {
    pub fn new() -> Self {
        let templates = [
            (MODULE_TEMPLATE, Builtin::Module),
            (PACKAGE_TEMPLATE, Builtin::Package),
            (RTL_OFFSETS_TEMPLATE, Builtin::RtlOffsets),
            (SW_OFFSETS_TEMPLATE, Builtin::SwOffsets),
            (SW_DEFINES_TEMPLATE, Builtin::SwDefines),
        ]
        .into_iter()
        .map(|(name, builtin)| (name.to_string(), builtin))
        .collect();
        Self { templates }
    }

    /// Make `existing` reachable under another name as well.
    pub fn alias(mut self, name: &str, existing: &str) -> Result<Self, RenderError> {
        let builtin = *self
            .templates
            .get(existing)
            .ok_or_else(|| RenderError::UnknownTemplate(existing.to_string()))?;
        self.templates.insert(name.to_string(), builtin);
        Ok(self)
    }

    /// Registered template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl TemplateEngine for BuiltinTemplates {
    fn contains(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    fn render(&self, template: &str, ctx: &TemplateContext<'_>) -> Result<String, RenderError> {
        let builtin = *self
            .templates
            .get(template)
            .ok_or_else(|| RenderError::UnknownTemplate(template.to_string()))?;
        let mut out = String::new();
        let result = match (builtin, ctx) {
            (Builtin::Module, TemplateContext::Module(c)) => module::render(template, c, &mut out),
            (Builtin::Package, TemplateContext::Package(c)) => {
                package::render(template, c, &mut out)
            }
            (Builtin::RtlOffsets, TemplateContext::RtlHeader(c)) => {
                headers::render_rtl_offsets(template, c, &mut out)
            }
            (Builtin::SwOffsets, TemplateContext::SwHeader(c)) => {
                headers::render_sw_offsets(template, c, &mut out)
            }
            (Builtin::SwDefines, TemplateContext::SwHeader(c)) => {
                headers::render_sw_defines(template, c, &mut out)
            }
            _ => {
                return Err(RenderError::ContextMismatch {
                    template: template.to_string(),
                    expected: builtin.kind(),
                    found: ctx.kind(),
                })
            }
        };
        result.map_err(|source| RenderError::Format {
            template: template.to_string(),
            source,
        })?;
        Ok(out)
    }
}

/// First line of every generated file.
fn banner(comment: &str, template: &str) -> String {
    format!("{comment} Generated by csrgen from {template}. Do not edit.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PackageContext, SwHeaderContext};
    use crate::design::{DesignOptions, DesignState};
    use csrgen_model::{AccessType, Block, Field, Node, Register};

    fn top() -> Block {
        Block::new("foo").with_child(Node::Reg(
            Register::new("ctrl", 0)
                .with_field(Field::new("CTRL", 7, 0, AccessType::Rw, AccessType::R)),
        ))
    }

    #[test]
    fn test_unknown_template() {
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let ctx = TemplateContext::SwHeader(SwHeaderContext::new(&state));
        let err = BuiltinTemplates::new().render("unknown_header.h", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(name) if name == "unknown_header.h"));
    }

    #[test]
    fn test_context_mismatch() {
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let ctx = TemplateContext::Package(PackageContext::new(&state));
        let err = BuiltinTemplates::new()
            .render(SW_DEFINES_TEMPLATE, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ContextMismatch {
                expected: ContextKind::SwHeader,
                found: ContextKind::Package,
                ..
            }
        ));
    }

    #[test]
    fn test_alias() {
        let engine = BuiltinTemplates::new()
            .alias("my_defines.h", SW_DEFINES_TEMPLATE)
            .unwrap();
        assert!(engine.contains("my_defines.h"));
        assert_eq!(engine.names().count(), 6);
        assert!(BuiltinTemplates::new().alias("x", "missing").is_err());

        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let ctx = TemplateContext::SwHeader(SwHeaderContext::new(&state));
        let text = engine.render("my_defines.h", &ctx).unwrap();
        assert!(text.starts_with("// Generated by csrgen from my_defines.h. Do not edit.\n"));
    }
}
