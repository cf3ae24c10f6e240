// Licensed under the Apache-2.0 license

//! Typed template contexts, one per artifact kind.
//!
//! Every binding a template may use is a named field here, so a template
//! cannot be handed a context that lacks something it needs.

use crate::addr_decode::AddressDecoder;
use crate::cpuif::{CpuInterface, CpuifParams};
use crate::design::{header_offset, DesignState};
use crate::field_logic::FieldLogic;
use crate::hwif::Hwif;
use crate::language::HdlLanguage;
use crate::readback::Readback;
use crate::util::macro_case;
use csrgen_model::{Field, RegisterRef};

/// Bindings for the register block module.
pub struct ModuleContext<'a> {
    pub module_name: &'a str,
    pub package_name: &'a str,
    pub language: HdlLanguage,
    pub regs: &'a [RegisterRef<'a>],
    pub cpuif: &'a dyn CpuInterface,
    pub hwif: Hwif,
    pub address_decoder: AddressDecoder<'a>,
    pub field_logic: FieldLogic<'a>,
    pub readback: Readback<'a>,
    pub data_width: u64,
    pub addr_width: u32,
}

impl<'a> ModuleContext<'a> {
    pub fn new(state: &'a DesignState<'a>, cpuif: &'a dyn CpuInterface) -> Self {
        Self {
            module_name: &state.module_name,
            package_name: &state.package_name,
            language: state.language,
            regs: &state.regs,
            cpuif,
            hwif: Hwif::new(state),
            address_decoder: AddressDecoder::new(state),
            field_logic: FieldLogic::new(state),
            readback: Readback::new(state),
            data_width: state.data_width,
            addr_width: state.addr_width,
        }
    }

    pub fn cpuif_params(&self) -> CpuifParams {
        CpuifParams {
            language: self.language,
            data_width: self.data_width,
            addr_width: self.addr_width,
        }
    }
}

/// Bindings for the SystemVerilog package holding the hardware interface
/// types.
pub struct PackageContext<'a> {
    pub package_name: &'a str,
    pub regs: &'a [RegisterRef<'a>],
    pub hwif: Hwif,
}

impl<'a> PackageContext<'a> {
    pub fn new(state: &'a DesignState<'a>) -> Self {
        Self {
            package_name: &state.package_name,
            regs: &state.regs,
            hwif: Hwif::new(state),
        }
    }
}

/// Bindings for the RTL-side offsets header.
pub struct RtlHeaderContext<'a> {
    pub module_name: &'a str,
    pub regs: &'a [RegisterRef<'a>],
    pub byte_addresses: bool,
    pub data_width: u64,
}

impl<'a> RtlHeaderContext<'a> {
    pub fn new(state: &'a DesignState<'a>) -> Self {
        Self {
            module_name: &state.module_name,
            regs: &state.regs,
            byte_addresses: state.byte_addresses,
            data_width: state.data_width,
        }
    }

    /// Macro name for a register, e.g. `FOO_CTRL`.
    pub fn symbol(&self, reg: &RegisterRef<'_>) -> String {
        macro_case(&format!("{}_{}", self.module_name, reg.ident()))
    }

    /// Include guard, e.g. `FOO_REG_OFFSETS`.
    pub fn guard(&self) -> String {
        format!("{}_REG_OFFSETS", self.module_name)
    }

    pub fn num_regs_symbol(&self) -> String {
        format!("{}_NUM_REGS", self.module_name)
    }

    pub fn offset(&self, reg: &RegisterRef<'_>) -> u64 {
        header_offset(reg.address(), self.byte_addresses, self.data_width)
    }
}

/// Bindings for both software headers.
pub struct SwHeaderContext<'a> {
    pub module_name: &'a str,
    /// Header base name, e.g. `foo` for `foo_reg_offsets.h`.
    pub base_name: String,
    pub prefix: &'a str,
    pub regs: &'a [RegisterRef<'a>],
    pub byte_addresses: bool,
    pub data_width: u64,
}

impl<'a> SwHeaderContext<'a> {
    pub fn new(state: &'a DesignState<'a>) -> Self {
        Self {
            module_name: &state.module_name,
            base_name: state.base_name(),
            prefix: &state.prefix,
            regs: &state.regs,
            byte_addresses: state.byte_addresses,
            data_width: state.data_width,
        }
    }

    /// Macro name for a register, e.g. `BAR_FOO_CTRL`.
    pub fn symbol(&self, reg: &RegisterRef<'_>) -> String {
        macro_case(&format!("{}{}_{}", self.prefix, self.module_name, reg.ident()))
    }

    pub fn field_symbol(&self, reg: &RegisterRef<'_>, field: &Field) -> String {
        format!("{}_{}", self.symbol(reg), macro_case(&field.name))
    }

    /// Include guard of the `offsets` or `defines` header, e.g.
    /// `BAR_FOO_REG_OFFSETS_H`.
    pub fn guard(&self, kind: &str) -> String {
        macro_case(&format!("{}{}_reg_{kind}_h", self.prefix, self.base_name))
    }

    pub fn offset(&self, reg: &RegisterRef<'_>) -> u64 {
        header_offset(reg.address(), self.byte_addresses, self.data_width)
    }
}

/// A context for any artifact kind.
pub enum TemplateContext<'a> {
    Module(ModuleContext<'a>),
    Package(PackageContext<'a>),
    RtlHeader(RtlHeaderContext<'a>),
    SwHeader(SwHeaderContext<'a>),
}

impl TemplateContext<'_> {
    pub fn kind(&self) -> ContextKind {
        match self {
            TemplateContext::Module(_) => ContextKind::Module,
            TemplateContext::Package(_) => ContextKind::Package,
            TemplateContext::RtlHeader(_) => ContextKind::RtlHeader,
            TemplateContext::SwHeader(_) => ContextKind::SwHeader,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextKind {
    Module,
    Package,
    RtlHeader,
    SwHeader,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContextKind::Module => "module",
            ContextKind::Package => "package",
            ContextKind::RtlHeader => "RTL header",
            ContextKind::SwHeader => "software header",
        })
    }
}
