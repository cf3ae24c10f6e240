// Licensed under the Apache-2.0 license

//! Per-run design state derived from the elaborated tree.

use crate::language::HdlLanguage;
use csrgen_model::{AddrMap, RegisterMap, RegisterRef};
use std::sync::Arc;

/// Address width used when the configuration does not set one. Downstream
/// synthesis trims unused upper bits.
pub const DEFAULT_ADDRESS_WIDTH: u32 = 32;

/// Knobs that shape the design state.
#[derive(Clone, Debug, Default)]
pub struct DesignOptions {
    /// Overrides the module name derived from the top-level address map.
    pub module_name: Option<String>,
    pub address_width: Option<u32>,
    pub language: HdlLanguage,
    /// Naming prefix for header symbols. A `_` separator is appended when
    /// non-empty.
    pub prefix: String,
    /// Header offsets are byte addresses when set, word indices otherwise.
    pub byte_addresses: bool,
}

impl DesignOptions {
    pub fn language(mut self, language: HdlLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn module_name(mut self, name: &str) -> Self {
        self.module_name = Some(name.to_string());
        self
    }

    pub fn address_width(mut self, width: u32) -> Self {
        self.address_width = Some(width);
        self
    }

    pub fn byte_addresses(mut self, byte_addresses: bool) -> Self {
        self.byte_addresses = byte_addresses;
        self
    }
}

/// Snapshot of everything the artifacts of one run are rendered from.
///
/// The register list is computed exactly once and shared by every renderer,
/// so all artifacts agree on register order and indices.
#[derive(Clone, Debug)]
pub struct DesignState<'t> {
    top: &'t AddrMap,
    pub module_name: String,
    pub package_name: String,
    pub regs: Arc<[RegisterRef<'t>]>,
    /// Bus data width in bits; zero for a design without registers.
    pub data_width: u64,
    pub addr_width: u32,
    pub language: HdlLanguage,
    /// Prefix including its trailing separator, or empty.
    pub prefix: String,
    pub byte_addresses: bool,
}

impl<'t> DesignState<'t> {
    pub fn new(top: &'t AddrMap, options: DesignOptions) -> Self {
        let module_name = options
            .module_name
            .unwrap_or_else(|| top.name.clone())
            .to_uppercase();
        let package_name = format!("{}_pkg", module_name.to_lowercase());
        let regs: Arc<[RegisterRef<'t>]> = RegisterMap::new(top).registers().into();
        let data_width = regs.first().map(|r| r.width()).unwrap_or(0);
        let prefix = if options.prefix.is_empty() || options.prefix.ends_with('_') {
            options.prefix
        } else {
            format!("{}_", options.prefix)
        };
        Self {
            top,
            module_name,
            package_name,
            regs,
            data_width,
            addr_width: options.address_width.unwrap_or(DEFAULT_ADDRESS_WIDTH),
            language: options.language,
            prefix,
            byte_addresses: options.byte_addresses,
        }
    }

    pub fn top(&self) -> &'t AddrMap {
        self.top
    }

    /// Base name of the software headers, e.g. `foo` in `foo_reg_offsets.h`.
    pub fn base_name(&self) -> String {
        self.module_name.to_lowercase()
    }

    /// Offset as written into the headers: the byte address, or the word
    /// index when word addressing is selected.
    pub fn header_offset(&self, reg: &RegisterRef<'_>) -> u64 {
        header_offset(reg.address(), self.byte_addresses, self.data_width)
    }
}

pub(crate) fn header_offset(address: u64, byte_addresses: bool, data_width: u64) -> u64 {
    if byte_addresses || data_width < 8 {
        address
    } else {
        address / (data_width / 8)
    }
}
