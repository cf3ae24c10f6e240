// Licensed under the Apache-2.0 license

//! Pre-flight checks over the design state.
//!
//! Validation runs before anything touches the output directory. Every
//! violation is collected so a single run reports all of them.

use crate::context::{RtlHeaderContext, SwHeaderContext};
use crate::cpuif::CpuInterface;
use crate::design::DesignState;
use crate::util::{is_hdl_keyword, is_identifier};
use csrgen_model::{Field, RegisterRef};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Category of a rejected construct.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstructKind {
    EmptyDesign,
    EmptyRegister,
    MixedRegisterWidths,
    UnsupportedRegisterWidth,
    UnsupportedDataWidth,
    UnsupportedLanguage,
    InvalidOutstandingLimit,
    MisalignedAddress,
    AddressOutOfRange,
    DuplicateAddress,
    FieldOutOfRange,
    OverlappingFields,
    ResetOverflow,
    NoAccess,
    ReadSideEffectWithoutRead,
    WriteSideEffectWithoutWrite,
    SideEffectOnWire,
    ConflictingWriters,
    DuplicateIdentifier,
    InvalidIdentifier,
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstructKind::EmptyDesign => "empty design",
            ConstructKind::EmptyRegister => "register without fields",
            ConstructKind::MixedRegisterWidths => "mixed register widths",
            ConstructKind::UnsupportedRegisterWidth => "unsupported register width",
            ConstructKind::UnsupportedDataWidth => "data width not supported by bus",
            ConstructKind::UnsupportedLanguage => "language not supported by bus port style",
            ConstructKind::InvalidOutstandingLimit => "invalid outstanding-transaction limit",
            ConstructKind::MisalignedAddress => "misaligned register address",
            ConstructKind::AddressOutOfRange => "address out of range",
            ConstructKind::DuplicateAddress => "duplicate register address",
            ConstructKind::FieldOutOfRange => "field outside register",
            ConstructKind::OverlappingFields => "overlapping fields",
            ConstructKind::ResetOverflow => "reset value wider than field",
            ConstructKind::NoAccess => "field without any access",
            ConstructKind::ReadSideEffectWithoutRead => "read side effect without software read",
            ConstructKind::WriteSideEffectWithoutWrite => {
                "write side effect without software write"
            }
            ConstructKind::SideEffectOnWire => "side effect on hardware-driven field",
            ConstructKind::ConflictingWriters => "software-writable field driven by hardware",
            ConstructKind::DuplicateIdentifier => "duplicate identifier",
            ConstructKind::InvalidIdentifier => "invalid identifier",
        };
        f.write_str(s)
    }
}

/// One construct the renderer cannot lower.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnsupportedConstruct {
    pub kind: ConstructKind,
    /// Hierarchical location, e.g. `foo.ctrl.EN`.
    pub path: String,
    pub detail: String,
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.kind, self.detail)
    }
}

/// All violations found in one design.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationErrors(pub Vec<UnsupportedConstruct>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &UnsupportedConstruct> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, kind: ConstructKind) -> bool {
        self.0.iter().any(|c| c.kind == kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "design validation failed with {} error(s)", self.0.len())?;
        for construct in &self.0 {
            write!(f, "\n  {construct}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

struct Validator<'a> {
    errors: Vec<UnsupportedConstruct>,
    top: &'a str,
}

impl Validator<'_> {
    fn reject(&mut self, kind: ConstructKind, path: impl Into<String>, detail: impl Into<String>) {
        self.errors.push(UnsupportedConstruct {
            kind,
            path: path.into(),
            detail: detail.into(),
        });
    }

    fn check_identifier(&mut self, path: &str, name: &str) {
        if !is_identifier(name) {
            self.reject(
                ConstructKind::InvalidIdentifier,
                path,
                format!("{name:?} is not a valid identifier"),
            );
        } else if is_hdl_keyword(name) {
            self.reject(
                ConstructKind::InvalidIdentifier,
                path,
                format!("{name:?} is a reserved HDL keyword"),
            );
        }
    }

    fn check_design(&mut self, state: &DesignState<'_>, cpuif: &dyn CpuInterface) {
        let top = self.top;
        self.check_identifier(top, &state.module_name);
        if state.regs.is_empty() {
            self.reject(ConstructKind::EmptyDesign, top, "no registers to generate");
            return;
        }
        let dw = state.data_width;
        if !matches!(dw, 8 | 16 | 32 | 64) {
            self.reject(
                ConstructKind::UnsupportedRegisterWidth,
                state.regs[0].path_string("."),
                format!("{dw}-bit registers are not supported"),
            );
        } else if !cpuif.supports_data_width(dw) {
            self.reject(
                ConstructKind::UnsupportedDataWidth,
                top,
                format!("{} does not support a {dw}-bit data bus", cpuif.name()),
            );
        }
        if !cpuif.supports_language(state.language) {
            self.reject(
                ConstructKind::UnsupportedLanguage,
                top,
                format!(
                    "{} {:?} ports require SystemVerilog, not {}",
                    cpuif.name(),
                    cpuif.port_style(),
                    state.language
                ),
            );
        }
        if cpuif.max_outstanding() == 0 {
            self.reject(
                ConstructKind::InvalidOutstandingLimit,
                top,
                format!("{} max_outstanding must be at least 1", cpuif.name()),
            );
        }
    }

    fn check_register(&mut self, state: &DesignState<'_>, reg: &RegisterRef<'_>) {
        let path = reg.path_string(".");
        for segment in &reg.path()[1..] {
            self.check_identifier(&path, segment);
        }
        if reg.width() != state.data_width {
            self.reject(
                ConstructKind::MixedRegisterWidths,
                &path,
                format!(
                    "{}-bit register in a {}-bit block",
                    reg.width(),
                    state.data_width
                ),
            );
        }
        if reg.size() != 0 && reg.address() % reg.size() != 0 {
            self.reject(
                ConstructKind::MisalignedAddress,
                &path,
                format!(
                    "address {:#x} is not a multiple of {} bytes",
                    reg.address(),
                    reg.size()
                ),
            );
        }
        if reg.address_overflows() {
            self.reject(
                ConstructKind::AddressOutOfRange,
                &path,
                "absolute address does not fit in 64 bits",
            );
        } else if state.addr_width < 64 {
            let last = reg.address().saturating_add(reg.size().saturating_sub(1));
            if last >> state.addr_width != 0 {
                self.reject(
                    ConstructKind::AddressOutOfRange,
                    &path,
                    format!(
                        "address {:#x} does not fit in {} address bits",
                        reg.address(),
                        state.addr_width
                    ),
                );
            }
        }

        let fields = reg.fields();
        if fields.is_empty() {
            self.reject(ConstructKind::EmptyRegister, &path, "register has no fields");
        }
        let mut names = BTreeSet::new();
        let mut prev: Option<&Field> = None;
        for field in fields {
            let fpath = format!("{path}.{}", field.name);
            self.check_identifier(&fpath, &field.name);
            if !names.insert(field.name.as_str()) {
                self.reject(
                    ConstructKind::DuplicateIdentifier,
                    &fpath,
                    "field name used twice in register",
                );
            }
            self.check_field(reg, field, &fpath);
            if let Some(p) = prev {
                if p.high >= field.low {
                    self.reject(
                        ConstructKind::OverlappingFields,
                        &fpath,
                        format!("{} overlaps {}{}", field.bit_range(), p.name, p.bit_range()),
                    );
                }
            }
            prev = Some(field);
        }
    }

    fn check_field(&mut self, reg: &RegisterRef<'_>, field: &Field, path: &str) {
        use csrgen_model::AccessType;

        if field.high < field.low || u64::from(field.high) >= reg.width() {
            self.reject(
                ConstructKind::FieldOutOfRange,
                path,
                format!("{} outside {}-bit register", field.bit_range(), reg.width()),
            );
        }
        if let Some(reset) = field.reset {
            if reset & !field.value_mask() != 0 {
                self.reject(
                    ConstructKind::ResetOverflow,
                    path,
                    format!("reset {reset:#x} exceeds {} bits", field.width()),
                );
            }
        }
        if field.sw == AccessType::Na && field.hw == AccessType::Na {
            self.reject(ConstructKind::NoAccess, path, "sw=na and hw=na");
        }
        if let Some(onread) = field.onread {
            if !field.sw.can_read() {
                self.reject(
                    ConstructKind::ReadSideEffectWithoutRead,
                    path,
                    format!("onread={onread} with sw={}", field.sw),
                );
            }
        }
        if let Some(onwrite) = field.onwrite {
            if !field.sw.can_write() {
                self.reject(
                    ConstructKind::WriteSideEffectWithoutWrite,
                    path,
                    format!("onwrite={onwrite} with sw={}", field.sw),
                );
            }
        }
        if field.is_hw_wire() {
            if field.onread.is_some() || field.onwrite.is_some() {
                self.reject(
                    ConstructKind::SideEffectOnWire,
                    path,
                    "hw=w fields have no storage for side effects",
                );
            }
            if field.sw.can_write() {
                self.reject(
                    ConstructKind::ConflictingWriters,
                    path,
                    format!("sw={} with hw=w", field.sw),
                );
            }
        }
    }

    fn check_global(&mut self, state: &DesignState<'_>) {
        let mut addresses: BTreeMap<u64, String> = BTreeMap::new();
        let mut idents: BTreeMap<String, String> = BTreeMap::new();
        for reg in state.regs.iter() {
            let path = reg.path_string(".");
            if !reg.address_overflows() {
                if let Some(other) = addresses.get(&reg.address()) {
                    self.reject(
                        ConstructKind::DuplicateAddress,
                        &path,
                        format!("address {:#x} already used by {other}", reg.address()),
                    );
                } else {
                    addresses.insert(reg.address(), path.clone());
                }
            }
            let ident = reg.ident();
            if let Some(other) = idents.get(&ident) {
                self.reject(
                    ConstructKind::DuplicateIdentifier,
                    &path,
                    format!("generated name {ident} already used by {other}"),
                );
            } else {
                idents.insert(ident, path);
            }
        }
    }

    /// Record `symbol` as defined by `owner`, rejecting a second definition.
    fn claim(&mut self, defined: &mut BTreeMap<String, String>, symbol: String, owner: &str) {
        if let Some(other) = defined.get(&symbol) {
            let detail = format!("#define {symbol} already emitted for {other}");
            self.reject(ConstructKind::DuplicateIdentifier, owner, detail);
        } else {
            defined.insert(symbol, owner.to_string());
        }
    }

    /// Every macro the RTL header and the two software headers define must be
    /// unique. The software headers share one namespace.
    fn check_symbols(&mut self, state: &DesignState<'_>) {
        let top = self.top;
        let rtl = RtlHeaderContext::new(state);
        let mut rtl_defined = BTreeMap::new();
        self.claim(&mut rtl_defined, rtl.guard(), top);
        self.claim(&mut rtl_defined, rtl.num_regs_symbol(), top);
        for reg in state.regs.iter() {
            let path = reg.path_string(".");
            self.claim(&mut rtl_defined, format!("{}_OFFSET", rtl.symbol(reg)), &path);
        }

        let sw = SwHeaderContext::new(state);
        let mut sw_defined = BTreeMap::new();
        self.claim(&mut sw_defined, sw.guard("offsets"), top);
        self.claim(&mut sw_defined, sw.guard("defines"), top);
        for reg in state.regs.iter() {
            let path = reg.path_string(".");
            let symbol = sw.symbol(reg);
            self.claim(&mut sw_defined, format!("{symbol}_OFFSET"), &path);
            self.claim(&mut sw_defined, format!("{symbol}_RESET"), &path);
            for field in reg.fields() {
                let fpath = format!("{path}.{}", field.name);
                let name = sw.field_symbol(reg, field);
                for suffix in ["SHIFT", "WIDTH", "MASK"] {
                    self.claim(&mut sw_defined, format!("{name}_{suffix}"), &fpath);
                }
                if field.reset.is_some() {
                    self.claim(&mut sw_defined, format!("{name}_RESET"), &fpath);
                }
            }
        }
    }
}

/// Check `state` against what the renderer and the selected bus adapter can
/// lower.
pub fn validate(state: &DesignState<'_>, cpuif: &dyn CpuInterface) -> Result<(), ValidationErrors> {
    let mut v = Validator {
        errors: Vec::new(),
        top: &state.top().name,
    };
    v.check_design(state, cpuif);
    for reg in state.regs.iter() {
        v.check_register(state, reg);
    }
    v.check_global(state);
    v.check_symbols(state);
    if v.errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(v.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuif::{BusOptions, BusProtocol, PortStyle};
    use crate::design::DesignOptions;
    use crate::language::HdlLanguage;
    use csrgen_model::{AccessType, AddrMap, Block, Node, OnReadType, OnWriteType, Register};

    fn reg(name: &str, offset: u64, fields: Vec<Field>) -> Node {
        let mut r = Register::new(name, offset);
        r.fields = fields;
        Node::Reg(r)
    }

    fn rw(name: &str, high: u32, low: u32) -> Field {
        Field::new(name, high, low, AccessType::Rw, AccessType::R)
    }

    fn check(top: &AddrMap) -> Result<(), ValidationErrors> {
        check_with(top, DesignOptions::default(), BusOptions::new(BusProtocol::Axi4Lite))
    }

    fn check_with(
        top: &AddrMap,
        options: DesignOptions,
        bus: BusOptions,
    ) -> Result<(), ValidationErrors> {
        let state = DesignState::new(top, options);
        let cpuif = bus.build();
        validate(&state, cpuif.as_ref())
    }

    #[test]
    fn test_valid_design() {
        let top = Block::new("foo").with_child(reg(
            "ctrl",
            0,
            vec![
                rw("CTRL", 7, 0),
                Field::new("STATUS", 31, 8, AccessType::R, AccessType::W),
            ],
        ));
        assert_eq!(check(&top), Ok(()));
    }

    #[test]
    fn test_empty_design() {
        let err = check(&Block::new("foo")).unwrap_err();
        assert!(err.has(ConstructKind::EmptyDesign));
    }

    #[test]
    fn test_collects_every_violation() {
        let top = Block::new("foo")
            .with_child(reg("a", 0, vec![rw("x", 7, 0), rw("y", 8, 4)]))
            .with_child(reg("b", 0, vec![rw("z", 40, 0)]))
            .with_child(reg("c", 6, vec![rw("w", 3, 0).with_reset(0x1f)]));
        let err = check(&top).unwrap_err();
        assert!(err.has(ConstructKind::OverlappingFields));
        assert!(err.has(ConstructKind::DuplicateAddress));
        assert!(err.has(ConstructKind::FieldOutOfRange));
        assert!(err.has(ConstructKind::MisalignedAddress));
        assert!(err.has(ConstructKind::ResetOverflow));
        assert!(err.len() >= 5);
        assert!(err.to_string().contains("foo.a.y"));
    }

    #[test]
    fn test_mixed_widths() {
        let mut wide = Register::new("wide", 8).with_size(8);
        wide.fields.push(rw("x", 63, 0));
        let top = Block::new("foo")
            .with_child(reg("narrow", 0, vec![rw("x", 31, 0)]))
            .with_child(Node::Reg(wide));
        let err = check(&top).unwrap_err();
        assert!(err.has(ConstructKind::MixedRegisterWidths));
    }

    #[test]
    fn test_access_combinations() {
        let top = Block::new("foo").with_child(reg(
            "r",
            0,
            vec![
                Field::new("none", 0, 0, AccessType::Na, AccessType::Na),
                Field::new("rclr", 1, 1, AccessType::W, AccessType::R).with_onread(OnReadType::Rclr),
                Field::new("woclr", 2, 2, AccessType::R, AccessType::Na)
                    .with_onwrite(OnWriteType::Woclr),
                Field::new("both", 3, 3, AccessType::Rw, AccessType::W),
                Field::new("wire", 4, 4, AccessType::R, AccessType::W).with_onread(OnReadType::Rclr),
            ],
        ));
        let err = check(&top).unwrap_err();
        assert!(err.has(ConstructKind::NoAccess));
        assert!(err.has(ConstructKind::ReadSideEffectWithoutRead));
        assert!(err.has(ConstructKind::WriteSideEffectWithoutWrite));
        assert!(err.has(ConstructKind::ConflictingWriters));
        assert!(err.has(ConstructKind::SideEffectOnWire));
    }

    #[test]
    fn test_identifiers() {
        let top = Block::new("foo")
            .with_child(reg("module", 0, vec![rw("ok", 0, 0)]))
            .with_child(reg("r1", 4, vec![rw("bad-name", 0, 0)]))
            .with_child(
                Node::Regfile(Block::new("a").at(8).with_child(reg("b", 0, vec![rw("x", 0, 0)]))),
            )
            .with_child(reg("a_b", 12, vec![rw("x", 0, 0)]));
        let err = check(&top).unwrap_err();
        let invalid: Vec<&str> = err
            .iter()
            .filter(|c| c.kind == ConstructKind::InvalidIdentifier)
            .map(|c| c.path.as_str())
            .collect();
        assert_eq!(invalid, ["foo.module", "foo.r1.bad-name"]);
        assert!(err.has(ConstructKind::DuplicateIdentifier));
    }

    #[test]
    fn test_bus_capabilities() {
        let top = Block::new("foo").with_child(reg("r", 0, vec![rw("x", 31, 0)]));
        let err = check_with(
            &top,
            DesignOptions::default().language(HdlLanguage::Verilog),
            BusOptions::new(BusProtocol::Axi4Lite),
        )
        .unwrap_err();
        assert!(err.has(ConstructKind::UnsupportedLanguage));

        let ok = check_with(
            &top,
            DesignOptions::default().language(HdlLanguage::Verilog),
            BusOptions::new(BusProtocol::Axi4Lite).port_style(PortStyle::Flattened),
        );
        assert_eq!(ok, Ok(()));

        let err = check_with(
            &top,
            DesignOptions::default(),
            BusOptions::new(BusProtocol::Axi4Lite).max_outstanding(0),
        )
        .unwrap_err();
        assert!(err.has(ConstructKind::InvalidOutstandingLimit));

        let mut wide = Register::new("r", 0).with_size(8);
        wide.fields.push(rw("x", 63, 0));
        let top = Block::new("foo").with_child(Node::Reg(wide));
        let err = check_with(&top, DesignOptions::default(), BusOptions::new(BusProtocol::Apb4))
            .unwrap_err();
        assert!(err.has(ConstructKind::UnsupportedDataWidth));
    }

    #[test]
    fn test_address_width() {
        let top = Block::new("foo").with_child(reg("r", 0x100, vec![rw("x", 31, 0)]));
        let err = check_with(
            &top,
            DesignOptions::default().address_width(8),
            BusOptions::new(BusProtocol::Axi4Lite),
        )
        .unwrap_err();
        assert!(err.has(ConstructKind::AddressOutOfRange));
    }

    fn duplicate_symbols(err: &ValidationErrors) -> Vec<&str> {
        err.iter()
            .filter(|c| c.kind == ConstructKind::DuplicateIdentifier)
            .map(|c| c.detail.as_str())
            .collect()
    }

    #[test]
    fn test_register_and_field_reset_symbols_collide() {
        let top = Block::new("foo")
            .with_child(reg("ctrl", 0, vec![rw("x", 0, 0).with_reset(1)]))
            .with_child(reg("ctrl_x", 4, vec![rw("y", 1, 0).with_reset(2)]));
        let err = check(&top).unwrap_err();
        let dups = duplicate_symbols(&err);
        assert_eq!(dups.len(), 1, "{err}");
        assert!(dups[0].contains("FOO_CTRL_X_RESET"));
        assert!(err.iter().any(|c| c.path == "foo.ctrl_x"));
    }

    #[test]
    fn test_field_names_differing_in_case_collide() {
        let top = Block::new("foo").with_child(reg("a", 0, vec![rw("en", 0, 0), rw("EN", 1, 1)]));
        let err = check(&top).unwrap_err();
        let dups = duplicate_symbols(&err);
        for suffix in ["SHIFT", "WIDTH", "MASK"] {
            let symbol = format!("FOO_A_EN_{suffix}");
            assert!(dups.iter().any(|d| d.contains(&symbol)), "{symbol} not reported: {err}");
        }
    }

    #[test]
    fn test_prefixed_symbols_are_checked() {
        let top = Block::new("foo")
            .with_child(reg("a", 0, vec![rw("b_c", 0, 0)]))
            .with_child(reg("a_b", 4, vec![rw("c", 0, 0)]));
        let err = check_with(
            &top,
            DesignOptions::default().prefix("bar"),
            BusOptions::new(BusProtocol::Axi4Lite),
        )
        .unwrap_err();
        assert!(duplicate_symbols(&err)
            .iter()
            .any(|d| d.contains("BAR_FOO_A_B_C_MASK")));
    }

    #[test]
    fn test_address_overflow_rejected() {
        let rf = Block::new("rf")
            .at(u64::MAX - 3)
            .with_child(reg("r", 8, vec![rw("x", 31, 0)]));
        let top = Block::new("foo")
            .with_child(reg("ok", 0, vec![rw("x", 31, 0)]))
            .with_child(Node::Regfile(rf));
        for width in [32, 64] {
            let err = check_with(
                &top,
                DesignOptions::default().address_width(width),
                BusOptions::new(BusProtocol::Axi4Lite),
            )
            .unwrap_err();
            let overflow: Vec<&str> = err
                .iter()
                .filter(|c| c.kind == ConstructKind::AddressOutOfRange)
                .map(|c| c.path.as_str())
                .collect();
            assert_eq!(overflow, ["foo.rf.r"]);
        }
    }
}
